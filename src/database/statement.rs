//! Lexing of operator-supplied statement text
//!
//! Only enough SQL is understood to split a batch into statements and read
//! the leading keyword of each one, which decides whether an ad-hoc batch is
//! a pure read.

use nom::branch::alt;
use nom::bytes::complete::{is_not, tag, take_until};
use nom::character::complete::{alpha1, char, multispace1, not_line_ending, one_of};
use nom::combinator::{opt, recognize, rest, value};
use nom::multi::{many0_count, separated_list0};
use nom::sequence::{pair, preceded, terminated};
use nom::IResult;

const READ_KEYWORDS: [&str; 4] = ["SELECT", "WITH", "VALUES", "EXPLAIN"];

/// Classification of a single statement in a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementKind {
    Read,
    /// Anything else, tagged with its leading keyword (empty when unreadable)
    Write(String),
}

fn line_comment(input: &str) -> IResult<&str, ()> {
    value((), pair(tag("--"), opt(not_line_ending)))(input)
}

fn block_comment(input: &str) -> IResult<&str, ()> {
    // SQLite lets an unterminated block comment run to end of input
    value(
        (),
        preceded(tag("/*"), alt((terminated(take_until("*/"), tag("*/")), rest))),
    )(input)
}

/// Whitespace and comments
fn trivia(input: &str) -> IResult<&str, ()> {
    value(
        (),
        many0_count(alt((value((), multispace1), line_comment, block_comment))),
    )(input)
}

fn leading_keyword(input: &str) -> IResult<&str, &str> {
    preceded(trivia, alpha1)(input)
}

/// True when `sql` holds nothing but whitespace and comments
pub fn is_blank(sql: &str) -> bool {
    matches!(trivia(sql), Ok((remaining, ())) if remaining.is_empty())
}

/// Quoted string or identifier. An unterminated quote runs to end of input;
/// a doubled quote parses as two adjacent quoted fragments.
fn quoted<'a>(open: char, close: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, ()> {
    value(
        (),
        preceded(char(open), alt((terminated(take_until(close), tag(close)), rest))),
    )
}

/// One lexical piece of a statement; never a top-level `;`
fn fragment(input: &str) -> IResult<&str, ()> {
    alt((
        line_comment,
        block_comment,
        quoted('\'', "'"),
        quoted('"', "\""),
        quoted('`', "`"),
        quoted('[', "]"),
        value((), is_not("'\"`[;-/")),
        value((), one_of("-/")),
    ))(input)
}

fn statement_body(input: &str) -> IResult<&str, &str> {
    recognize(many0_count(fragment))(input)
}

/// Split a batch on top-level semicolons, dropping blank pieces.
///
/// Semicolons inside quoted strings, quoted identifiers and comments do not
/// split.
pub fn split_statements(sql: &str) -> Vec<&str> {
    let pieces = match separated_list0(char(';'), statement_body)(sql) {
        Ok((_, pieces)) => pieces,
        Err(_) => vec![sql],
    };
    pieces.into_iter().filter(|s| !is_blank(s)).collect()
}

pub fn classify(statement: &str) -> StatementKind {
    match leading_keyword(statement) {
        Ok((_, keyword)) => {
            let keyword = keyword.to_ascii_uppercase();
            if READ_KEYWORDS.contains(&keyword.as_str()) {
                StatementKind::Read
            } else {
                StatementKind::Write(keyword)
            }
        }
        Err(_) => StatementKind::Write(String::new()),
    }
}

/// Leading keyword of the first statement in `sql` that is not a pure read
pub fn first_mutating_keyword(sql: &str) -> Option<String> {
    split_statements(sql)
        .into_iter()
        .find_map(|stmt| match classify(stmt) {
            StatementKind::Read => None,
            StatementKind::Write(keyword) => Some(keyword),
        })
}
