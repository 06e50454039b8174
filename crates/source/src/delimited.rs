//! A `nom`-based reader for delimited text (CSV and friends).
//!
//! Follows the usual dialect: fields may be wrapped in double quotes, a doubled
//! quote inside a quoted field is a literal quote, quoted fields may span
//! lines, and spaces directly after a delimiter are skipped. Lines that are
//! empty or hold only whitespace are not rows.

use crate::RecordSet;
use crate::error::SourceError;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{is_not, tag, take_while},
    character::complete::char,
    combinator::{cut, eof, map, value},
    multi::{many0, separated_list1},
    sequence::{preceded, terminated},
};
use slagen_types::Record;

/// One parsed row and the line it starts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub line: usize,
    pub fields: Vec<String>,
}

/// Parses `text` into header and records.
///
/// Every data row must have exactly as many fields as the header.
pub fn read_delimited(text: &str, delimiter: char) -> Result<RecordSet, SourceError> {
    let mut rows = parse_rows(text, delimiter)?.into_iter();
    let Some(header) = rows.next() else {
        return Ok(RecordSet::default());
    };
    let fields = header.fields;

    let records = rows
        .map(|row| {
            if row.fields.len() != fields.len() {
                return Err(SourceError::FieldCountMismatch {
                    line: row.line,
                    expected: fields.len(),
                    found: row.fields.len(),
                });
            }
            Ok(fields.iter().cloned().zip(row.fields).collect::<Record>())
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RecordSet { fields, records })
}

/// Splits `text` into rows of raw field values.
pub fn parse_rows(text: &str, delimiter: char) -> Result<Vec<Row>, SourceError> {
    let mut rows = Vec::new();
    let mut input = text;

    while !input.is_empty() {
        let line = line_number(text, input);
        let (rest, fields) = row(input, delimiter).map_err(|e| malformed(text, e))?;
        let (rest, _) = line_end(rest).map_err(|e| malformed(text, e))?;
        input = rest;

        if fields.len() == 1 && fields[0].trim().is_empty() {
            continue;
        }
        rows.push(Row { line, fields });
    }

    Ok(rows)
}

fn row(input: &str, delimiter: char) -> IResult<&str, Vec<String>> {
    separated_list1(char(delimiter), move |i| field(i, delimiter)).parse(input)
}

fn field(input: &str, delimiter: char) -> IResult<&str, String> {
    let (input, _) = take_while(move |c: char| c == ' ' && delimiter != ' ').parse(input)?;
    alt((
        move |i| quoted_field(i, delimiter),
        map(take_while(move |c: char| !is_field_end(c, delimiter)), String::from),
    ))
    .parse(input)
}

/// A quoted field. Text between the closing quote and the next delimiter is kept.
fn quoted_field(input: &str, delimiter: char) -> IResult<&str, String> {
    let (input, body) = preceded(char('"'), cut(terminated(quoted_body, char('"')))).parse(input)?;
    let (input, tail) = take_while(move |c: char| !is_field_end(c, delimiter)).parse(input)?;
    Ok((input, body + tail))
}

fn quoted_body(input: &str) -> IResult<&str, String> {
    map(
        many0(alt((is_not("\""), value("\"", tag("\"\""))))),
        |parts: Vec<&str>| parts.concat(),
    )
    .parse(input)
}

fn line_end(input: &str) -> IResult<&str, &str> {
    alt((tag("\r\n"), tag("\n"), tag("\r"), eof)).parse(input)
}

fn is_field_end(c: char, delimiter: char) -> bool {
    c == delimiter || c == '\n' || c == '\r'
}

fn line_number(text: &str, remaining: &str) -> usize {
    let consumed = &text[..text.len() - remaining.len()];
    consumed.matches('\n').count() + 1
}

fn malformed(text: &str, err: nom::Err<nom::error::Error<&str>>) -> SourceError {
    match err {
        nom::Err::Error(e) | nom::Err::Failure(e) => {
            let message = if e.input.is_empty() {
                "unterminated quoted field".to_string()
            } else {
                format!("unexpected input near '{}'", e.input.chars().take(20).collect::<String>())
            };
            SourceError::Malformed {
                line: line_number(text, e.input),
                message,
            }
        }
        nom::Err::Incomplete(_) => SourceError::Malformed {
            line: line_number(text, ""),
            message: "incomplete input".to_string(),
        },
    }
}
