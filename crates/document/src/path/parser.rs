//! A `nom`-based parser for relative path expressions.

use super::ast::*;
use crate::error::PathError;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, digit1, multispace0},
    combinator::{map, map_res, recognize, verify},
    multi::many0,
    sequence::{delimited, pair, preceded},
};

// --- Main Public Parser ---

pub fn parse_path(input: &str) -> Result<RelativePath, PathError> {
    match path(input.trim()) {
        Ok(("", p)) => Ok(p),
        Ok((rem, _)) => Err(PathError::Parse(
            input.to_string(),
            format!("Parser did not consume all input. Remainder: '{}'", rem),
        )),
        Err(e) => Err(PathError::Parse(input.to_string(), e.to_string())),
    }
}

// --- Combinators & Helpers ---

fn ws<'a, F, O, E>(inner: F) -> impl Parser<&'a str, Output = O, Error = E>
where
    F: Parser<&'a str, Output = O, Error = E>,
    E: nom::error::ParseError<&'a str>,
{
    delimited(multispace0, inner, multispace0)
}

// --- Path Parsers ---

fn path(input: &str) -> IResult<&str, RelativePath> {
    let (i, first) = step(input)?;
    // After the first step, subsequent steps MUST be preceded by / or //.
    let (i, remainder) = many0(pair(alt((tag("//"), tag("/"))), step)).parse(i)?;

    let mut steps = vec![first];
    for (sep, mut next) in remainder {
        next.descend = sep == "//";
        steps.push(next);
    }
    Ok((i, RelativePath { steps }))
}

fn step(input: &str) -> IResult<&str, Step> {
    alt((
        map(tag(".."), |_| bare_step(StepKind::Parent)),
        map(tag("."), |_| bare_step(StepKind::SelfNode)),
        map(pair(node_test, many0(predicate)), |(test, predicates)| Step {
            descend: false,
            kind: StepKind::Select(test),
            predicates,
        }),
    ))
    .parse(input)
}

fn bare_step(kind: StepKind) -> Step {
    Step {
        descend: false,
        kind,
        predicates: vec![],
    }
}

// --- Name and NodeTest Parsers ---

fn name(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        take_while1(|c: char| c.is_alphabetic() || c == '_'),
        take_while(|c: char| c.is_alphanumeric() || c == '_' || c == '-' || c == '.' || c == ':'),
    ))
    .parse(input)
}

fn node_test(input: &str) -> IResult<&str, NodeTest> {
    alt((
        map(char('*'), |_| NodeTest::Any),
        map(name, |n: &str| NodeTest::Name(n.to_string())),
    ))
    .parse(input)
}

// --- Predicate Parsers ---

fn string_literal(input: &str) -> IResult<&str, String> {
    map(
        alt((
            delimited(char('\''), take_while(|c: char| c != '\''), char('\'')),
            delimited(char('"'), take_while(|c: char| c != '"'), char('"')),
        )),
        |s: &str| s.to_string(),
    )
    .parse(input)
}

fn number(input: &str) -> IResult<&str, usize> {
    map_res(digit1, |s: &str| s.parse::<usize>()).parse(input)
}

fn predicate(input: &str) -> IResult<&str, Predicate> {
    delimited(char('['), ws(predicate_body), char(']')).parse(input)
}

fn predicate_body(input: &str) -> IResult<&str, Predicate> {
    alt((
        map((tag("last()"), ws(char('-')), number), |(_, _, n)| {
            Predicate::Last(n)
        }),
        map(tag("last()"), |_| Predicate::Last(0)),
        map(verify(number, |n: &usize| *n >= 1), Predicate::Position),
        map(
            (preceded(char('@'), name), ws(tag("!=")), string_literal),
            |(attr, _, value)| Predicate::AttributeNotEquals(attr.to_string(), value),
        ),
        map(
            (preceded(char('@'), name), ws(char('=')), string_literal),
            |(attr, _, value)| Predicate::AttributeEquals(attr.to_string(), value),
        ),
        map(preceded(char('@'), name), |attr: &str| {
            Predicate::HasAttribute(attr.to_string())
        }),
        map((name, ws(char('=')), string_literal), |(child, _, text)| {
            Predicate::ChildTextEquals(child.to_string(), text)
        }),
        map(name, |child: &str| Predicate::HasChild(child.to_string())),
    ))
    .parse(input)
}
