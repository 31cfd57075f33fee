//! Text-to-`Syntax` reader. An external collaborator: it knows nothing of
//! environments or evaluation, only of turning source bytes into the
//! concrete tree `parser.rs` consumes. Grounded on the teacher's nom-based
//! `parser.rs`, narrowed to integers/rationals instead of floats and to
//! `Syntax` instead of the teacher's runtime `Value`.

use nom::{
    branch::alt,
    bytes::complete::{escaped, tag, take_while1},
    character::complete::{char, digit1, multispace1, none_of, one_of},
    combinator::{map, opt, recognize, value},
    multi::many0,
    sequence::preceded,
    IResult, Parser,
};
use thiserror::Error;

use crate::syntax::Syntax;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReaderError {
    #[error("parse error: {0}")]
    Malformed(String),
    #[error("unexpected trailing input: '{0}'")]
    TrailingInput(String),
}

fn line_comment(input: &str) -> IResult<&str, ()> {
    let (input, _) = char(';')(input)?;
    let (input, _) = nom::bytes::complete::take_while(|c| c != '\n')(input)?;
    Ok((input, ()))
}

fn ws(input: &str) -> IResult<&str, ()> {
    many0(alt((value((), multispace1), line_comment)))
        .map(|_| ())
        .parse(input)
}

fn parse_integer(input: &str) -> IResult<&str, Syntax> {
    map(
        recognize((opt(char('-')), digit1)),
        |s: &str| Syntax::Number(s.parse::<i64>().unwrap_or(0)),
    )
    .parse(input)
}

fn parse_rational(input: &str) -> IResult<&str, Syntax> {
    let (input, num) = recognize((opt(char('-')), digit1)).parse(input)?;
    let (input, _) = char('/')(input)?;
    let (input, den) = digit1(input)?;
    let num: i64 = num.parse().unwrap_or(0);
    let den: i64 = den.parse().unwrap_or(1);
    Ok((input, reduce_rational(num, den)))
}

fn reduce_rational(num: i64, den: i64) -> Syntax {
    fn gcd(a: i64, b: i64) -> i64 {
        if b == 0 { a.abs() } else { gcd(b, a % b) }
    }
    let g = gcd(num, den).max(1);
    let (mut n, mut d) = (num / g, den / g);
    if d < 0 {
        n = -n;
        d = -d;
    }
    if d == 1 {
        Syntax::Number(n)
    } else {
        Syntax::Rational(n, d)
    }
}

fn parse_bool(input: &str) -> IResult<&str, Syntax> {
    alt((
        value(Syntax::True, tag("#t")),
        value(Syntax::False, tag("#f")),
    ))
    .parse(input)
}

const SYMBOL_CHARS: &str = "+-*/%<>=!?";

fn parse_symbol(input: &str) -> IResult<&str, Syntax> {
    let (input, first) = one_of(symbol_start_chars())(input)?;
    let (input, rest) = take_while1::<_, _, nom::error::Error<_>>(symbol_continue)
        .parse(input)
        .unwrap_or((input, ""));
    let mut s = String::new();
    s.push(first);
    s.push_str(rest);
    Ok((input, Syntax::Symbol(s)))
}

fn symbol_start_chars() -> String {
    let mut chars: String = ('a'..='z').chain('A'..='Z').collect();
    chars.push_str(SYMBOL_CHARS);
    chars
}

fn symbol_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_' || SYMBOL_CHARS.contains(c)
}

fn parse_string_lit(input: &str) -> IResult<&str, Syntax> {
    let (input, _) = char('"')(input)?;
    if let Ok((input, _)) = char::<_, nom::error::Error<_>>('"')(input) {
        return Ok((input, Syntax::StringLit(String::new())));
    }
    let (input, content) = escaped(none_of("\"\\"), '\\', one_of("\"\\nt"))(input)?;
    let (input, _) = char('"')(input)?;

    let mut result = String::new();
    let mut chars = content.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => result.push('\n'),
                Some('t') => result.push('\t'),
                Some('\\') => result.push('\\'),
                Some('"') => result.push('"'),
                Some(other) => {
                    result.push('\\');
                    result.push(other);
                }
                None => result.push('\\'),
            }
        } else {
            result.push(c);
        }
    }
    Ok((input, Syntax::StringLit(result)))
}

fn parse_quote(input: &str) -> IResult<&str, Syntax> {
    let (input, expr) = preceded(char('\''), parse_expr)(input)?;
    Ok((input, expr.quote()))
}

fn parse_list(input: &str) -> IResult<&str, Syntax> {
    let (input, _) = char('(')(input)?;
    let (input, _) = ws(input)?;

    let mut items = Vec::new();
    let mut remaining = input;
    loop {
        if let Ok((rest, _)) = char::<_, nom::error::Error<_>>(')')(remaining) {
            return Ok((rest, Syntax::List(items)));
        }
        let (rest, item) = parse_expr(remaining)?;
        items.push(item);
        let (rest, _) = ws(rest)?;
        remaining = rest;
    }
}

fn parse_expr(input: &str) -> IResult<&str, Syntax> {
    let (input, _) = ws(input)?;
    alt((
        parse_quote,
        parse_list,
        parse_bool,
        parse_rational,
        parse_integer,
        parse_string_lit,
        parse_symbol,
    ))
    .parse(input)
}

/// Reads every top-level form in `input`, in order.
pub fn read_all(input: &str) -> Result<Vec<Syntax>, ReaderError> {
    let mut forms = Vec::new();
    let mut remaining = input;
    loop {
        let (rest, _) = ws(remaining).map_err(|e| ReaderError::Malformed(e.to_string()))?;
        if rest.is_empty() {
            break;
        }
        let (rest, form) =
            parse_expr(rest).map_err(|e| ReaderError::Malformed(e.to_string()))?;
        forms.push(form);
        remaining = rest;
    }
    Ok(forms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_integers_and_rationals() {
        assert_eq!(read_all("42 -7").unwrap(), vec![Syntax::Number(42), Syntax::Number(-7)]);
        assert_eq!(read_all("1/2").unwrap(), vec![Syntax::Rational(1, 2)]);
        assert_eq!(read_all("2/1").unwrap(), vec![Syntax::Number(2)]);
        assert_eq!(read_all("-4/6").unwrap(), vec![Syntax::Rational(-2, 3)]);
    }

    #[test]
    fn reads_booleans_and_symbols() {
        assert_eq!(read_all("#t #f").unwrap(), vec![Syntax::True, Syntax::False]);
        assert_eq!(
            read_all("foo-bar? set!").unwrap(),
            vec![
                Syntax::Symbol("foo-bar?".to_string()),
                Syntax::Symbol("set!".to_string())
            ]
        );
    }

    #[test]
    fn reads_strings_with_escapes() {
        assert_eq!(
            read_all(r#""hi\nthere""#).unwrap(),
            vec![Syntax::StringLit("hi\nthere".to_string())]
        );
    }

    #[test]
    fn reads_quote_sugar() {
        assert_eq!(
            read_all("'x").unwrap(),
            vec![Syntax::List(vec![
                Syntax::Symbol("quote".to_string()),
                Syntax::Symbol("x".to_string())
            ])]
        );
    }

    #[test]
    fn reads_nested_lists_and_comments() {
        let forms = read_all("(define (square x) ; doc\n (* x x))").unwrap();
        assert_eq!(forms.len(), 1);
        match &forms[0] {
            Syntax::List(items) => assert_eq!(items.len(), 3),
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn empty_list_reads_as_empty_syntax_list() {
        assert_eq!(read_all("()").unwrap(), vec![Syntax::List(vec![])]);
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(read_all("(1 2").is_err());
        assert!(read_all(")").is_err());
    }
}
