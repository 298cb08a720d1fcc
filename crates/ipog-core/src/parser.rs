//! Parser for the exponential domain shorthand, e.g. `3^4,2^2` for four
//! ternary and two binary parameters.

use std::collections::HashSet;

use thiserror::Error;

use crate::Parameter;

/// Malformed shorthand. Positions are byte offsets into the trimmed input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty domain expression")]
    Empty,

    #[error("domain size expected at position {0}")]
    MissingDomainSize(usize),

    #[error("'^' expected at position {0}")]
    MissingCaret(usize),

    #[error("parameter count expected at position {0}")]
    MissingCount(usize),

    #[error("number at position {0} does not fit")]
    NumberTooLarge(usize),

    #[error("domain size must be positive (position {0})")]
    ZeroDomainSize(usize),

    #[error("parameter count must be positive (position {0})")]
    ZeroCount(usize),

    #[error("domain size {0} is given more than once")]
    RepeatedDomainSize(usize),

    #[error("unexpected character '{found}' at position {position}")]
    Unexpected { found: char, position: usize },
}

struct Cursor<'a> {
    text: &'a str,
    position: usize,
}

impl<'a> Cursor<'a> {
    fn peek(&self) -> Option<char> {
        self.text[self.position..].chars().next()
    }

    fn skip_spaces(&mut self) {
        while self.peek() == Some(' ') {
            self.position += 1;
        }
    }

    /// Read a run of ASCII digits. `None` if there is none.
    fn number(&mut self) -> Option<Result<usize, ParseError>> {
        let start = self.position;
        let digits = self.text[start..].bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 {
            return None;
        }
        self.position += digits;
        Some(
            self.text[start..self.position]
                .parse()
                .map_err(|_| ParseError::NumberTooLarge(start)),
        )
    }
}

/// Parse `d1^n1,d2^n2,...` into `n1` parameters of size `d1`, then `n2` of
/// size `d2`, and so on. Parameters are named `p0, p1, ...` and their values
/// are `"0"` to `"d-1"`. Spaces after a comma are allowed.
pub fn parse_domain_sizes(expression: &str) -> Result<Vec<Parameter>, ParseError> {
    let mut cursor = Cursor {
        text: expression.trim(),
        position: 0,
    };
    if cursor.text.is_empty() {
        return Err(ParseError::Empty);
    }

    let mut groups: Vec<(usize, usize)> = Vec::new();
    let mut seen = HashSet::new();
    loop {
        let at = cursor.position;
        let size = cursor.number().ok_or(ParseError::MissingDomainSize(at))??;
        if size == 0 {
            return Err(ParseError::ZeroDomainSize(at));
        }
        if !seen.insert(size) {
            return Err(ParseError::RepeatedDomainSize(size));
        }
        if cursor.peek() != Some('^') {
            return Err(ParseError::MissingCaret(cursor.position));
        }
        cursor.position += 1;

        let at = cursor.position;
        let count = cursor.number().ok_or(ParseError::MissingCount(at))??;
        if count == 0 {
            return Err(ParseError::ZeroCount(at));
        }
        groups.push((size, count));

        match cursor.peek() {
            None => break,
            Some(',') => {
                cursor.position += 1;
                cursor.skip_spaces();
            }
            Some(found) => {
                return Err(ParseError::Unexpected {
                    found,
                    position: cursor.position,
                })
            }
        }
    }

    let mut parameters = Vec::new();
    for (size, count) in groups {
        for _ in 0..count {
            let name = format!("p{}", parameters.len());
            parameters.push(Parameter::new(name, 0..size));
        }
    }
    Ok(parameters)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mixed() {
        let params = parse_domain_sizes(" 3^2, 2^1 ").unwrap();
        assert_eq!(params.len(), 3);
        assert_eq!(params[0], Parameter::new("p0", ["0", "1", "2"]));
        assert_eq!(params[1].name, "p1");
        assert_eq!(params[2], Parameter::new("p2", ["0", "1"]));
    }

    #[test]
    fn test_parse_single() {
        let params = parse_domain_sizes("10^1").unwrap();
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].value(9), Some("9"));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_domain_sizes("  "), Err(ParseError::Empty));
        assert_eq!(parse_domain_sizes("^2"), Err(ParseError::MissingDomainSize(0)));
        assert_eq!(parse_domain_sizes("3"), Err(ParseError::MissingCaret(1)));
        assert_eq!(parse_domain_sizes("3,2^1"), Err(ParseError::MissingCaret(1)));
        assert_eq!(parse_domain_sizes("3^"), Err(ParseError::MissingCount(2)));
        assert_eq!(parse_domain_sizes("3^x"), Err(ParseError::MissingCount(2)));
        assert_eq!(parse_domain_sizes("0^2"), Err(ParseError::ZeroDomainSize(0)));
        assert_eq!(parse_domain_sizes("2^0"), Err(ParseError::ZeroCount(2)));
        assert_eq!(parse_domain_sizes("2^3,2^1"), Err(ParseError::RepeatedDomainSize(2)));
        assert_eq!(parse_domain_sizes("2^3,"), Err(ParseError::MissingDomainSize(4)));
        assert_eq!(
            parse_domain_sizes("2^3;3^1"),
            Err(ParseError::Unexpected { found: ';', position: 3 })
        );
        assert!(matches!(
            parse_domain_sizes("99999999999999999999999^1"),
            Err(ParseError::NumberTooLarge(0))
        ));
    }
}
