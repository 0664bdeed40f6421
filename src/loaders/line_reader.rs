//! Sequential reader over the non-blank lines of a text buffer.
//!
//! The stress `.dat` formats are framed line by line: a metadata line, then
//! fixed-size numeric records. [`LineReader`] hands out the next non-blank line
//! together with its 1-based line number so decode errors can point at it.
use std::str::FromStr;

use crate::line_errors::FormatError;

pub(crate) struct LineReader<'a> {
    lines: std::iter::Peekable<std::iter::Enumerate<std::str::Lines<'a>>>,
}

impl<'a> LineReader<'a> {
    pub(crate) fn new(content: &'a str) -> Self {
        LineReader {
            lines: content.lines().enumerate().peekable(),
        }
    }

    fn skip_blank(&mut self) {
        while let Some((_, line)) = self.lines.peek() {
            if !line.trim().is_empty() {
                break;
            }
            self.lines.next();
        }
    }

    /// Whether a non-blank line remains.
    pub(crate) fn is_line_left(&mut self) -> bool {
        self.skip_blank();
        self.lines.peek().is_some()
    }

    /// Next non-blank line and its 1-based line number.
    fn next_line(&mut self, context: &str) -> Result<(usize, &'a str), FormatError> {
        self.skip_blank();
        self.lines
            .next()
            .map(|(idx, line)| (idx + 1, line))
            .ok_or_else(|| FormatError::Truncated {
                context: context.to_string(),
            })
    }

    /// Whitespace separated tokens of the next non-blank line.
    pub(crate) fn read_tokens(
        &mut self,
        context: &str,
    ) -> Result<(usize, Vec<&'a str>), FormatError> {
        let (line_number, line) = self.next_line(context)?;
        Ok((line_number, line.split_whitespace().collect()))
    }

    /// The next non-blank line parsed as exactly `expected` values.
    /// An empty record consumes no line, producers write it as a blank line.
    pub(crate) fn read_record<T: FromStr>(
        &mut self,
        expected: usize,
        context: &str,
    ) -> Result<Vec<T>, FormatError> {
        if expected == 0 {
            return Ok(Vec::new());
        }
        let (line_number, tokens) = self.read_tokens(context)?;
        if tokens.len() != expected {
            return Err(FormatError::RecordLength {
                line: line_number,
                expected,
                found: tokens.len(),
            });
        }
        tokens
            .into_iter()
            .map(|token| parse_token(token, line_number))
            .collect()
    }

    /// The next non-blank line parsed as a single value.
    pub(crate) fn read_scalar<T: FromStr>(&mut self, context: &str) -> Result<T, FormatError> {
        let mut values = self.read_record(1, context)?;
        Ok(values.remove(0))
    }
}

pub(crate) fn parse_token<T: FromStr>(token: &str, line: usize) -> Result<T, FormatError> {
    token.parse().map_err(|_| FormatError::InvalidNumber {
        line,
        token: token.to_string(),
    })
}
