//! Recursive-descent parser for the parenthesized record format used by
//! morphological dictionary sources.
//!
//! One record is a single value: a bare token, a double-quoted string
//! (no escape processing), or a parenthesized list of values. Bare
//! tokens made entirely of decimal digits become [`Value::Int`].

/// A parsed structured value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Atom(String),
    Int(i64),
    List(Vec<Value>),
}

impl Value {
    /// The textual form of an atom or integer, `None` for lists.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Value::Atom(s) => Some(s.clone()),
            Value::Int(n) => Some(n.to_string()),
            Value::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }
}

/// Syntax error with the offending byte position and the text on either
/// side of it, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("sexp parse error ({pos}) as {before:?} ##HERE## {after:?}")]
pub struct ParseError {
    pub pos: usize,
    pub before: String,
    pub after: String,
}

impl ParseError {
    fn at(input: &str, pos: usize) -> Self {
        ParseError {
            pos,
            before: input[..pos].to_string(),
            after: input[pos..].to_string(),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Token {
    LParen,
    RParen,
    Str(String),
    Bare(String),
    End,
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Parser { input, pos: 0 }
    }

    fn error(&self, pos: usize) -> ParseError {
        ParseError::at(self.input, pos)
    }

    /// Next token and its starting byte position. Whitespace is skipped.
    fn next_token(&mut self) -> (Token, usize) {
        let rest = &self.input[self.pos..];
        let skipped = rest.len() - rest.trim_start().len();
        self.pos += skipped;
        let start = self.pos;

        let mut chars = self.input[self.pos..].chars();
        let Some(c) = chars.next() else {
            return (Token::End, start);
        };

        match c {
            '(' => {
                self.pos += 1;
                (Token::LParen, start)
            }
            ')' => {
                self.pos += 1;
                (Token::RParen, start)
            }
            '"' => {
                let body = &self.input[start + 1..];
                if let Some(end) = body.find('"') {
                    self.pos = start + 1 + end + 1;
                    (Token::Str(body[..end].to_string()), start)
                } else {
                    // Unterminated quote: falls back to a bare token, as the
                    // token pattern accepts any leading non-space character.
                    self.bare_token(start)
                }
            }
            _ => self.bare_token(start),
        }
    }

    /// Maximal run of non-space, non-paren characters starting at `start`.
    fn bare_token(&mut self, start: usize) -> (Token, usize) {
        let rest = &self.input[start..];
        let end = rest
            .char_indices()
            .find(|&(i, c)| i > 0 && (c.is_whitespace() || c == '(' || c == ')'))
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        self.pos = start + end;
        (Token::Bare(rest[..end].to_string()), start)
    }

    fn parse_value(&mut self) -> Result<Value, ParseError> {
        let (token, start) = self.next_token();
        match token {
            Token::LParen => self.parse_list(),
            Token::Str(s) => Ok(Value::Atom(s)),
            Token::Bare(s) => Ok(coerce(s)),
            Token::RParen | Token::End => Err(self.error(start)),
        }
    }

    /// Values up to the matching `)`. Called with the `(` consumed.
    fn parse_list(&mut self) -> Result<Value, ParseError> {
        let mut items = Vec::new();
        loop {
            let checkpoint = self.pos;
            let (token, start) = self.next_token();
            match token {
                Token::RParen => return Ok(Value::List(items)),
                Token::End => return Err(self.error(start)),
                _ => {
                    self.pos = checkpoint;
                    items.push(self.parse_value()?);
                }
            }
        }
    }
}

/// A bare token of decimal digits becomes an integer; everything else
/// stays text. Digit runs too long for `i64` stay text as well.
fn coerce(s: String) -> Value {
    if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
        match s.parse::<i64>() {
            Ok(n) => Value::Int(n),
            Err(_) => Value::Atom(s),
        }
    } else {
        Value::Atom(s)
    }
}

/// Parse exactly one value; trailing non-whitespace is an error.
pub fn parse(input: &str) -> Result<Value, ParseError> {
    let mut parser = Parser::new(input);
    let value = parser.parse_value()?;
    let (token, start) = parser.next_token();
    if token != Token::End {
        return Err(parser.error(start));
    }
    Ok(value)
}
