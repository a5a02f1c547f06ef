//! Low level helpers for parsing text based formats.
//!
//! Input is split into whitespace separated tokens, each carrying the byte
//! span it was found at, so that error messages can point to the offending
//! part of the file.

use std::{
    fmt,
    io,
    str::FromStr,
};

use failure::Fail;


/// A token together with its location in the input.
#[derive(Debug)]
pub struct SpannedData<'a> {
    pub data: &'a [u8],
    pub span: Span,
}

impl<'a> SpannedData<'a> {
    pub fn error(&self, msg: impl Into<String>) -> Error {
        Error::Custom(msg.into(), self.span)
    }

    pub fn assert_ascii(&self) -> Result<&'a str, Error> {
        if !self.data.is_ascii() {
            Err(Error::NotAscii(self.span))
        } else {
            // ASCII is always valid UTF-8.
            std::str::from_utf8(self.data).map_err(|_| Error::NotAscii(self.span))
        }
    }
}

/// A half-open byte range `lo..hi` in the input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Span {
    lo: usize,
    hi: usize,
}

impl Span {
    pub fn new(lo: usize, hi: usize) -> Self {
        Self { lo, hi }
    }

    pub fn single(at: usize) -> Self {
        Self {
            lo: at,
            hi: at + 1,
        }
    }

    pub fn lo(&self) -> usize {
        self.lo
    }

    pub fn hi(&self) -> usize {
        self.hi
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}..{}", self.lo, self.hi)
    }
}

#[derive(Debug, Fail)]
pub enum Error {
    #[fail(display = "IO error: {}", _0)]
    Io(#[cause] io::Error),

    #[fail(display = "unexpected EOF while parsing (at {})", _0)]
    UnexpectedEof(usize),

    #[fail(display = "unexpected non-ASCII data at {}", _0)]
    NotAscii(Span),

    #[fail(display = "{} (at {})", _0, _1)]
    Custom(String, Span)
}

impl From<io::Error> for Error {
    fn from(src: io::Error) -> Self {
        Error::Io(src)
    }
}


/// Splits an in-memory input into whitespace separated tokens.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Tokens<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Byte offset of the next unread byte.
    pub fn offset(&self) -> usize {
        self.pos
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.data.len() && self.data[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    /// Returns `true` if only whitespace is left.
    pub fn is_eof(&mut self) -> bool {
        self.skip_whitespace();
        self.pos == self.data.len()
    }

    /// Returns the next token or `UnexpectedEof` if there is none.
    pub fn next_token(&mut self) -> Result<SpannedData<'a>, Error> {
        self.skip_whitespace();
        if self.pos == self.data.len() {
            return Err(Error::UnexpectedEof(self.pos));
        }

        let lo = self.pos;
        while self.pos < self.data.len() && !self.data[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }

        Ok(SpannedData {
            data: &self.data[lo..self.pos],
            span: Span::new(lo, self.pos),
        })
    }

    /// Reads the next token and parses it as `T`. `what` describes the
    /// expected value for the error message.
    pub fn parse<T: FromStr>(&mut self, what: &str) -> Result<T, Error> {
        let token = self.next_token()?;
        token.assert_ascii()?
            .parse()
            .map_err(|_| token.error(format!(
                "expected {}, found {}",
                what,
                debug_fmt_bytes(token.data),
            )))
    }

    /// Like `parse::<f64>`, but rejects `inf` and `nan`.
    pub fn parse_finite(&mut self, what: &str) -> Result<f64, Error> {
        let token = self.next_token()?;
        match token.assert_ascii()?.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(token.error(format!(
                "expected finite {}, found {}",
                what,
                debug_fmt_bytes(token.data),
            ))),
        }
    }

    /// Reads the next token and checks that it is one of `expected`.
    pub fn expect_one_of(&mut self, expected: &[&str]) -> Result<&'a str, Error> {
        let token = self.next_token()?;
        match expected.iter().find(|e| e.as_bytes() == token.data) {
            Some(_) => token.assert_ascii(),
            None => Err(token.error(format!(
                "expected one of {:?}, found {}",
                expected,
                debug_fmt_bytes(token.data),
            ))),
        }
    }
}


pub fn debug_fmt_bytes(data: &[u8]) -> String {
    if let Ok(s) = std::str::from_utf8(data) {
        format!("{:?}", s)
    } else {
        format!("{:?}", data)
    }
}
