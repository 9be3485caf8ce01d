use crate::error::Error;
use crate::token::{lookup_keyword, Pos, Token, TokenKind};

/// Turns a source file into the token stream the parser consumes.
/// Whitespace and `//` line comments are discarded; every newline
/// becomes an `Eol` token and the stream always ends with `Eof`.
pub struct Scanner<'a> {
    file: &'a str,
    src: &'a [u8],
    line: usize,
    start: usize,
    cur: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(file: &'a str, src: &'a str) -> Scanner<'a> {
        Scanner {
            file,
            src: src.as_bytes(),
            line: 1,
            start: 0,
            cur: 0,
        }
    }

    pub fn scan(mut self) -> Result<Vec<Token>, Error> {
        let mut toks = Vec::with_capacity(256);
        loop {
            let tok = self.scan_token()?;
            let done = tok.kind == TokenKind::Eof;
            toks.push(tok);
            if done {
                return Ok(toks);
            }
        }
    }

    fn pos(&self) -> Pos {
        Pos {
            file: self.file.to_string(),
            line: self.line,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.src.get(self.cur).copied()
    }

    fn peek_next(&self) -> Option<u8> {
        self.src.get(self.cur + 1).copied()
    }

    fn advance(&mut self) {
        self.cur += 1;
    }

    fn lexeme(&self) -> &'a str {
        // The scanner only slices at ASCII boundaries it has walked.
        std::str::from_utf8(&self.src[self.start..self.cur]).unwrap_or_default()
    }

    fn make(&self, kind: TokenKind) -> Token {
        Token {
            kind,
            lex: self.lexeme().to_string(),
            value: 0,
            pos: self.pos(),
        }
    }

    fn scan_token(&mut self) -> Result<Token, Error> {
        loop {
            self.start = self.cur;

            let ch = match self.peek() {
                Some(ch) => ch,
                None => return Ok(self.make(TokenKind::Eof)),
            };

            match ch {
                b' ' | b'\t' | b'\r' => {
                    self.advance();
                    continue;
                }

                b'/' if self.peek_next() == Some(b'/') => {
                    while self.peek().is_some_and(|c| c != b'\n') {
                        self.advance();
                    }
                    continue;
                }

                b'\n' => {
                    self.advance();
                    let tok = self.make(TokenKind::Eol);
                    self.line += 1;
                    return Ok(tok);
                }

                b'\'' => return self.scan_char(),
                b'"' => return self.scan_str(),

                b':' => {
                    self.advance();
                    return Ok(self.make(TokenKind::Colon));
                }
                b',' => {
                    self.advance();
                    return Ok(self.make(TokenKind::Comma));
                }
                b'.' => {
                    self.advance();
                    return Ok(self.make(TokenKind::Dot));
                }

                _ if is_letter(ch) => {
                    while self.peek().is_some_and(is_alpha) {
                        self.advance();
                    }
                    let kind = lookup_keyword(self.lexeme());
                    return Ok(self.make(kind));
                }

                _ if ch.is_ascii_digit() => {
                    while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                        self.advance();
                    }
                    let value = self
                        .lexeme()
                        .parse::<u16>()
                        .map_err(|_| Error::NumOutOfRange { pos: self.pos() })?;
                    let mut tok = self.make(TokenKind::Num);
                    tok.value = value;
                    return Ok(tok);
                }

                _ => {
                    return Err(Error::UnexpectedChar {
                        pos: self.pos(),
                        ch: ch as char,
                    })
                }
            }
        }
    }

    fn scan_char(&mut self) -> Result<Token, Error> {
        self.advance(); // opening quote
        while self.peek().is_some_and(|c| c != b'\'' && c != b'\n') {
            self.advance();
        }
        if self.peek() != Some(b'\'') {
            return Err(Error::UnterminatedChar { pos: self.pos() });
        }

        let inner = &self.src[self.start + 1..self.cur];
        if inner.len() != 1 {
            return Err(Error::NotSingleChar { pos: self.pos() });
        }
        let value = inner[0];
        self.advance(); // closing quote

        let mut tok = self.make(TokenKind::Char);
        tok.lex = (value as char).to_string();
        tok.value = u16::from(value);
        Ok(tok)
    }

    fn scan_str(&mut self) -> Result<Token, Error> {
        self.advance(); // opening quote
        while self.peek().is_some_and(|c| c != b'"' && c != b'\n') {
            self.advance();
        }
        if self.peek() != Some(b'"') {
            return Err(Error::UnterminatedStr { pos: self.pos() });
        }

        let inner = &self.src[self.start + 1..self.cur];
        if inner.is_empty() {
            return Err(Error::EmptyStr { pos: self.pos() });
        }
        let lex = std::str::from_utf8(inner)
            .unwrap_or_default()
            .to_string();
        self.advance(); // closing quote

        let mut tok = self.make(TokenKind::Str);
        tok.lex = lex;
        Ok(tok)
    }
}

fn is_letter(ch: u8) -> bool {
    ch.is_ascii_alphabetic() || ch == b'_'
}

fn is_alpha(ch: u8) -> bool {
    is_letter(ch) || ch.is_ascii_digit()
}
