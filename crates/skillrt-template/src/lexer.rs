//! Tokenizer for the expression grammar inside `{{ }}` markers (§4.B).

#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    Ident(String),
    Number(f64),
    StringLit(String),
    Underscore,
    Dot,
    LBracket,
    RBracket,
    Hash,
    Plus,
    Minus,
    Star,
    Slash,
    Eof,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub pos: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LexError {
    pub pos: usize,
    pub message: String,
}

pub struct Lexer<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    /// Kind of the last token emitted, used to disambiguate a leading `-`
    /// between the subtraction operator and a negative number literal.
    prev: Option<TokenKind>,
}

/// Whether a token can end an expression/term, i.e. a `-` right after it is
/// subtraction rather than the sign of a number literal.
fn is_operand_end(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Ident(_) | TokenKind::Number(_) | TokenKind::StringLit(_) | TokenKind::Underscore | TokenKind::RBracket
    )
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
            prev: None,
        }
    }

    fn peek_byte(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek_byte(), Some(b) if b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token()?;
            let is_eof = tok.kind == TokenKind::Eof;
            tokens.push(tok);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace();
        let start = self.pos;
        let Some(b) = self.peek_byte() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                pos: start,
            });
        };

        // A `-` only starts a negative number literal in prefix position
        // (start of the expression, or right after an operator/opener);
        // right after an operand it's the subtraction operator, regardless
        // of whether a digit immediately follows (`a-2` vs `a - 2`).
        let minus_is_subtraction = b == b'-' && matches!(&self.prev, Some(k) if is_operand_end(k));

        let simple = match b {
            b'_' if !matches!(self.peek_at(1), Some(c) if is_ident_continue(c)) => {
                Some(TokenKind::Underscore)
            }
            b'.' => Some(TokenKind::Dot),
            b'[' => Some(TokenKind::LBracket),
            b']' => Some(TokenKind::RBracket),
            b'#' => Some(TokenKind::Hash),
            b'+' => Some(TokenKind::Plus),
            b'-' if minus_is_subtraction => Some(TokenKind::Minus),
            b'*' => Some(TokenKind::Star),
            b'/' => Some(TokenKind::Slash),
            _ => None,
        };
        if let Some(kind) = simple {
            self.pos += 1;
            self.prev = Some(kind.clone());
            return Ok(Token { kind, pos: start });
        }

        let token = match b {
            b'"' | b'\'' => self.lex_string(b),
            b'-' | b'0'..=b'9' => self.lex_number(),
            b if is_ident_start(b) => self.lex_ident(),
            other => Err(LexError {
                pos: start,
                message: format!("unexpected character '{}'", other as char),
            }),
        }?;
        self.prev = Some(token.kind.clone());
        Ok(token)
    }

    fn lex_string(&mut self, quote: u8) -> Result<Token, LexError> {
        let start = self.pos;
        self.pos += 1;
        let content_start = self.pos;
        while let Some(b) = self.peek_byte() {
            if b == quote {
                let content = &self.src[content_start..self.pos];
                self.pos += 1;
                return Ok(Token {
                    kind: TokenKind::StringLit(content.to_string()),
                    pos: start,
                });
            }
            self.pos += 1;
        }
        Err(LexError {
            pos: start,
            message: "unterminated string literal".to_string(),
        })
    }

    fn lex_number(&mut self) -> Result<Token, LexError> {
        let start = self.pos;
        if self.peek_byte() == Some(b'-') {
            self.pos += 1;
        }
        let digits_start = self.pos;
        while matches!(self.peek_byte(), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
        if self.pos == digits_start {
            return Err(LexError {
                pos: start,
                message: "invalid number literal".to_string(),
            });
        }
        if self.peek_byte() == Some(b'.') && matches!(self.peek_at(1), Some(b'0'..=b'9')) {
            self.pos += 1;
            while matches!(self.peek_byte(), Some(b'0'..=b'9')) {
                self.pos += 1;
            }
        }
        let text = &self.src[start..self.pos];
        let value: f64 = text.parse().map_err(|_| LexError {
            pos: start,
            message: format!("invalid number literal '{text}'"),
        })?;
        Ok(Token {
            kind: TokenKind::Number(value),
            pos: start,
        })
    }

    fn lex_ident(&mut self) -> Result<Token, LexError> {
        let start = self.pos;
        while matches!(self.peek_byte(), Some(b) if is_ident_continue(b)) {
            self.pos += 1;
        }
        Ok(Token {
            kind: TokenKind::Ident(self.src[start..self.pos].to_string()),
            pos: start,
        })
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}
