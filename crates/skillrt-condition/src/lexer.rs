//! Tokenizer for `when` condition expressions (§4.A grammar).

#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    Ident(String),
    Number(f64),
    StringLit(String),
    DoubleLBrace,
    DoubleRBrace,
    Dot,
    EqEq,
    NotEq,
    Gte,
    Lte,
    Gt,
    Lt,
    AndAnd,
    OrOr,
    Eof,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub pos: usize,
}

pub struct Lexer<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LexError {
    pub pos: usize,
    pub message: String,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
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

        match b {
            b'{' if self.peek_at(1) == Some(b'{') => {
                self.pos += 2;
                Ok(Token {
                    kind: TokenKind::DoubleLBrace,
                    pos: start,
                })
            }
            b'}' if self.peek_at(1) == Some(b'}') => {
                self.pos += 2;
                Ok(Token {
                    kind: TokenKind::DoubleRBrace,
                    pos: start,
                })
            }
            b'.' => {
                self.pos += 1;
                Ok(Token {
                    kind: TokenKind::Dot,
                    pos: start,
                })
            }
            b'=' if self.peek_at(1) == Some(b'=') => {
                self.pos += 2;
                Ok(Token {
                    kind: TokenKind::EqEq,
                    pos: start,
                })
            }
            b'!' if self.peek_at(1) == Some(b'=') => {
                self.pos += 2;
                Ok(Token {
                    kind: TokenKind::NotEq,
                    pos: start,
                })
            }
            b'>' if self.peek_at(1) == Some(b'=') => {
                self.pos += 2;
                Ok(Token {
                    kind: TokenKind::Gte,
                    pos: start,
                })
            }
            b'<' if self.peek_at(1) == Some(b'=') => {
                self.pos += 2;
                Ok(Token {
                    kind: TokenKind::Lte,
                    pos: start,
                })
            }
            b'>' => {
                self.pos += 1;
                Ok(Token {
                    kind: TokenKind::Gt,
                    pos: start,
                })
            }
            b'<' => {
                self.pos += 1;
                Ok(Token {
                    kind: TokenKind::Lt,
                    pos: start,
                })
            }
            b'&' if self.peek_at(1) == Some(b'&') => {
                self.pos += 2;
                Ok(Token {
                    kind: TokenKind::AndAnd,
                    pos: start,
                })
            }
            b'|' if self.peek_at(1) == Some(b'|') => {
                self.pos += 2;
                Ok(Token {
                    kind: TokenKind::OrOr,
                    pos: start,
                })
            }
            b'"' | b'\'' => self.lex_string(b),
            b'-' | b'0'..=b'9' => self.lex_number(),
            b if is_ident_start(b) => self.lex_ident(),
            other => Err(LexError {
                pos: start,
                message: format!("unexpected character '{}'", other as char),
            }),
        }
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
        let text = self.src[start..self.pos].to_string();
        Ok(Token {
            kind: TokenKind::Ident(text),
            pos: start,
        })
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_variable_ref() {
        let tokens = Lexer::new("{{x.y}}").tokenize().unwrap();
        assert_eq!(
            tokens,
            vec![
                Token { kind: TokenKind::DoubleLBrace, pos: 0 },
                Token { kind: TokenKind::Ident("x".into()), pos: 2 },
                Token { kind: TokenKind::Dot, pos: 3 },
                Token { kind: TokenKind::Ident("y".into()), pos: 4 },
                Token { kind: TokenKind::DoubleRBrace, pos: 5 },
                Token { kind: TokenKind::Eof, pos: 7 },
            ]
        );
    }

    #[test]
    fn tokenizes_operators() {
        let tokens = Lexer::new("a == b && c != 1 || d >= -2.5").tokenize().unwrap();
        let kinds: Vec<TokenKind> = tokens.into_iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Ident("a".into()),
                TokenKind::EqEq,
                TokenKind::Ident("b".into()),
                TokenKind::AndAnd,
                TokenKind::Ident("c".into()),
                TokenKind::NotEq,
                TokenKind::Number(1.0),
                TokenKind::OrOr,
                TokenKind::Ident("d".into()),
                TokenKind::Gte,
                TokenKind::Number(-2.5),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn tokenizes_strings_both_quotes() {
        let tokens = Lexer::new(r#"'a' "b""#).tokenize().unwrap();
        assert_eq!(tokens[0].kind, TokenKind::StringLit("a".into()));
        assert_eq!(tokens[1].kind, TokenKind::StringLit("b".into()));
    }

    #[test]
    fn unterminated_string_errors() {
        let err = Lexer::new("\"abc").tokenize().unwrap_err();
        assert_eq!(err.pos, 0);
    }
}
