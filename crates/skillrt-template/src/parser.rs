//! Recursive-descent parser for the `{{ }}` expression grammar (§4.B):
//! `expr := term (("+"|"-") term)*`, `term := factor (("*"|"/") factor)*`.

use skillrt_core::SkillError;

use crate::ast::{ArithOp, IndexExpr, PathSegment, TemplateExpr};
use crate::lexer::{Lexer, Token, TokenKind};

pub struct ExprParser {
    tokens: Vec<Token>,
    pos: usize,
    template: String,
}

fn token_description(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Ident(s) => s.clone(),
        TokenKind::Number(n) => n.to_string(),
        TokenKind::StringLit(s) => format!("\"{s}\""),
        TokenKind::Underscore => "_".to_string(),
        TokenKind::Dot => ".".to_string(),
        TokenKind::LBracket => "[".to_string(),
        TokenKind::RBracket => "]".to_string(),
        TokenKind::Hash => "#".to_string(),
        TokenKind::Plus => "+".to_string(),
        TokenKind::Minus => "-".to_string(),
        TokenKind::Star => "*".to_string(),
        TokenKind::Slash => "/".to_string(),
        TokenKind::Eof => "end of expression".to_string(),
    }
}

/// Parse the content of one `{{ ... }}` marker into a [`TemplateExpr`].
pub fn parse_expr(source: &str, template: &str) -> Result<TemplateExpr, SkillError> {
    let tokens = Lexer::new(source)
        .tokenize()
        .map_err(|e| SkillError::TemplateRender {
            template: template.to_string(),
            position: e.pos,
            reason: e.message,
        })?;
    let mut parser = ExprParser {
        tokens,
        pos: 0,
        template: template.to_string(),
    };
    let expr = parser.parse_additive()?;
    parser.expect_eof()?;
    Ok(expr)
}

/// Parse a bare variable path (used for `{{#for <path>}}` array paths,
/// which share `var_access` grammar but aren't wrapped in arithmetic).
pub fn parse_var_path(source: &str, template: &str) -> Result<Vec<PathSegment>, SkillError> {
    let tokens = Lexer::new(source)
        .tokenize()
        .map_err(|e| SkillError::TemplateRender {
            template: template.to_string(),
            position: e.pos,
            reason: e.message,
        })?;
    let mut parser = ExprParser {
        tokens,
        pos: 0,
        template: template.to_string(),
    };
    let path = parser.parse_var_access()?;
    parser.expect_eof()?;
    Ok(path)
}

impl ExprParser {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn error(&self, expected: &str) -> SkillError {
        SkillError::TemplateRender {
            template: self.template.clone(),
            position: self.peek().pos,
            reason: format!("expected {expected}, found {}", token_description(&self.peek().kind)),
        }
    }

    fn expect_eof(&mut self) -> Result<(), SkillError> {
        if self.peek().kind == TokenKind::Eof {
            Ok(())
        } else {
            Err(self.error("end of expression"))
        }
    }

    fn parse_additive(&mut self) -> Result<TemplateExpr, SkillError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Plus => ArithOp::Add,
                TokenKind::Minus => ArithOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = TemplateExpr::Binary(op, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<TemplateExpr, SkillError> {
        let mut left = self.parse_factor()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Star => ArithOp::Mul,
                TokenKind::Slash => ArithOp::Div,
                _ => break,
            };
            self.advance();
            let right = self.parse_factor()?;
            left = TemplateExpr::Binary(op, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_factor(&mut self) -> Result<TemplateExpr, SkillError> {
        match self.peek().kind.clone() {
            TokenKind::Number(n) => {
                self.advance();
                Ok(TemplateExpr::Number(n))
            }
            TokenKind::StringLit(s) => {
                self.advance();
                Ok(TemplateExpr::StringLit(s))
            }
            TokenKind::Underscore => {
                self.advance();
                Ok(TemplateExpr::Current)
            }
            TokenKind::Ident(_) => Ok(TemplateExpr::Var(self.parse_var_access()?)),
            _ => Err(self.error("a number, string, '_', or variable")),
        }
    }

    fn parse_var_access(&mut self) -> Result<Vec<PathSegment>, SkillError> {
        let mut segments = Vec::new();
        match self.peek().kind.clone() {
            TokenKind::Ident(name) => {
                segments.push(PathSegment::Field(name));
                self.advance();
            }
            _ => return Err(self.error("an identifier")),
        }
        loop {
            match self.peek().kind {
                TokenKind::Dot => {
                    self.advance();
                    match self.peek().kind.clone() {
                        TokenKind::Ident(name) => {
                            segments.push(PathSegment::Field(name));
                            self.advance();
                        }
                        _ => return Err(self.error("an identifier after '.'")),
                    }
                }
                TokenKind::LBracket => {
                    self.advance();
                    let idx = self.parse_index()?;
                    segments.push(PathSegment::Index(idx));
                    if self.peek().kind != TokenKind::RBracket {
                        return Err(self.error("']'"));
                    }
                    self.advance();
                }
                _ => break,
            }
        }
        Ok(segments)
    }

    fn parse_index(&mut self) -> Result<IndexExpr, SkillError> {
        match self.peek().kind.clone() {
            TokenKind::Number(n) if n.fract() == 0.0 => {
                self.advance();
                Ok(IndexExpr::Literal(n as i64))
            }
            TokenKind::Hash => {
                self.advance();
                match self.peek().kind.clone() {
                    TokenKind::Ident(name) => {
                        self.advance();
                        Ok(IndexExpr::Variable(name))
                    }
                    _ => Err(self.error("an identifier after '#'")),
                }
            }
            _ => Err(self.error("an integer or '#ident' index")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_arithmetic_precedence() {
        let expr = parse_expr("1 + 2 * 3", "t").unwrap();
        match expr {
            TemplateExpr::Binary(ArithOp::Add, l, r) => {
                assert_eq!(*l, TemplateExpr::Number(1.0));
                assert!(matches!(*r, TemplateExpr::Binary(ArithOp::Mul, _, _)));
            }
            _ => panic!("expected top-level +"),
        }
    }

    #[test]
    fn parses_indexed_var_access() {
        let segments = parse_var_path("items[2].name", "t").unwrap();
        assert_eq!(
            segments,
            vec![
                PathSegment::Field("items".into()),
                PathSegment::Index(IndexExpr::Literal(2)),
                PathSegment::Field("name".into()),
            ]
        );
    }

    #[test]
    fn parses_variable_index() {
        let segments = parse_var_path("items[#i]", "t").unwrap();
        assert_eq!(
            segments,
            vec![
                PathSegment::Field("items".into()),
                PathSegment::Index(IndexExpr::Variable("i".into())),
            ]
        );
    }

    #[test]
    fn trailing_tokens_are_an_error() {
        assert!(parse_expr("1 +", "t").is_err());
        assert!(parse_expr("1 2", "t").is_err());
    }
}
