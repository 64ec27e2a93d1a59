//! Recursive-descent parser for condition expressions (§4.A grammar,
//! operator precedence high → low: comparison, `&&`, `||`).

use skillrt_core::SkillError;

use crate::ast::{BinaryOp, Expr};
use crate::lexer::{Lexer, Token, TokenKind};

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

fn token_description(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Ident(s) => s.clone(),
        TokenKind::Number(n) => n.to_string(),
        TokenKind::StringLit(s) => format!("\"{s}\""),
        TokenKind::DoubleLBrace => "{{".to_string(),
        TokenKind::DoubleRBrace => "}}".to_string(),
        TokenKind::Dot => ".".to_string(),
        TokenKind::EqEq => "==".to_string(),
        TokenKind::NotEq => "!=".to_string(),
        TokenKind::Gte => ">=".to_string(),
        TokenKind::Lte => "<=".to_string(),
        TokenKind::Gt => ">".to_string(),
        TokenKind::Lt => "<".to_string(),
        TokenKind::AndAnd => "&&".to_string(),
        TokenKind::OrOr => "||".to_string(),
        TokenKind::Eof => "end of expression".to_string(),
    }
}

/// Parse a `when` condition expression into an AST.
pub fn parse(expr: &str) -> Result<Expr, SkillError> {
    let tokens = Lexer::new(expr)
        .tokenize()
        .map_err(|e| SkillError::ConditionParse {
            position: e.pos,
            expected: "a valid token".to_string(),
            found: e.message,
        })?;
    let mut parser = Parser { tokens, pos: 0 };
    let result = parser.parse_or()?;
    parser.expect_eof()?;
    Ok(result)
}

impl Parser {
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
        SkillError::ConditionParse {
            position: self.peek().pos,
            expected: expected.to_string(),
            found: token_description(&self.peek().kind),
        }
    }

    fn expect_eof(&mut self) -> Result<(), SkillError> {
        if self.peek().kind == TokenKind::Eof {
            Ok(())
        } else {
            Err(self.error("end of expression"))
        }
    }

    fn parse_or(&mut self) -> Result<Expr, SkillError> {
        let mut left = self.parse_and()?;
        while self.peek().kind == TokenKind::OrOr {
            self.advance();
            let right = self.parse_and()?;
            left = Expr::Binary(BinaryOp::Or, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, SkillError> {
        let mut left = self.parse_comparison()?;
        while self.peek().kind == TokenKind::AndAnd {
            self.advance();
            let right = self.parse_comparison()?;
            left = Expr::Binary(BinaryOp::And, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Expr, SkillError> {
        let left = self.parse_operand()?;
        let op = match self.peek().kind {
            TokenKind::EqEq => Some(BinaryOp::Eq),
            TokenKind::NotEq => Some(BinaryOp::NotEq),
            TokenKind::Gte => Some(BinaryOp::Gte),
            TokenKind::Lte => Some(BinaryOp::Lte),
            TokenKind::Gt => Some(BinaryOp::Gt),
            TokenKind::Lt => Some(BinaryOp::Lt),
            _ => None,
        };
        let Some(op) = op else {
            return Ok(left);
        };
        self.advance();
        let right = self.parse_operand()?;
        Ok(Expr::Binary(op, Box::new(left), Box::new(right)))
    }

    fn parse_operand(&mut self) -> Result<Expr, SkillError> {
        match self.peek().kind.clone() {
            TokenKind::DoubleLBrace => {
                self.advance();
                let path = self.parse_dotted_path()?;
                if self.peek().kind != TokenKind::DoubleRBrace {
                    return Err(self.error("}}"));
                }
                self.advance();
                Ok(Expr::VariableRef(path))
            }
            TokenKind::Ident(name) => match name.as_str() {
                "null" => {
                    self.advance();
                    Ok(Expr::NullLit)
                }
                "true" => {
                    self.advance();
                    Ok(Expr::BoolLit(true))
                }
                "false" => {
                    self.advance();
                    Ok(Expr::BoolLit(false))
                }
                _ => {
                    let path = self.parse_dotted_path()?;
                    Ok(Expr::VariableRef(path))
                }
            },
            TokenKind::Number(n) => {
                self.advance();
                Ok(Expr::NumberLit(n))
            }
            TokenKind::StringLit(s) => {
                self.advance();
                Ok(Expr::StringLit(s))
            }
            _ => Err(self.error("an operand (variable, literal, or string)")),
        }
    }

    fn parse_dotted_path(&mut self) -> Result<Vec<String>, SkillError> {
        let mut path = Vec::new();
        match self.peek().kind.clone() {
            TokenKind::Ident(name) => {
                path.push(name);
                self.advance();
            }
            _ => return Err(self.error("an identifier")),
        }
        while self.peek().kind == TokenKind::Dot {
            self.advance();
            match self.peek().kind.clone() {
                TokenKind::Ident(name) => {
                    path.push(name);
                    self.advance();
                }
                _ => return Err(self.error("an identifier after '.'")),
            }
        }
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_braced_variable_ref() {
        let ast = parse("{{x.y}} == null").unwrap();
        assert_eq!(
            ast,
            Expr::Binary(
                BinaryOp::Eq,
                Box::new(Expr::VariableRef(vec!["x".into(), "y".into()])),
                Box::new(Expr::NullLit),
            )
        );
    }

    #[test]
    fn parses_bare_variable_ref() {
        let ast = parse("flag == true").unwrap();
        assert_eq!(
            ast,
            Expr::Binary(
                BinaryOp::Eq,
                Box::new(Expr::VariableRef(vec!["flag".into()])),
                Box::new(Expr::BoolLit(true)),
            )
        );
    }

    #[test]
    fn precedence_and_binds_tighter_than_or() {
        let ast = parse("a == 1 || b == 2 && c == 3").unwrap();
        // a==1 || (b==2 && c==3)
        match ast {
            Expr::Binary(BinaryOp::Or, left, right) => {
                assert!(matches!(*left, Expr::Binary(BinaryOp::Eq, _, _)));
                assert!(matches!(*right, Expr::Binary(BinaryOp::And, _, _)));
            }
            _ => panic!("expected top-level ||"),
        }
    }

    #[test]
    fn malformed_expression_reports_position() {
        let err = parse("{{x}} &&").unwrap_err();
        match err {
            SkillError::ConditionParse { position, .. } => assert_eq!(position, 8),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unclosed_braces_is_parse_error() {
        let err = parse("{{x").unwrap_err();
        assert!(matches!(err, SkillError::ConditionParse { .. }));
    }
}
