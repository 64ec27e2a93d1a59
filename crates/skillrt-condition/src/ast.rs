//! AST for condition expressions (§4.A).

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Eq,
    NotEq,
    Gte,
    Lte,
    Gt,
    Lt,
    And,
    Or,
}

impl BinaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Gte => ">=",
            BinaryOp::Lte => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Lt => "<",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

/// A small, closed sum evaluated by exhaustive pattern match (§9 design
/// note: "Visitor AST → dispatch").
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    VariableRef(Vec<String>),
    NullLit,
    BoolLit(bool),
    NumberLit(f64),
    StringLit(String),
}
