//! Abstract syntax tree for the guest language.

/// A statement. A program is a sequence of statements; the value of the
/// last evaluated statement is the program's completion value.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `let name = expr`
    Let(String, Expr),
    /// `name = expr` (creates the variable if it does not exist)
    Assign(String, Expr),
    /// `if (cond) { ... } else { ... }`
    If {
        cond: Expr,
        then_branch: Vec<Stmt>,
        else_branch: Option<Vec<Stmt>>,
    },
    /// `while (cond) { ... }`
    While { cond: Expr, body: Vec<Stmt> },
    /// A bare expression statement.
    Expr(Expr),
}

/// An expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
    Ident(String),
    Array(Vec<Expr>),
    Object(Vec<(String, Expr)>),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    /// Call of a host-registered builtin function.
    Call(String, Vec<Expr>),
    /// `base[index]` on arrays, objects and strings.
    Index(Box<Expr>, Box<Expr>),
}

impl Expr {
    /// Detaches all direct child expressions into `out`, leaving `Expr::Null`
    /// placeholders behind.
    fn take_children(&mut self, out: &mut Vec<Expr>) {
        match self {
            Expr::Array(items) => out.append(items),
            Expr::Object(entries) => out.extend(entries.drain(..).map(|(_, v)| v)),
            Expr::Unary(_, operand) => out.push(std::mem::replace(operand.as_mut(), Expr::Null)),
            Expr::Binary(_, left, right) => {
                out.push(std::mem::replace(left.as_mut(), Expr::Null));
                out.push(std::mem::replace(right.as_mut(), Expr::Null));
            }
            Expr::Call(_, args) => out.append(args),
            Expr::Index(base, index) => {
                out.push(std::mem::replace(base.as_mut(), Expr::Null));
                out.push(std::mem::replace(index.as_mut(), Expr::Null));
            }
            _ => {}
        }
    }
}

impl Drop for Expr {
    /// Drops iteratively. Long operator chains parse into deep left-leaning
    /// trees whose default recursive drop would overflow the stack.
    fn drop(&mut self) {
        let mut children = Vec::new();
        self.take_children(&mut children);
        while let Some(mut child) = children.pop() {
            child.take_children(&mut children);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dropping_a_deep_expression_chain_does_not_overflow() {
        let mut expr = Expr::Number(1.0);
        for _ in 0..200_000 {
            expr = Expr::Binary(BinaryOp::Add, Box::new(expr), Box::new(Expr::Number(1.0)));
        }
        drop(expr);
    }
}
