//! Visitor pattern for AST nodes.

use crate::ast::Expr;

pub trait Visitor<'ast>: Sized {
    fn visit_expr(&mut self, expr: &'ast Expr) {
        walk_expr(self, expr);
    }
}

pub fn walk_expr<'ast>(visitor: &mut impl Visitor<'ast>, expr: &'ast Expr) {
    match expr {
        Expr::NumberLit(_) => {}
        Expr::StringLit(_) => {}
        Expr::Identifier(_) => {}
        Expr::FnCall { ident: _, args } => {
            for arg in args {
                visitor.visit_expr(arg);
            }
        }
        Expr::Binary { lhs, op: _, rhs } => {
            visitor.visit_expr(lhs);
            visitor.visit_expr(rhs);
        }
        Expr::Unary { op: _, arg } => visitor.visit_expr(arg),
    }
}

/// Collects the names of all called functions, outermost first, without duplicates.
struct FnCallCollector<'ast> {
    idents: Vec<&'ast str>,
}

impl<'ast> Visitor<'ast> for FnCallCollector<'ast> {
    fn visit_expr(&mut self, expr: &'ast Expr) {
        if let Expr::FnCall { ident, .. } = expr {
            if !self.idents.contains(&ident.as_str()) {
                self.idents.push(ident);
            }
        }
        walk_expr(self, expr);
    }
}

/// Returns the name of every function `expr` calls.
pub fn called_functions(expr: &Expr) -> Vec<&str> {
    let mut collector = FnCallCollector { idents: Vec::new() };
    collector.visit_expr(expr);
    collector.idents
}
