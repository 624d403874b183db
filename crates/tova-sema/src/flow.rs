//! Return-path analysis.
//!
//! Decides whether every execution path through a statement list reaches a
//! `return`. Used to warn (not error — the trailing expression is an
//! implicit return) when a function with a declared return type has a
//! path that falls through.

use tova_ast::{Expr, LambdaBody, MatchExpr, Stmt};

/// Whether some statement in the list definitely returns.
pub fn always_returns(stmts: &[Stmt]) -> bool {
    stmts.iter().any(stmt_returns)
}

/// Whether a single statement definitely returns.
pub fn stmt_returns(stmt: &Stmt) -> bool {
    match stmt {
        Stmt::Return(_) => true,
        Stmt::Block(b) => always_returns(&b.body),
        Stmt::If(ifs) => match &ifs.else_body {
            // No else: the fall-through path skips the whole statement.
            None => false,
            Some(else_body) => {
                always_returns(&ifs.then_body)
                    && ifs.elifs.iter().all(|e| always_returns(&e.body))
                    && always_returns(else_body)
            }
        },
        Stmt::TryCatch(tc) => {
            always_returns(&tc.body)
                && tc.catch_body.as_ref().map_or(true, |c| always_returns(c))
        }
        // A match statement proves return when it cannot fall through.
        Stmt::ExprStmt(es) => match es.expr.as_ref() {
            Expr::MatchExpr(m) => match_returns(m),
            _ => false,
        },
        // A guard only handles the failure path; success flows onward.
        Stmt::Guard(_) => false,
        _ => false,
    }
}

fn match_returns(m: &MatchExpr) -> bool {
    let has_catch_all = m
        .arms
        .iter()
        .any(|arm| arm.pattern.is_catch_all() && arm.guard.is_none());
    has_catch_all
        && m.arms.iter().all(|arm| match &arm.body {
            LambdaBody::Block(body) => always_returns(body),
            LambdaBody::Expr(_) => false,
        })
}
