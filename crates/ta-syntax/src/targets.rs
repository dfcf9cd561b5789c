//! Assignment targets the grammar admits but the compiler rejects.
//!
//! The parser builds `x + 1 = 2` into an `Assign` node; CPython refuses it
//! only when compiling. Scripts are never compiled here, so the walk below
//! reports those targets itself.

use rustpython_parser::ast::{self, Expr, Stmt};

use crate::diagnostic::{DiagnosticKind, SyntaxDiagnostic};

/// Check every assignment target in `suite`, nested blocks included.
pub(crate) fn check(source: &str, suite: &[Stmt]) -> Result<(), SyntaxDiagnostic> {
    suite.iter().try_for_each(|stmt| check_stmt(source, stmt))
}

fn check_stmt(source: &str, stmt: &Stmt) -> Result<(), SyntaxDiagnostic> {
    match stmt {
        Stmt::Assign(ast::StmtAssign { targets, range, .. }) => {
            let at = u32::from(range.start()) as usize;
            targets
                .iter()
                .try_for_each(|target| check_target(source, target, at, true))
        }
        Stmt::AugAssign(ast::StmtAugAssign { target, range, .. })
        | Stmt::AnnAssign(ast::StmtAnnAssign { target, range, .. }) => {
            check_target(source, target, u32::from(range.start()) as usize, false)
        }
        Stmt::For(ast::StmtFor {
            target,
            body,
            orelse,
            range,
            ..
        })
        | Stmt::AsyncFor(ast::StmtAsyncFor {
            target,
            body,
            orelse,
            range,
            ..
        }) => {
            check_target(source, target, u32::from(range.start()) as usize, true)?;
            check(source, body)?;
            check(source, orelse)
        }
        Stmt::While(ast::StmtWhile { body, orelse, .. })
        | Stmt::If(ast::StmtIf { body, orelse, .. }) => {
            check(source, body)?;
            check(source, orelse)
        }
        Stmt::FunctionDef(ast::StmtFunctionDef { body, .. })
        | Stmt::AsyncFunctionDef(ast::StmtAsyncFunctionDef { body, .. })
        | Stmt::ClassDef(ast::StmtClassDef { body, .. })
        | Stmt::With(ast::StmtWith { body, .. })
        | Stmt::AsyncWith(ast::StmtAsyncWith { body, .. }) => check(source, body),
        Stmt::Try(ast::StmtTry {
            body,
            handlers,
            orelse,
            finalbody,
            ..
        })
        | Stmt::TryStar(ast::StmtTryStar {
            body,
            handlers,
            orelse,
            finalbody,
            ..
        }) => {
            check(source, body)?;
            for handler in handlers {
                match handler {
                    ast::ExceptHandler::ExceptHandler(handler) => check(source, &handler.body)?,
                }
            }
            check(source, orelse)?;
            check(source, finalbody)
        }
        Stmt::Match(ast::StmtMatch { cases, .. }) => cases
            .iter()
            .try_for_each(|case| check(source, &case.body)),
        _ => Ok(()),
    }
}

/// `unpacking` admits tuple, list and starred targets (plain `=` and `for`).
fn check_target(
    source: &str,
    target: &Expr,
    at: usize,
    unpacking: bool,
) -> Result<(), SyntaxDiagnostic> {
    match target {
        Expr::Name(_) | Expr::Attribute(_) | Expr::Subscript(_) => Ok(()),
        Expr::Tuple(ast::ExprTuple { elts, .. }) | Expr::List(ast::ExprList { elts, .. })
            if unpacking =>
        {
            elts.iter()
                .try_for_each(|elt| check_target(source, elt, at, true))
        }
        Expr::Starred(ast::ExprStarred { value, .. }) if unpacking => {
            check_target(source, value, at, true)
        }
        other => Err(SyntaxDiagnostic::at_offset(
            DiagnosticKind::Syntax,
            source,
            at,
            format!("cannot assign to {}", describe(other)),
        )),
    }
}

fn describe(expr: &Expr) -> &'static str {
    match expr {
        Expr::Constant(_) => "literal",
        Expr::Call(_) => "function call",
        Expr::Tuple(_) => "tuple",
        Expr::List(_) => "list",
        Expr::Starred(_) => "starred",
        _ => "expression",
    }
}
