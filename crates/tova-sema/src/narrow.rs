//! Flow-sensitive type narrowing.
//!
//! Derives a refined type for a tested name from a branch condition. The
//! analyzer installs the `on_true` side as an overlay in the then-branch
//! scope and `on_false` in the else-branch scope; `guard` applies
//! `on_true` to the current scope, since its failure arm exits.

use tova_ast::{BinaryOp, Expr, UnaryOp};

use crate::infer::InferCx;
use crate::ty::Ty;

/// A narrowing fact learned from a condition: what the named binding's
/// type becomes on each branch. A `None` side installs no overlay.
#[derive(Clone, Debug, PartialEq)]
pub struct Narrowing {
    pub name: String,
    pub on_true: Option<String>,
    pub on_false: Option<String>,
}

impl Narrowing {
    fn new(name: &str, on_true: Option<Ty>, on_false: Option<Ty>) -> Self {
        Narrowing {
            name: name.to_string(),
            on_true: on_true.map(|t| t.to_string()),
            on_false: on_false.map(|t| t.to_string()),
        }
    }

    /// Swap the branches (for `not` conditions).
    fn inverted(mut self) -> Self {
        std::mem::swap(&mut self.on_true, &mut self.on_false);
        self
    }
}

/// The primitive named by a `type_of` result string.
fn type_of_result(name: &str) -> Option<Ty> {
    match name {
        "Int" => Some(Ty::int()),
        "Float" => Some(Ty::float()),
        "String" => Some(Ty::string()),
        "Bool" => Some(Ty::bool()),
        "Nil" => Some(Ty::Nil),
        "Array" => Some(Ty::array(Ty::Any)),
        _ => None,
    }
}

/// The single identifier argument of a `type_of(x)` call, if the
/// expression is one.
fn type_of_subject(expr: &Expr) -> Option<&str> {
    let Expr::CallExpr(call) = expr else { return None };
    let Expr::Identifier(callee) = call.callee.as_ref() else { return None };
    if callee.name != "type_of" || call.args.len() != 1 {
        return None;
    }
    match &call.args[0].value {
        Expr::Identifier(id) => Some(&id.name),
        _ => None,
    }
}

/// Extract the narrowing fact a condition proves, if any.
pub fn from_condition(cx: &InferCx, cond: &Expr) -> Option<Narrowing> {
    match cond {
        Expr::UnaryExpr(un) if un.op == UnaryOp::Not => {
            from_condition(cx, &un.operand).map(Narrowing::inverted)
        }

        Expr::BinaryExpr(bin) if bin.op == BinaryOp::Eq || bin.op == BinaryOp::Ne => {
            // type_of(x) == "S" (either operand order).
            let type_test = match (type_of_subject(&bin.left), &*bin.right) {
                (Some(name), Expr::StringLit(s)) => Some((name, s.value.as_str())),
                _ => match (type_of_subject(&bin.right), &*bin.left) {
                    (Some(name), Expr::StringLit(s)) => Some((name, s.value.as_str())),
                    _ => None,
                },
            };
            if let Some((name, tag)) = type_test {
                let narrowed = type_of_result(tag)?;
                let n = Narrowing::new(name, Some(narrowed), None);
                return Some(if bin.op == BinaryOp::Eq { n } else { n.inverted() });
            }

            // x == nil / x != nil (either operand order).
            let nil_test = match (&*bin.left, &*bin.right) {
                (Expr::Identifier(id), Expr::NilLit(_)) => Some(id.name.as_str()),
                (Expr::NilLit(_), Expr::Identifier(id)) => Some(id.name.as_str()),
                _ => None,
            };
            if let Some(name) = nil_test {
                let stripped = cx.type_of_name(name).map(|t| t.strip_nil());
                let n = Narrowing::new(name, Some(Ty::Nil), stripped);
                // `== nil`: then-branch Nil. `!= nil`: the inverse.
                return Some(if bin.op == BinaryOp::Eq { n } else { n.inverted() });
            }
            None
        }

        // x.isOk() / x.isErr() / x.isSome() / x.isNone()
        Expr::CallExpr(call) if call.args.is_empty() => {
            let Expr::MemberExpr(member) = call.callee.as_ref() else { return None };
            let Expr::Identifier(obj) = member.object.as_ref() else { return None };
            let obj_ty = cx.type_of_name(&obj.name)?;
            let Ty::Generic(base, args) = obj_ty else { return None };

            match (base.as_str(), member.property.as_str()) {
                ("Result", "isOk") | ("Result", "isErr") => {
                    let ok = Ty::Generic("Ok".into(), vec![args.first().cloned().unwrap_or(Ty::Unknown)]);
                    let err = Ty::Generic("Err".into(), vec![args.get(1).cloned().unwrap_or(Ty::Unknown)]);
                    let n = Narrowing::new(&obj.name, Some(ok), Some(err));
                    Some(if member.property == "isOk" { n } else { n.inverted() })
                }
                ("Option", "isSome") | ("Option", "isNone") => {
                    let some =
                        Ty::Generic("Some".into(), vec![args.first().cloned().unwrap_or(Ty::Unknown)]);
                    let none = Ty::Name("None".into());
                    let n = Narrowing::new(&obj.name, Some(some), Some(none));
                    Some(if member.property == "isSome" { n } else { n.inverted() })
                }
                _ => None,
            }
        }

        _ => None,
    }
}
