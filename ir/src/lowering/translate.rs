//! The recursive AST-to-IR translator: every lowering rule in §4.1, driven by the [`Lowerer`]
//! builder and [`super::labels::LabelStack`] state machine.

use smallvec::SmallVec;

use super::builder::Lowerer;
use crate::{
    ast,
    error::LoweringError,
    expr::{ArithOp, Condition, Literal, Operand, RelOp, Rhs, UnaryOp as IrUnaryOp},
    expr::LValue,
    stmt::{CallStmt, ReturnKind, Stmt},
    symbol::Var,
    ty::Type,
};

fn rel_op_of(op: ast::BinaryOp) -> Option<RelOp> {
    match op {
        ast::BinaryOp::Eq => Some(RelOp::Eq),
        ast::BinaryOp::Ne => Some(RelOp::Ne),
        ast::BinaryOp::Lt => Some(RelOp::Lt),
        ast::BinaryOp::Le => Some(RelOp::Le),
        ast::BinaryOp::Gt => Some(RelOp::Gt),
        ast::BinaryOp::Ge => Some(RelOp::Ge),
        _ => None,
    }
}

fn arith_op_of(op: ast::BinaryOp) -> ArithOp {
    match op {
        ast::BinaryOp::Add => ArithOp::Add,
        ast::BinaryOp::Sub => ArithOp::Sub,
        ast::BinaryOp::Mul => ArithOp::Mul,
        ast::BinaryOp::Div => ArithOp::Div,
        ast::BinaryOp::Rem => ArithOp::Rem,
        ast::BinaryOp::Shl => ArithOp::Shl,
        ast::BinaryOp::Shr => ArithOp::Shr,
        ast::BinaryOp::UShr => ArithOp::UShr,
        ast::BinaryOp::BitAnd => ArithOp::And,
        ast::BinaryOp::BitOr => ArithOp::Or,
        ast::BinaryOp::BitXor => ArithOp::Xor,
        ast::BinaryOp::Eq
        | ast::BinaryOp::Ne
        | ast::BinaryOp::Lt
        | ast::BinaryOp::Le
        | ast::BinaryOp::Gt
        | ast::BinaryOp::Ge => unreachable!("relational ops are handled via rel_op_of"),
    }
}

/// Translate a single statement, emitting into `lowerer`.
pub fn lower_stmt(lowerer: &mut Lowerer, stmt: &ast::Stmt) -> Result<(), LoweringError> {
    match stmt {
        ast::Stmt::Expr(ast::Expr::Call {
            receiver,
            signature,
            kind,
            args,
        }) => lower_call_as_stmt(lowerer, receiver.as_deref(), signature.clone(), *kind, args),
        ast::Stmt::Expr(expr) => {
            lower_expr(lowerer, expr)?;
            Ok(())
        }
        ast::Stmt::LocalDecl { name, ty, init } => {
            let var = lowerer.declare_local(name, ty.clone());
            if let Some(init_expr) = init {
                let value = lower_expr(lowerer, init_expr)?;
                lowerer.emit_stmt(Stmt::Assign {
                    lhs: LValue::Var(var),
                    rhs: Rhs::Var(value),
                });
            }
            Ok(())
        }
        ast::Stmt::Block(stmts) => {
            lowerer.push_scope();
            for s in stmts {
                lower_stmt(lowerer, s)?;
            }
            lowerer.pop_scope();
            Ok(())
        }
        ast::Stmt::If {
            cond,
            then_branch,
            else_branch,
        } => lower_if(lowerer, cond, then_branch, else_branch.as_deref()),
        ast::Stmt::While { label, cond, body } => {
            lower_while(lowerer, escape_user_label(lowerer, label.as_deref()), cond, body)
        }
        ast::Stmt::DoWhile { label, cond, body } => {
            lower_do_while(lowerer, escape_user_label(lowerer, label.as_deref()), cond, body)
        }
        ast::Stmt::For {
            label,
            init,
            cond,
            update,
            body,
        } => lower_for(lowerer, escape_user_label(lowerer, label.as_deref()), init, cond.as_ref(), update, body),
        ast::Stmt::Break { label } => {
            let escaped = escape_user_label(lowerer, label.as_deref());
            let target = lowerer.label_stack.break_target(escaped.as_deref());
            lowerer.emit_stmt(Stmt::Goto(target));
            Ok(())
        }
        ast::Stmt::Continue { label } => {
            let escaped = escape_user_label(lowerer, label.as_deref());
            let target = lowerer.label_stack.continue_target(escaped.as_deref());
            lowerer.emit_stmt(Stmt::Goto(target));
            Ok(())
        }
        ast::Stmt::Return(None) => {
            lowerer.emit_stmt(Stmt::Return {
                value: None,
                kind: ReturnKind::Void,
            });
            Ok(())
        }
        ast::Stmt::Return(Some(expr)) => {
            let value = lower_expr(lowerer, expr)?;
            let kind = if lowerer.type_of(&value).map(Type::is_reference).unwrap_or(false) {
                ReturnKind::Object
            } else {
                ReturnKind::Primitive
            };
            lowerer.emit_stmt(Stmt::Return {
                value: Some(value),
                kind,
            });
            Ok(())
        }
        ast::Stmt::Throw(expr) => {
            let value = lower_expr(lowerer, expr)?;
            lowerer.emit_stmt(Stmt::Throw(value));
            Ok(())
        }
        ast::Stmt::Assert { cond, message } => lower_assert(lowerer, cond, message.as_ref()),
        ast::Stmt::Try { body, catches, finally } => lower_try(lowerer, body, catches, finally.as_deref()),
        ast::Stmt::Labeled { label, stmt } => lower_labeled(lowerer, label, stmt),
    }
}

fn lower_labeled(lowerer: &mut Lowerer, label: &str, stmt: &ast::Stmt) -> Result<(), LoweringError> {
    let escaped = escape_user_label(lowerer, Some(label));
    match stmt {
        ast::Stmt::While { cond, body, .. } => lower_while(lowerer, escaped, cond, body),
        ast::Stmt::DoWhile { cond, body, .. } => lower_do_while(lowerer, escaped, cond, body),
        ast::Stmt::For {
            init, cond, update, body, ..
        } => lower_for(lowerer, escaped, init, cond.as_ref(), update, body),
        _ => {
            // A labeled non-loop statement (e.g. a labeled block) is only reachable via fallthrough,
            // so the label stack entry exists solely to give `break label;` somewhere to jump to.
            let l_end = lowerer.fresh_label("Label_end");
            lowerer.label_stack.push_loop(escaped, l_end.clone(), l_end.clone());
            lower_stmt(lowerer, stmt)?;
            lowerer.label_stack.pop_loop();
            lowerer.emit_label(l_end);
            Ok(())
        }
    }
}

/// Translate a user-declared statement label through [`Lowerer::translate_user_label`]'s
/// reserved-word escaping (§4.1) — the one place a user's label text enters this lowering, whether
/// as the key a loop frame is pushed under or as the key a labeled `break`/`continue` resolves
/// against. Both sides go through the same escape, so a label that happens to collide with a word
/// this lowering reserves for its own synthetic labels (`do`, `while`, ...) still matches.
fn escape_user_label(lowerer: &Lowerer, label: Option<&str>) -> Option<String> {
    label.map(|name| lowerer.translate_user_label(name).to_string())
}

fn lower_if(
    lowerer: &mut Lowerer,
    cond: &ast::Expr,
    then_branch: &ast::Stmt,
    else_branch: Option<&ast::Stmt>,
) -> Result<(), LoweringError> {
    let t = lower_expr(lowerer, cond)?;
    let zero_test = Condition {
        op: RelOp::Eq,
        lhs: Operand::Var(t),
        rhs: Operand::Literal(Literal::Int(0)),
    };
    match else_branch {
        Some(else_branch) => {
            let l_else = lowerer.fresh_label("If_else");
            let l_end = lowerer.fresh_label("If_end");
            lowerer.emit_stmt(Stmt::If {
                cond: zero_test,
                target: l_else.clone(),
            });
            lower_stmt(lowerer, then_branch)?;
            lowerer.emit_stmt(Stmt::Goto(l_end.clone()));
            lowerer.emit_label(l_else);
            lower_stmt(lowerer, else_branch)?;
            lowerer.emit_label(l_end);
        }
        None => {
            let l_end = lowerer.fresh_label("If_end");
            lowerer.emit_stmt(Stmt::If {
                cond: zero_test,
                target: l_end.clone(),
            });
            lower_stmt(lowerer, then_branch)?;
            lowerer.emit_label(l_end);
        }
    }
    Ok(())
}

fn lower_while(
    lowerer: &mut Lowerer,
    label: Option<String>,
    cond: &ast::Expr,
    body: &ast::Stmt,
) -> Result<(), LoweringError> {
    let l_start = lowerer.fresh_label("While_start");
    let l_end = lowerer.fresh_label("While_end");
    lowerer.label_stack.push_loop(label, l_start.clone(), l_end.clone());
    lowerer.emit_label(l_start.clone());
    let t = lower_expr(lowerer, cond)?;
    lowerer.emit_stmt(Stmt::If {
        cond: Condition {
            op: RelOp::Eq,
            lhs: Operand::Var(t),
            rhs: Operand::Literal(Literal::Int(0)),
        },
        target: l_end.clone(),
    });
    lower_stmt(lowerer, body)?;
    lowerer.emit_stmt(Stmt::Goto(l_start));
    lowerer.emit_label(l_end);
    lowerer.label_stack.pop_loop();
    Ok(())
}

/// `continue` inside a `do`/`while` body jumps back to the top of the body rather than to a
/// dedicated pre-condition label — matching the literal boundary-scenario lowering, which gives
/// the condition check no label of its own. A `continue` therefore re-runs the body once before
/// the condition is re-tested, which differs from re-entering only the check; this is a scoped
/// simplification (recorded in DESIGN.md) rather than a precise re-derivation of `for`'s three-part
/// continue target.
fn lower_do_while(
    lowerer: &mut Lowerer,
    label: Option<String>,
    cond: &ast::Expr,
    body: &ast::Stmt,
) -> Result<(), LoweringError> {
    let l_start = lowerer.fresh_label("Do_start");
    let l_end = lowerer.fresh_label("Do_end");
    lowerer.label_stack.push_loop(label, l_start.clone(), l_end.clone());
    lowerer.emit_label(l_start.clone());
    lower_stmt(lowerer, body)?;
    let t = lower_expr(lowerer, cond)?;
    lowerer.emit_stmt(Stmt::If {
        cond: Condition {
            op: RelOp::Ne,
            lhs: Operand::Var(t),
            rhs: Operand::Literal(Literal::Int(0)),
        },
        target: l_start,
    });
    lowerer.emit_label(l_end);
    lowerer.label_stack.pop_loop();
    Ok(())
}

fn lower_for(
    lowerer: &mut Lowerer,
    label: Option<String>,
    init: &[ast::Stmt],
    cond: Option<&ast::Expr>,
    update: &[ast::Expr],
    body: &ast::Stmt,
) -> Result<(), LoweringError> {
    lowerer.push_scope();
    for s in init {
        lower_stmt(lowerer, s)?;
    }
    let l_start = lowerer.fresh_label("For_start");
    let l_continue = lowerer.fresh_label("For_continue");
    let l_end = lowerer.fresh_label("For_end");
    lowerer.label_stack.push_loop(label, l_continue.clone(), l_end.clone());
    lowerer.emit_label(l_start.clone());
    if let Some(cond) = cond {
        let t = lower_expr(lowerer, cond)?;
        lowerer.emit_stmt(Stmt::If {
            cond: Condition {
                op: RelOp::Eq,
                lhs: Operand::Var(t),
                rhs: Operand::Literal(Literal::Int(0)),
            },
            target: l_end.clone(),
        });
    }
    lower_stmt(lowerer, body)?;
    lowerer.emit_label(l_continue);
    for update_expr in update {
        lower_expr(lowerer, update_expr)?;
    }
    lowerer.emit_stmt(Stmt::Goto(l_start));
    lowerer.emit_label(l_end);
    lowerer.label_stack.pop_loop();
    lowerer.pop_scope();
    Ok(())
}

/// `assert cond [: message];` lowers to `check != 0 -> skip; construct AssertionError; throw`.
fn lower_assert(lowerer: &mut Lowerer, cond: &ast::Expr, message: Option<&ast::Expr>) -> Result<(), LoweringError> {
    let t = lower_expr(lowerer, cond)?;
    let l_skip = lowerer.fresh_label("Assert_skip");
    lowerer.emit_stmt(Stmt::If {
        cond: Condition {
            op: RelOp::Ne,
            lhs: Operand::Var(t),
            rhs: Operand::Literal(Literal::Int(0)),
        },
        target: l_skip.clone(),
    });
    let exc_ty = Type::reference("java.lang.AssertionError");
    let err = lowerer.fresh_temp(exc_ty.clone());
    lowerer.emit_stmt(Stmt::Assign {
        lhs: LValue::Var(err.clone()),
        rhs: Rhs::New { ty: exc_ty, dims: Vec::new() },
    });
    let (args, signature): (SmallVec<[Var; 4]>, &str) = match message {
        Some(message_expr) => {
            let m = lower_expr(lowerer, message_expr)?;
            (SmallVec::from_slice(&[m]), "java.lang.AssertionError.<init>:(Ljava/lang/Object;)V")
        }
        None => (SmallVec::new(), "java.lang.AssertionError.<init>:()V"),
    };
    lowerer.emit_stmt(Stmt::Call(CallStmt {
        result: None,
        receiver: Some(err.clone()),
        args,
        signature: signature.into(),
        kind: crate::stmt::CallKind::Direct,
    }));
    lowerer.emit_stmt(Stmt::Throw(err));
    lowerer.emit_label(l_skip);
    Ok(())
}

/// `try`/`catch`/`finally`.
///
/// `finally` is lowered by duplicating its statements after the try body and after every handler
/// body, rather than modeling it as a protected region of its own (which would require a second
/// implicit catch-all handler to cover exceptions thrown by the finally block itself while one is
/// already propagating). That more precise encoding is left as an open question — see DESIGN.md —
/// since the dataflow engine this IR feeds treats `finally` contents identically either way.
fn lower_try(
    lowerer: &mut Lowerer,
    body: &ast::Stmt,
    catches: &[ast::CatchClause],
    finally: Option<&ast::Stmt>,
) -> Result<(), LoweringError> {
    let start = lowerer.next_location_id();
    lower_stmt(lowerer, body)?;
    let end = lowerer.next_location_id();
    if let Some(finally) = finally {
        lower_stmt(lowerer, finally)?;
    }
    let l_end = lowerer.fresh_label("Try_end");
    lowerer.emit_stmt(Stmt::Goto(l_end.clone()));

    for clause in catches {
        let handler = lowerer.next_location_id();
        lowerer.push_scope();
        let exc_var = lowerer.declare_local(&clause.binding, clause.exception_type.clone());
        lowerer.emit_stmt(Stmt::Assign {
            lhs: LValue::Var(exc_var),
            rhs: Rhs::CaughtException,
        });
        lower_stmt(lowerer, &clause.body)?;
        if let Some(finally) = finally {
            lower_stmt(lowerer, finally)?;
        }
        lowerer.pop_scope();
        lowerer.add_catch(crate::location::CatchClause {
            start,
            end,
            handler,
            exception_type: clause.exception_type.clone(),
        });
        lowerer.emit_stmt(Stmt::Goto(l_end.clone()));
    }
    lowerer.emit_label(l_end);
    Ok(())
}

fn lower_call_as_stmt(
    lowerer: &mut Lowerer,
    receiver: Option<&ast::Expr>,
    signature: crate::symbol::MethodSignature,
    kind: crate::stmt::CallKind,
    args: &[ast::Expr],
) -> Result<(), LoweringError> {
    let receiver = receiver.map(|e| lower_expr(lowerer, e)).transpose()?;
    let mut arg_vars = SmallVec::new();
    for arg in args {
        arg_vars.push(lower_expr(lowerer, arg)?);
    }
    lowerer.emit_stmt(Stmt::Call(CallStmt {
        result: None,
        receiver,
        args: arg_vars,
        signature,
        kind,
    }));
    Ok(())
}

/// Translate an expression, returning the `Var` holding its lowered value. Every non-trivial
/// subexpression is hoisted into a fresh temporary (§4.1); this function never returns anything
/// other than a plain variable reference.
pub fn lower_expr(lowerer: &mut Lowerer, expr: &ast::Expr) -> Result<Var, LoweringError> {
    match expr {
        ast::Expr::Name(name) => lowerer
            .resolve_var(name)
            .ok_or_else(|| LoweringError::UnresolvedSymbol {
                name: name.clone(),
                span: None,
            }),
        ast::Expr::This => lowerer
            .resolve_var("this")
            .ok_or_else(|| LoweringError::ScopeMisuse {
                description: "`this` referenced outside an instance method".into(),
                span: None,
            }),
        ast::Expr::IntLit(v) => Ok(materialize_literal(lowerer, Type::Int, Literal::Int(*v))),
        ast::Expr::FloatLit(v) => Ok(materialize_literal(lowerer, Type::Double, Literal::Float(*v))),
        ast::Expr::BoolLit(v) => Ok(materialize_literal(lowerer, Type::Boolean, Literal::Bool(*v))),
        ast::Expr::StringLit(v) => Ok(materialize_literal(
            lowerer,
            Type::reference("java.lang.String"),
            Literal::String(v.clone()),
        )),
        ast::Expr::NullLit => Ok(materialize_literal(
            lowerer,
            Type::reference("java.lang.Object"),
            Literal::Null,
        )),
        ast::Expr::New { ty, dims } => lower_new(lowerer, ty, dims),
        ast::Expr::Access { base, field } => {
            let base_var = lower_expr(lowerer, base)?;
            let result = lowerer.fresh_temp(Type::reference("java.lang.Object"));
            lowerer.emit_stmt(Stmt::Assign {
                lhs: LValue::Var(result.clone()),
                rhs: Rhs::Field {
                    base: base_var,
                    field: field.as_str().into(),
                },
            });
            Ok(result)
        }
        ast::Expr::Index { base, index } => {
            let base_var = lower_expr(lowerer, base)?;
            let index_var = lower_expr(lowerer, index)?;
            let result = lowerer.fresh_temp(Type::reference("java.lang.Object"));
            lowerer.emit_stmt(Stmt::Assign {
                lhs: LValue::Var(result.clone()),
                rhs: Rhs::ArrayElem {
                    base: base_var,
                    index: index_var,
                },
            });
            Ok(result)
        }
        ast::Expr::Cast { ty, value } => {
            let v = lower_expr(lowerer, value)?;
            let result = lowerer.fresh_temp(ty.clone());
            lowerer.emit_stmt(Stmt::Assign {
                lhs: LValue::Var(result.clone()),
                rhs: Rhs::Cast { ty: ty.clone(), value: v },
            });
            Ok(result)
        }
        ast::Expr::InstanceOf { value, ty } => {
            let v = lower_expr(lowerer, value)?;
            let result = lowerer.fresh_temp(Type::Boolean);
            lowerer.emit_stmt(Stmt::Assign {
                lhs: LValue::Var(result.clone()),
                rhs: Rhs::InstanceOf { value: v, ty: ty.clone() },
            });
            Ok(result)
        }
        ast::Expr::Unary { op, value } => lower_unary(lowerer, *op, value),
        ast::Expr::Binary { op, lhs, rhs } => lower_binary(lowerer, *op, lhs, rhs),
        ast::Expr::Logical { op, lhs, rhs } => lower_logical(lowerer, *op, lhs, rhs),
        ast::Expr::Ternary {
            cond,
            then_expr,
            else_expr,
        } => lower_ternary(lowerer, cond, then_expr, else_expr),
        ast::Expr::Call {
            receiver,
            signature,
            kind,
            args,
        } => lower_call_as_value(lowerer, receiver.as_deref(), signature.clone(), *kind, args),
        ast::Expr::Assign { target, value } => {
            let v = lower_expr(lowerer, value)?;
            let lvalue = lower_lvalue(lowerer, target)?;
            lowerer.emit_stmt(Stmt::Assign {
                lhs: lvalue,
                rhs: Rhs::Var(v.clone()),
            });
            Ok(v)
        }
        ast::Expr::CompoundAssign { op, target, value } => lower_compound_assign(lowerer, *op, target, value),
        ast::Expr::PreIncDec { op, target } => lower_incdec(lowerer, *op, target, false),
        ast::Expr::PostIncDec { op, target } => lower_incdec(lowerer, *op, target, true),
    }
}

fn materialize_literal(lowerer: &mut Lowerer, ty: Type, literal: Literal) -> Var {
    let t = lowerer.fresh_temp(ty);
    lowerer.emit_stmt(Stmt::Assign {
        lhs: LValue::Var(t.clone()),
        rhs: Rhs::Literal(literal),
    });
    t
}

/// Materialize a boolean result from a `Condition`: the jump target gets `true_lit`, the
/// fallthrough path gets `false_lit` (§8 scenarios 5 and 6 both follow this single shape, with
/// the two literals swapped for negation).
fn materialize_bool(lowerer: &mut Lowerer, cond: Condition, true_lit: i64, false_lit: i64) -> Var {
    let result = lowerer.fresh_temp(Type::Boolean);
    let l_true = lowerer.fresh_label("Bool_true");
    let l_end = lowerer.fresh_label("Bool_end");
    lowerer.emit_stmt(Stmt::If {
        cond,
        target: l_true.clone(),
    });
    lowerer.emit_stmt(Stmt::Assign {
        lhs: LValue::Var(result.clone()),
        rhs: Rhs::Literal(Literal::Int(false_lit)),
    });
    lowerer.emit_stmt(Stmt::Goto(l_end.clone()));
    lowerer.emit_label(l_true);
    lowerer.emit_stmt(Stmt::Assign {
        lhs: LValue::Var(result.clone()),
        rhs: Rhs::Literal(Literal::Int(true_lit)),
    });
    lowerer.emit_label(l_end);
    result
}

fn lower_unary(lowerer: &mut Lowerer, op: ast::UnaryOp, value: &ast::Expr) -> Result<Var, LoweringError> {
    match op {
        ast::UnaryOp::Not => {
            let v = lower_expr(lowerer, value)?;
            let cond = Condition {
                op: RelOp::Ne,
                lhs: Operand::Var(v),
                rhs: Operand::Literal(Literal::Int(0)),
            };
            Ok(materialize_bool(lowerer, cond, 0, 1))
        }
        ast::UnaryOp::Neg | ast::UnaryOp::BitNot => {
            let v = lower_expr(lowerer, value)?;
            let ty = lowerer.type_of(&v).cloned().unwrap_or(Type::Int);
            let result = lowerer.fresh_temp(ty);
            let ir_op = match op {
                ast::UnaryOp::Neg => IrUnaryOp::Neg,
                ast::UnaryOp::BitNot => IrUnaryOp::BitNot,
                ast::UnaryOp::Not => unreachable!(),
            };
            lowerer.emit_stmt(Stmt::Assign {
                lhs: LValue::Var(result.clone()),
                rhs: Rhs::Unary { op: ir_op, value: v },
            });
            Ok(result)
        }
    }
}

fn lower_binary(lowerer: &mut Lowerer, op: ast::BinaryOp, lhs: &ast::Expr, rhs: &ast::Expr) -> Result<Var, LoweringError> {
    if let Some(relop) = rel_op_of(op) {
        let lv = lower_expr(lowerer, lhs)?;
        let rv = lower_expr(lowerer, rhs)?;
        let cond = Condition {
            op: relop,
            lhs: Operand::Var(lv),
            rhs: Operand::Var(rv),
        };
        Ok(materialize_bool(lowerer, cond, 1, 0))
    } else {
        let lv = lower_expr(lowerer, lhs)?;
        let rv = lower_expr(lowerer, rhs)?;
        let ty = lowerer.type_of(&lv).cloned().unwrap_or(Type::Int);
        let result = lowerer.fresh_temp(ty);
        lowerer.emit_stmt(Stmt::Assign {
            lhs: LValue::Var(result.clone()),
            rhs: Rhs::Binary {
                op: arith_op_of(op),
                lhs: lv,
                rhs: rv,
            },
        });
        Ok(result)
    }
}

/// Short-circuit `&&`/`||`, each sharing one result temp across both short-circuit and
/// fall-through paths.
fn lower_logical(lowerer: &mut Lowerer, op: ast::LogicalOp, lhs: &ast::Expr, rhs: &ast::Expr) -> Result<Var, LoweringError> {
    let result = lowerer.fresh_temp(Type::Boolean);
    let l_short = lowerer.fresh_label("Logical_short");
    let l_end = lowerer.fresh_label("Logical_end");

    let short_circuit_op = match op {
        ast::LogicalOp::And => RelOp::Eq, // falsy lhs/rhs short-circuits && to false
        ast::LogicalOp::Or => RelOp::Ne,  // truthy lhs/rhs short-circuits || to true
    };

    let lv = lower_expr(lowerer, lhs)?;
    lowerer.emit_stmt(Stmt::If {
        cond: Condition {
            op: short_circuit_op,
            lhs: Operand::Var(lv),
            rhs: Operand::Literal(Literal::Int(0)),
        },
        target: l_short.clone(),
    });
    let rv = lower_expr(lowerer, rhs)?;
    lowerer.emit_stmt(Stmt::If {
        cond: Condition {
            op: short_circuit_op,
            lhs: Operand::Var(rv),
            rhs: Operand::Literal(Literal::Int(0)),
        },
        target: l_short.clone(),
    });

    let (fallthrough_lit, short_lit) = match op {
        ast::LogicalOp::And => (1, 0),
        ast::LogicalOp::Or => (0, 1),
    };
    lowerer.emit_stmt(Stmt::Assign {
        lhs: LValue::Var(result.clone()),
        rhs: Rhs::Literal(Literal::Int(fallthrough_lit)),
    });
    lowerer.emit_stmt(Stmt::Goto(l_end.clone()));
    lowerer.emit_label(l_short);
    lowerer.emit_stmt(Stmt::Assign {
        lhs: LValue::Var(result.clone()),
        rhs: Rhs::Literal(Literal::Int(short_lit)),
    });
    lowerer.emit_label(l_end);
    Ok(result)
}

fn lower_ternary(
    lowerer: &mut Lowerer,
    cond: &ast::Expr,
    then_expr: &ast::Expr,
    else_expr: &ast::Expr,
) -> Result<Var, LoweringError> {
    let t = lower_expr(lowerer, cond)?;
    let l_then = lowerer.fresh_label("Ternary_then");
    let l_end = lowerer.fresh_label("Ternary_end");
    lowerer.emit_stmt(Stmt::If {
        cond: Condition {
            op: RelOp::Ne,
            lhs: Operand::Var(t),
            rhs: Operand::Literal(Literal::Int(0)),
        },
        target: l_then.clone(),
    });
    let else_v = lower_expr(lowerer, else_expr)?;
    let result_ty = lowerer.type_of(&else_v).cloned().unwrap_or(Type::reference("java.lang.Object"));
    let result = lowerer.fresh_temp(result_ty);
    lowerer.emit_stmt(Stmt::Assign {
        lhs: LValue::Var(result.clone()),
        rhs: Rhs::Var(else_v),
    });
    lowerer.emit_stmt(Stmt::Goto(l_end.clone()));
    lowerer.emit_label(l_then);
    let then_v = lower_expr(lowerer, then_expr)?;
    lowerer.emit_stmt(Stmt::Assign {
        lhs: LValue::Var(result.clone()),
        rhs: Rhs::Var(then_v),
    });
    lowerer.emit_label(l_end);
    Ok(result)
}

fn lower_new(lowerer: &mut Lowerer, ty: &Type, dims: &[ast::Expr]) -> Result<Var, LoweringError> {
    if dims.is_empty() {
        let result = lowerer.fresh_temp(ty.clone());
        lowerer.emit_stmt(Stmt::Assign {
            lhs: LValue::Var(result.clone()),
            rhs: Rhs::New {
                ty: ty.clone(),
                dims: Vec::new(),
            },
        });
        Ok(result)
    } else {
        let mut dim_vars = Vec::with_capacity(dims.len());
        for dim in dims {
            dim_vars.push(lower_expr(lowerer, dim)?);
        }
        let rank = dims.len() as u8;
        let result = lowerer.fresh_array_temp(ty, rank);
        lowerer.emit_stmt(Stmt::Assign {
            lhs: LValue::Var(result.clone()),
            rhs: Rhs::New {
                ty: ty.clone(),
                dims: dim_vars,
            },
        });
        Ok(result)
    }
}

fn lower_call_as_value(
    lowerer: &mut Lowerer,
    receiver: Option<&ast::Expr>,
    signature: crate::symbol::MethodSignature,
    kind: crate::stmt::CallKind,
    args: &[ast::Expr],
) -> Result<Var, LoweringError> {
    let receiver = receiver.map(|e| lower_expr(lowerer, e)).transpose()?;
    let mut arg_vars = SmallVec::new();
    for arg in args {
        arg_vars.push(lower_expr(lowerer, arg)?);
    }
    let result = lowerer.fresh_temp(Type::reference("java.lang.Object"));
    lowerer.emit_stmt(Stmt::Call(CallStmt {
        result: Some(result.clone()),
        receiver,
        args: arg_vars,
        signature,
        kind,
    }));
    Ok(result)
}

fn lower_lvalue(lowerer: &mut Lowerer, expr: &ast::Expr) -> Result<LValue, LoweringError> {
    match expr {
        ast::Expr::Name(name) => {
            let v = lowerer.resolve_var(name).ok_or_else(|| LoweringError::UnresolvedSymbol {
                name: name.clone(),
                span: None,
            })?;
            Ok(LValue::Var(v))
        }
        ast::Expr::Access { base, field } => {
            let base_var = lower_expr(lowerer, base)?;
            Ok(LValue::Field {
                base: base_var,
                field: field.as_str().into(),
            })
        }
        ast::Expr::Index { base, index } => {
            let base_var = lower_expr(lowerer, base)?;
            let index_var = lower_expr(lowerer, index)?;
            Ok(LValue::ArrayElem {
                base: base_var,
                index: index_var,
            })
        }
        _ => Err(LoweringError::ScopeMisuse {
            description: "expression is not assignable".into(),
            span: None,
        }),
    }
}

fn lvalue_to_rhs(lvalue: &LValue) -> Rhs {
    match lvalue {
        LValue::Var(v) => Rhs::Var(v.clone()),
        LValue::Field { base, field } => Rhs::Field {
            base: base.clone(),
            field: field.clone(),
        },
        LValue::StaticField(fqn) => Rhs::StaticField(fqn.clone()),
        LValue::ArrayElem { base, index } => Rhs::ArrayElem {
            base: base.clone(),
            index: index.clone(),
        },
        LValue::MapEntry { base, key } => Rhs::MapEntry {
            base: base.clone(),
            key: key.clone(),
        },
    }
}

/// Read an lvalue's current value as a `Var`, reusing the var directly when possible (no load
/// needed for a plain local) and materializing through a temp otherwise.
fn read_lvalue(lowerer: &mut Lowerer, lvalue: &LValue, ty: Type) -> Var {
    match lvalue {
        LValue::Var(v) => v.clone(),
        other => {
            let result = lowerer.fresh_temp(ty);
            lowerer.emit_stmt(Stmt::Assign {
                lhs: LValue::Var(result.clone()),
                rhs: lvalue_to_rhs(other),
            });
            result
        }
    }
}

fn lower_compound_assign(
    lowerer: &mut Lowerer,
    op: ast::BinaryOp,
    target: &ast::Expr,
    value: &ast::Expr,
) -> Result<Var, LoweringError> {
    let lvalue = lower_lvalue(lowerer, target)?;
    let ty = lvalue_type(lowerer, &lvalue);
    let cur = read_lvalue(lowerer, &lvalue, ty.clone());
    let rhs_var = lower_expr(lowerer, value)?;
    let result = lowerer.fresh_temp(ty);
    lowerer.emit_stmt(Stmt::Assign {
        lhs: LValue::Var(result.clone()),
        rhs: Rhs::Binary {
            op: arith_op_of(op),
            lhs: cur,
            rhs: rhs_var,
        },
    });
    lowerer.emit_stmt(Stmt::Assign {
        lhs: lvalue,
        rhs: Rhs::Var(result.clone()),
    });
    Ok(result)
}

/// `++a`/`a++`/`--a`/`a--`. Post forms always snapshot the old value into its own temp *before*
/// the reassignment is emitted, since by the time a caller's later statement reads that var again
/// it would otherwise observe the already-incremented value (locals here are mutable slots, not
/// SSA values).
fn lower_incdec(lowerer: &mut Lowerer, op: ast::IncDecOp, target: &ast::Expr, post: bool) -> Result<Var, LoweringError> {
    let lvalue = lower_lvalue(lowerer, target)?;
    let ty = lvalue_type(lowerer, &lvalue);
    let old = lowerer.fresh_temp(ty.clone());
    lowerer.emit_stmt(Stmt::Assign {
        lhs: LValue::Var(old.clone()),
        rhs: lvalue_to_rhs(&lvalue),
    });
    let one = materialize_literal(lowerer, ty.clone(), Literal::Int(1));
    let new = lowerer.fresh_temp(ty);
    let arith = match op {
        ast::IncDecOp::Inc => ArithOp::Add,
        ast::IncDecOp::Dec => ArithOp::Sub,
    };
    lowerer.emit_stmt(Stmt::Assign {
        lhs: LValue::Var(new.clone()),
        rhs: Rhs::Binary {
            op: arith,
            lhs: old.clone(),
            rhs: one,
        },
    });
    lowerer.emit_stmt(Stmt::Assign {
        lhs: lvalue,
        rhs: Rhs::Var(new.clone()),
    });
    Ok(if post { old } else { new })
}

fn lvalue_type(lowerer: &Lowerer, lvalue: &LValue) -> Type {
    match lvalue {
        LValue::Var(v) => lowerer.type_of(v).cloned().unwrap_or(Type::Int),
        _ => Type::reference("java.lang.Object"),
    }
}
