//! The §8 boundary-scenario table, expressed as lowering fixtures.

use pretty_assertions::assert_eq;
use sa_ir::{
    ast::{BinaryOp, Expr, Stmt, UnaryOp},
    expr::{Literal, Rhs},
    lowering::{lower_method, LowerInput},
    stmt::{ReturnKind, Stmt as IrStmt},
    ty::Type,
};

fn lower(body: Stmt) -> sa_ir::MethodBody {
    lower_method(LowerInput {
        signature: "Lscratch;.m:()V".into(),
        params: &[],
        this_type: None,
        return_type: Type::Void,
        body: &body,
    })
    .expect("fixture lowers cleanly")
}

fn stmts(body: &sa_ir::MethodBody) -> Vec<&IrStmt> {
    body.locations.iter().filter_map(|loc| loc.stmt()).collect()
}

/// 1: `int i = 1;` -> `int_temp := 1; i := int_temp;`
#[test]
fn scenario_1_local_decl_with_literal_init() {
    let ast = Stmt::Block(vec![Stmt::LocalDecl {
        name: "i".into(),
        ty: Type::Int,
        init: Some(Expr::IntLit(1)),
    }]);
    let body = lower(ast);
    let s = stmts(&body);
    assert_eq!(s.len(), 2);
    assert!(matches!(s[0], IrStmt::Assign { rhs: Rhs::Literal(Literal::Int(1)), .. }));
    match s[1] {
        IrStmt::Assign { lhs, rhs: Rhs::Var(_) } => assert_eq!(lhs.to_string(), "i"),
        other => panic!("unexpected: {other}"),
    }
}

/// 2: `new arr[1][2];` -> two literal temps, then an array-allocation temp with both dims.
#[test]
fn scenario_2_multi_dim_array_new() {
    let ast = Stmt::Block(vec![Stmt::Expr(Expr::New {
        ty: Type::reference("scratch.Widget"),
        dims: vec![Expr::IntLit(1), Expr::IntLit(2)],
    })]);
    let body = lower(ast);
    let s = stmts(&body);
    assert_eq!(s.len(), 3);
    assert!(matches!(s[0], IrStmt::Assign { rhs: Rhs::Literal(Literal::Int(1)), .. }));
    assert!(matches!(s[1], IrStmt::Assign { rhs: Rhs::Literal(Literal::Int(2)), .. }));
    match s[2] {
        IrStmt::Assign {
            lhs,
            rhs: Rhs::New { dims, .. },
        } => {
            assert_eq!(dims.len(), 2);
            assert!(lhs.to_string().contains("Widget_arr2_temp"));
        }
        other => panic!("unexpected: {other}"),
    }
}

/// 3: `do { ; } while(c);` -> `Do_start_0: ; t := c; if t != 0 goto Do_start_0; Do_end_0:`
#[test]
fn scenario_3_do_while_loops_back_on_truthy_condition() {
    let ast = Stmt::Block(vec![
        Stmt::LocalDecl {
            name: "c".into(),
            ty: Type::Boolean,
            init: Some(Expr::BoolLit(true)),
        },
        Stmt::DoWhile {
            label: None,
            cond: Expr::Name("c".into()),
            body: Box::new(Stmt::Block(vec![])),
        },
    ]);
    let body = lower(ast);
    let labels: Vec<_> = body.locations.iter().filter_map(|loc| loc.label()).collect();
    assert_eq!(labels.len(), 2);
    assert_eq!(labels[0].as_str(), "Do_start_0");
    assert_eq!(labels[1].as_str(), "Do_end_0");

    let last_stmt = stmts(&body).pop().unwrap();
    match last_stmt {
        IrStmt::If { cond, target } => {
            assert_eq!(cond.op, sa_ir::expr::RelOp::Ne);
            assert_eq!(target.as_str(), "Do_start_0");
        }
        other => panic!("expected the loop-back branch, got {other}"),
    }
}

/// 4: `a + b` (ints) -> `t1 := a; t2 := b; t3 := t1 + t2;`
#[test]
fn scenario_4_binary_arithmetic_hoists_both_operands() {
    let ast = Stmt::Block(vec![
        Stmt::LocalDecl { name: "a".into(), ty: Type::Int, init: Some(Expr::IntLit(1)) },
        Stmt::LocalDecl { name: "b".into(), ty: Type::Int, init: Some(Expr::IntLit(2)) },
        Stmt::Expr(Expr::Binary {
            op: BinaryOp::Add,
            lhs: Box::new(Expr::Name("a".into())),
            rhs: Box::new(Expr::Name("b".into())),
        }),
    ]);
    let body = lower(ast);
    let s = stmts(&body);
    let last = s.last().unwrap();
    assert!(matches!(last, IrStmt::Assign { rhs: Rhs::Binary { op: sa_ir::expr::ArithOp::Add, .. }, .. }));
}

/// 5: `a == b` -> relational comparison embedded directly in the branch, not pre-materialized.
#[test]
fn scenario_5_relational_comparison_embeds_in_branch() {
    let ast = Stmt::Block(vec![
        Stmt::LocalDecl { name: "a".into(), ty: Type::Int, init: Some(Expr::IntLit(1)) },
        Stmt::LocalDecl { name: "b".into(), ty: Type::Int, init: Some(Expr::IntLit(2)) },
        Stmt::Expr(Expr::Binary {
            op: BinaryOp::Eq,
            lhs: Box::new(Expr::Name("a".into())),
            rhs: Box::new(Expr::Name("b".into())),
        }),
    ]);
    let body = lower(ast);
    let s = stmts(&body);
    let branch = s
        .iter()
        .find(|stmt| matches!(stmt, IrStmt::If { .. }))
        .expect("a branch testing the comparison");
    match branch {
        IrStmt::If { cond, .. } => assert_eq!(cond.op, sa_ir::expr::RelOp::Eq),
        _ => unreachable!(),
    }
    // both arms assign a literal 0/1 into the same result temp.
    let literal_assigns: Vec<_> = s
        .iter()
        .filter(|stmt| matches!(stmt, IrStmt::Assign { rhs: Rhs::Literal(Literal::Int(_)), .. }))
        .collect();
    assert!(literal_assigns.len() >= 2);
}

/// 6: `!b` -> truthiness test on `b`, with the true/false bodies swapped relative to scenario 5.
#[test]
fn scenario_6_logical_not_swaps_true_false_bodies() {
    let ast = Stmt::Block(vec![
        Stmt::LocalDecl { name: "b".into(), ty: Type::Boolean, init: Some(Expr::BoolLit(true)) },
        Stmt::Expr(Expr::Unary {
            op: UnaryOp::Not,
            value: Box::new(Expr::Name("b".into())),
        }),
    ]);
    let body = lower(ast);
    let s = stmts(&body);
    let branch = s.iter().find(|stmt| matches!(stmt, IrStmt::If { .. })).unwrap();
    match branch {
        IrStmt::If { cond, .. } => assert_eq!(cond.op, sa_ir::expr::RelOp::Ne),
        _ => unreachable!(),
    }
}

#[test]
fn void_method_with_no_trailing_return_gets_one_synthesized() {
    let ast = Stmt::Block(vec![Stmt::LocalDecl {
        name: "x".into(),
        ty: Type::Int,
        init: Some(Expr::IntLit(1)),
    }]);
    let body = lower(ast);
    let s = stmts(&body);
    assert!(matches!(s.last(), Some(IrStmt::Return { value: None, kind: ReturnKind::Void })));
}

/// §4.1: "Reserved keywords used as user labels are suffixed with `_label`." A user label that
/// collides with one of the lowering's own synthetic-label prefixes must still resolve a labeled
/// `break` to the right loop, even though the escaped text is never itself the emitted jump
/// target (that's always a fresh synthetic label).
#[test]
fn a_user_label_matching_a_reserved_word_still_resolves_its_labeled_break() {
    let ast = Stmt::Block(vec![
        Stmt::LocalDecl { name: "c".into(), ty: Type::Boolean, init: Some(Expr::BoolLit(true)) },
        Stmt::While {
            label: Some("while".into()),
            cond: Expr::Name("c".into()),
            body: Box::new(Stmt::Block(vec![Stmt::Break { label: Some("while".into()) }])),
        },
    ]);
    let body = lower(ast);
    let labels: Vec<_> = body.locations.iter().filter_map(|loc| loc.label()).collect();
    let while_end = labels.iter().find(|l| l.as_str().starts_with("While_end")).expect("loop end label");

    let goto = stmts(&body)
        .into_iter()
        .find_map(|stmt| match stmt {
            IrStmt::Goto(target) if target == *while_end => Some(target.clone()),
            _ => None,
        })
        .expect("the labeled break resolves to the loop's own end label");
    assert_eq!(&goto, *while_end);
}
