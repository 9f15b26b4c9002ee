//! AST-to-IR lowering (§4.1): turns a [`crate::ast::Stmt`] body plus a method signature into a
//! [`crate::method::MethodBody`].

mod builder;
mod labels;
mod translate;

use rustc_hash::FxHashMap;

use crate::{ast, error::LoweringError, method::MethodBody, symbol::{MethodSignature, Name}, ty::Type};
use builder::Lowerer;

/// Everything the lowering needs about one method, supplied by the external frontend.
pub struct LowerInput<'a> {
    pub signature: MethodSignature,
    /// Ordered formal parameters, excluding `this`.
    pub params: &'a [(String, Type)],
    /// `Some(type)` for instance methods, `None` for static methods.
    pub this_type: Option<Type>,
    pub return_type: Type,
    pub body: &'a ast::Stmt,
}

/// Lower one method body. Returns `Err` without emitting any partial IR on failure, per §7's
/// "no partial IR is ever emitted for a failed lowering" policy.
pub fn lower_method(input: LowerInput<'_>) -> Result<MethodBody, LoweringError> {
    let mut lowerer = Lowerer::new();

    if let Some(this_ty) = &input.this_type {
        lowerer.declare_local("this", this_ty.clone());
    }
    let mut params = Vec::with_capacity(input.params.len());
    for (name, ty) in input.params {
        let var = lowerer.declare_local(name, ty.clone());
        params.push((var, ty.clone()));
    }

    translate::lower_stmt(&mut lowerer, input.body)?;

    let (mut locations, locals, catches) = lowerer.finish();

    let needs_synthetic_return = input.return_type == Type::Void
        && !matches!(
            locations.last().and_then(|loc| loc.stmt()),
            Some(crate::stmt::Stmt::Return { .. }) | Some(crate::stmt::Stmt::Throw(_))
        );
    if needs_synthetic_return {
        let id = crate::location::LocationId(locations.len() as u32);
        let display_index = locations.len() as u32;
        locations.push(crate::location::Location {
            id,
            display_index,
            kind: crate::location::LocationKind::Stmt(crate::stmt::Stmt::Return {
                value: None,
                kind: crate::stmt::ReturnKind::Void,
            }),
        });
    }

    let mut merged_locals: FxHashMap<Name, Type> = locals;
    if let Some(this_ty) = &input.this_type {
        merged_locals.entry(Name::new("this")).or_insert_with(|| this_ty.clone());
    }

    Ok(MethodBody {
        signature: input.signature,
        params,
        this_type: input.this_type,
        return_type: input.return_type,
        locals: merged_locals,
        locations,
        catches,
    })
}
