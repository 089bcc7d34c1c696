//! Declaration rewriting: async modifier, suffixed name, async-completion
//! return type.

use crate::availability::is_async_completion;
use crate::options::ConvertOptions;
use asyncify_model::{MethodKind, ModifierFlags, Program, SymbolId, TypeRef};
use serde::Serialize;
use tracing::debug;

/// What one rewrite changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignatureChange {
    pub symbol: SymbolId,
    pub old_name: String,
    pub new_name: String,
    pub old_return: TypeRef,
    pub new_return: TypeRef,
    /// Whether the `async` modifier was added (concrete methods only).
    pub marked_async: bool,
}

/// `void` -> `Task`, `T` -> `Task<T>`, async-completion types unchanged.
pub fn async_return_type(ty: &TypeRef, options: &ConvertOptions) -> TypeRef {
    if is_async_completion(ty, options) {
        return ty.clone();
    }
    match ty {
        TypeRef::Void => TypeRef::named(options.task_type.clone()),
        other => TypeRef::generic(options.task_type.clone(), vec![other.clone()]),
    }
}

pub struct DeclarationRewriter<'o> {
    options: &'o ConvertOptions,
}

impl<'o> DeclarationRewriter<'o> {
    pub fn new(options: &'o ConvertOptions) -> Self {
        Self { options }
    }

    /// Rewrite the signature of `symbol` in place. Returns `None` for an
    /// unknown symbol.
    pub fn convert(&self, program: &mut Program, symbol: SymbolId) -> Option<SignatureChange> {
        let sym = program.symbol_mut(symbol)?;

        // Only a method with a body can carry `async`; abstract and interface
        // members change name and return type only.
        let marked_async = match sym.kind {
            MethodKind::Concrete => {
                sym.modifiers.insert(ModifierFlags::ASYNC);
                true
            }
            MethodKind::Abstract | MethodKind::InterfaceMember => false,
        };

        let old_name = std::mem::take(&mut sym.name);
        sym.name = self.options.async_name(&old_name);
        let new_return = async_return_type(&sym.return_type, self.options);
        let old_return = std::mem::replace(&mut sym.return_type, new_return.clone());

        let change = SignatureChange {
            symbol,
            old_name,
            new_name: sym.name.clone(),
            old_return,
            new_return,
            marked_async,
        };
        debug!(
            from = %change.old_name,
            to = %change.new_name,
            returns = %change.new_return,
            "rewrote declaration"
        );
        Some(change)
    }
}
