//! Fluent construction of programs.
//!
//! Used by the JSON project loader and by tests. Nodes are built
//! bottom-up: build the arguments, then the call, then the statement, then
//! hand the statements to `body`.

use crate::error::ModelError;
use crate::ids::{DeclId, ModuleId, NodeIndex, SymbolId, TypeId};
use crate::node::{CallExpr, Node};
use crate::program::{MethodSymbol, Program};
use crate::types::{MethodKind, ModifierFlags, Param, TypeKind, TypeRef};
use smallvec::SmallVec;

/// Signature of a method to add.
#[derive(Debug, Clone)]
pub struct MethodSpec {
    name: String,
    params: Vec<Param>,
    return_type: TypeRef,
    modifiers: ModifierFlags,
    key: Option<String>,
    metadata_only: bool,
}

impl MethodSpec {
    /// A `void` method with no parameters.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            return_type: TypeRef::Void,
            modifiers: ModifierFlags::empty(),
            key: None,
            metadata_only: false,
        }
    }

    pub fn returns(mut self, ty: TypeRef) -> Self {
        self.return_type = ty;
        self
    }

    pub fn param(mut self, name: impl Into<String>, ty: TypeRef) -> Self {
        self.params.push(Param::new(name, ty));
        self
    }

    pub fn modifiers(mut self, modifiers: ModifierFlags) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Explicit lookup key, needed to tell overloads apart.
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// The symbol exists (for example in a referenced assembly) but has no
    /// declaration in this program.
    pub fn metadata_only(mut self) -> Self {
        self.metadata_only = true;
        self
    }
}

pub struct ProgramBuilder {
    program: Program,
    module: ModuleId,
}

impl ProgramBuilder {
    /// A builder with a default module named `main`.
    pub fn new() -> Self {
        let mut program = Program::default();
        let module = program.push_module("main".to_string());
        Self { program, module }
    }

    /// An empty builder; call `module` before adding types.
    pub(crate) fn without_default_module() -> Self {
        Self {
            program: Program::default(),
            module: ModuleId::NONE,
        }
    }

    /// Start a new module; subsequent types are added to it.
    pub fn module(&mut self, name: impl Into<String>) -> ModuleId {
        self.module = self.program.push_module(name.into());
        self.module
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub(crate) fn program_mut(&mut self) -> &mut Program {
        &mut self.program
    }

    // -----------------------------------------------------------------------
    // Types
    // -----------------------------------------------------------------------

    pub fn class(&mut self, name: impl Into<String>) -> TypeId {
        self.program
            .push_type(name.into(), self.module, TypeKind::Class)
    }

    pub fn interface(&mut self, name: impl Into<String>) -> TypeId {
        self.program
            .push_type(name.into(), self.module, TypeKind::Interface)
    }

    pub fn extends(&mut self, child: TypeId, base: TypeId) -> &mut Self {
        if let Some(decl) = self.program.type_decl_mut(child) {
            decl.base_class = Some(base);
        }
        self
    }

    pub fn implements(&mut self, ty: TypeId, iface: TypeId) -> &mut Self {
        if let Some(decl) = self.program.type_decl_mut(ty) {
            decl.interfaces.push(iface);
        }
        self
    }

    // -----------------------------------------------------------------------
    // Methods
    // -----------------------------------------------------------------------

    /// Add a method to `owner` with one bodiless declaration (none for
    /// metadata-only symbols). Attach a body with `body`.
    pub fn method(&mut self, owner: TypeId, spec: MethodSpec) -> SymbolId {
        let owner_kind = self.program.type_decl(owner).map(|t| t.kind);
        let kind = match owner_kind {
            Some(TypeKind::Interface) => MethodKind::InterfaceMember,
            _ if spec.modifiers.contains(ModifierFlags::ABSTRACT) => MethodKind::Abstract,
            _ => MethodKind::Concrete,
        };
        let module = self
            .program
            .type_decl(owner)
            .map_or(self.module, |t| t.module);

        let symbol = self.program.push_symbol(MethodSymbol {
            id: SymbolId::NONE,
            owner,
            name: spec.name,
            params: spec.params,
            return_type: spec.return_type,
            modifiers: spec.modifiers,
            kind,
            declarations: SmallVec::new(),
            key: spec.key,
        });
        if !spec.metadata_only {
            self.program
                .push_declaration(symbol, module, NodeIndex::NONE);
        }
        symbol
    }

    /// Give the symbol's first declaration a body block.
    ///
    /// Metadata-only symbols get a declaration created for them.
    pub fn body(&mut self, symbol: SymbolId, statements: Vec<NodeIndex>) -> NodeIndex {
        let block = self.program.nodes.add(Node::Block { statements });
        let first = self
            .program
            .symbol(symbol)
            .and_then(|s| s.declarations.first().copied());
        match first {
            Some(decl) => self.program.attach_body(decl, block),
            None => {
                let module = self.symbol_module(symbol);
                self.program.push_declaration(symbol, module, block);
            }
        }
        block
    }

    /// Add another declaration (a partial part) with its own body.
    pub fn partial(&mut self, symbol: SymbolId, statements: Vec<NodeIndex>) -> DeclId {
        let block = self.program.nodes.add(Node::Block { statements });
        let module = self.symbol_module(symbol);
        self.program.push_declaration(symbol, module, block)
    }

    fn symbol_module(&self, symbol: SymbolId) -> ModuleId {
        self.program
            .symbol(symbol)
            .and_then(|s| self.program.type_decl(s.owner))
            .map_or(self.module, |t| t.module)
    }

    /// A field initializer on `ty`: code that runs outside any function.
    pub fn field(&mut self, ty: TypeId, name: impl Into<String>, init: NodeIndex) -> NodeIndex {
        let root = self.program.nodes.add(Node::Initializer {
            field: name.into(),
            expr: init,
        });
        self.program.push_initializer(ty, root);
        root
    }

    // -----------------------------------------------------------------------
    // Expressions
    // -----------------------------------------------------------------------

    /// An unqualified call to `target`, written with its current name.
    pub fn call(&mut self, target: SymbolId, args: Vec<NodeIndex>) -> NodeIndex {
        self.call_on(NodeIndex::NONE, target, args)
    }

    /// `receiver.Target(args)`.
    pub fn call_on(
        &mut self,
        receiver: NodeIndex,
        target: SymbolId,
        args: Vec<NodeIndex>,
    ) -> NodeIndex {
        let name = self
            .program
            .symbol(target)
            .map(|s| s.name.clone())
            .unwrap_or_default();
        self.program.nodes.add(Node::Call(CallExpr {
            receiver,
            name,
            target: Some(target),
            args,
        }))
    }

    /// A call that does not resolve to a program symbol.
    pub fn call_unresolved(
        &mut self,
        receiver: NodeIndex,
        name: impl Into<String>,
        args: Vec<NodeIndex>,
    ) -> NodeIndex {
        self.program.nodes.add(Node::Call(CallExpr {
            receiver,
            name: name.into(),
            target: None,
            args,
        }))
    }

    pub fn await_expr(&mut self, operand: NodeIndex) -> NodeIndex {
        self.program.nodes.add(Node::Await { operand })
    }

    pub fn method_group(&mut self, target: SymbolId) -> NodeIndex {
        let name = self
            .program
            .symbol(target)
            .map(|s| s.name.clone())
            .unwrap_or_default();
        self.program.nodes.add(Node::MethodGroup {
            receiver: NodeIndex::NONE,
            name,
            target: Some(target),
        })
    }

    pub fn lambda(
        &mut self,
        is_async: bool,
        params: Vec<String>,
        statements: Vec<NodeIndex>,
    ) -> NodeIndex {
        let body = self.program.nodes.add(Node::Block { statements });
        self.program.nodes.add(Node::Lambda {
            is_async,
            params,
            body,
        })
    }

    pub fn name(&mut self, text: impl Into<String>) -> NodeIndex {
        self.program.nodes.add(Node::Name { text: text.into() })
    }

    pub fn literal(&mut self, text: impl Into<String>) -> NodeIndex {
        self.program.nodes.add(Node::Literal { text: text.into() })
    }

    // -----------------------------------------------------------------------
    // Statements
    // -----------------------------------------------------------------------

    pub fn expr(&mut self, expr: NodeIndex) -> NodeIndex {
        self.program.nodes.add(Node::ExprStatement { expr })
    }

    pub fn ret(&mut self, expr: NodeIndex) -> NodeIndex {
        self.program.nodes.add(Node::Return { expr })
    }

    pub fn local(&mut self, name: impl Into<String>, init: NodeIndex) -> NodeIndex {
        self.program.nodes.add(Node::Local {
            name: name.into(),
            init,
        })
    }

    pub fn local_function(
        &mut self,
        name: impl Into<String>,
        is_async: bool,
        return_type: TypeRef,
        statements: Vec<NodeIndex>,
    ) -> NodeIndex {
        let body = self.program.nodes.add(Node::Block { statements });
        self.program.nodes.add(Node::LocalFunction {
            name: name.into(),
            is_async,
            return_type,
            body,
        })
    }

    /// Validate and return the program.
    pub fn finish(self) -> Result<Program, ModelError> {
        self.program.validate()?;
        Ok(self.program)
    }
}

impl Default for ProgramBuilder {
    fn default() -> Self {
        Self::new()
    }
}
