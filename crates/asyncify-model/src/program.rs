//! The program: an arena of modules, types, method symbols, method
//! declarations and body nodes.
//!
//! All cross references are ids, never borrows. Queries return `Option`
//! when an id may not resolve; mutation goes through the `*_mut` accessors
//! and the `NodeArena` primitives.

use crate::error::ModelError;
use crate::ids::{DeclId, ModuleId, NodeIndex, SymbolId, TypeId};
use crate::node::NodeArena;
use crate::types::{MethodKind, ModifierFlags, Param, TypeKind, TypeRef};
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

#[derive(Debug, Clone)]
pub struct Module {
    pub id: ModuleId,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct TypeDecl {
    pub id: TypeId,
    pub name: String,
    pub module: ModuleId,
    pub kind: TypeKind,
    /// The base class, for classes that extend one.
    pub base_class: Option<TypeId>,
    /// Interfaces listed directly on this type (for interfaces: the
    /// interfaces it extends).
    pub interfaces: Vec<TypeId>,
    pub members: Vec<SymbolId>,
    /// Field initializer roots (`Node::Initializer`).
    pub initializers: Vec<NodeIndex>,
}

impl TypeDecl {
    /// Direct supertypes: base class first, then listed interfaces.
    pub fn supertypes(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.base_class.into_iter().chain(self.interfaces.iter().copied())
    }
}

/// A declared method, independent of its syntax.
#[derive(Debug, Clone)]
pub struct MethodSymbol {
    pub id: SymbolId,
    pub owner: TypeId,
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: TypeRef,
    pub modifiers: ModifierFlags,
    pub kind: MethodKind,
    /// Syntactic declarations. Empty for symbols known only from metadata;
    /// more than one for partial methods.
    pub declarations: SmallVec<[DeclId; 1]>,
    /// Explicit lookup key for overloads, see `Program::resolve_method`.
    pub key: Option<String>,
}

impl MethodSymbol {
    pub fn is_async(&self) -> bool {
        self.modifiers.contains(ModifierFlags::ASYNC)
    }

    pub fn is_static(&self) -> bool {
        self.modifiers.contains(ModifierFlags::STATIC)
    }

    /// Same name and same parameter types, in order.
    pub fn signature_matches(&self, other: &MethodSymbol) -> bool {
        self.name == other.name && self.param_types_match(&other.params)
    }

    pub fn param_types_match(&self, params: &[Param]) -> bool {
        self.params.len() == params.len()
            && self
                .params
                .iter()
                .zip(params)
                .all(|(a, b)| a.ty == b.ty)
    }
}

/// One syntactic declaration of a method symbol.
#[derive(Debug, Clone)]
pub struct MethodDecl {
    pub id: DeclId,
    pub symbol: SymbolId,
    pub module: ModuleId,
    /// Body block, `NONE` for bodiless declarations.
    pub body: NodeIndex,
}

#[derive(Debug, Clone, Default)]
pub struct Program {
    pub(crate) modules: Vec<Module>,
    pub(crate) types: Vec<TypeDecl>,
    pub(crate) symbols: Vec<MethodSymbol>,
    pub(crate) declarations: Vec<MethodDecl>,
    pub nodes: NodeArena,
    /// Body root -> owning declaration.
    pub(crate) body_owner: FxHashMap<NodeIndex, DeclId>,
    /// Body or initializer root -> module.
    pub(crate) root_module: FxHashMap<NodeIndex, ModuleId>,
}

impl Program {
    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    pub fn module(&self, id: ModuleId) -> Option<&Module> {
        self.modules.get(id.index())
    }

    pub fn type_decl(&self, id: TypeId) -> Option<&TypeDecl> {
        self.types.get(id.index())
    }

    pub fn symbol(&self, id: SymbolId) -> Option<&MethodSymbol> {
        self.symbols.get(id.index())
    }

    pub fn symbol_mut(&mut self, id: SymbolId) -> Option<&mut MethodSymbol> {
        self.symbols.get_mut(id.index())
    }

    pub fn declaration(&self, id: DeclId) -> Option<&MethodDecl> {
        self.declarations.get(id.index())
    }

    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    pub fn types(&self) -> &[TypeDecl] {
        &self.types
    }

    pub fn symbols(&self) -> &[MethodSymbol] {
        &self.symbols
    }

    pub fn declarations(&self) -> &[MethodDecl] {
        &self.declarations
    }

    pub fn find_type(&self, name: &str) -> Option<TypeId> {
        self.types.iter().find(|t| t.name == name).map(|t| t.id)
    }

    /// `Owner.Name` for diagnostics and lookup.
    pub fn qualified_name(&self, id: SymbolId) -> String {
        let Some(symbol) = self.symbol(id) else {
            return id.to_string();
        };
        match self.type_decl(symbol.owner) {
            Some(owner) => format!("{}.{}", owner.name, symbol.name),
            None => symbol.name.clone(),
        }
    }

    /// Resolve a method from the identifier a host hands us.
    ///
    /// An explicit overload key matches first; otherwise `Owner.Name` must
    /// name exactly one method.
    pub fn resolve_method(&self, path: &str) -> Result<SymbolId, ModelError> {
        if let Some(symbol) = self
            .symbols
            .iter()
            .find(|s| s.key.as_deref() == Some(path))
        {
            return Ok(symbol.id);
        }

        let mut matches = self
            .symbols
            .iter()
            .filter(|s| self.qualified_name(s.id) == path)
            .map(|s| s.id);
        match (matches.next(), matches.next()) {
            (Some(id), None) => Ok(id),
            (Some(_), Some(_)) => Err(ModelError::AmbiguousMethod(path.to_string())),
            (None, _) => Err(ModelError::UnknownMethod(path.to_string())),
        }
    }

    /// Members of `ty` with the given name.
    pub fn members_named<'a>(
        &'a self,
        ty: TypeId,
        name: &'a str,
    ) -> impl Iterator<Item = &'a MethodSymbol> + 'a {
        self.type_decl(ty)
            .into_iter()
            .flat_map(|t| t.members.iter())
            .filter_map(move |id| self.symbol(*id))
            .filter(move |s| s.name == name)
    }

    /// The declaration whose body block is `root`.
    pub fn body_owner(&self, root: NodeIndex) -> Option<DeclId> {
        self.body_owner.get(&root).copied()
    }

    /// The module containing a node, via the root of its tree.
    pub fn module_of_node(&self, idx: NodeIndex) -> Option<ModuleId> {
        let root = self.nodes.root_of(idx);
        self.root_module.get(&root).copied()
    }

    // -----------------------------------------------------------------------
    // Construction primitives (used by the builder and the project loader)
    // -----------------------------------------------------------------------

    pub(crate) fn push_module(&mut self, name: String) -> ModuleId {
        let id = ModuleId::from_len(self.modules.len());
        self.modules.push(Module { id, name });
        id
    }

    pub(crate) fn push_type(&mut self, name: String, module: ModuleId, kind: TypeKind) -> TypeId {
        let id = TypeId::from_len(self.types.len());
        self.types.push(TypeDecl {
            id,
            name,
            module,
            kind,
            base_class: None,
            interfaces: Vec::new(),
            members: Vec::new(),
            initializers: Vec::new(),
        });
        id
    }

    pub(crate) fn type_decl_mut(&mut self, id: TypeId) -> Option<&mut TypeDecl> {
        self.types.get_mut(id.index())
    }

    pub(crate) fn push_symbol(&mut self, mut symbol: MethodSymbol) -> SymbolId {
        let id = SymbolId::from_len(self.symbols.len());
        symbol.id = id;
        if let Some(owner) = self.types.get_mut(symbol.owner.index()) {
            owner.members.push(id);
        }
        self.symbols.push(symbol);
        id
    }

    pub(crate) fn push_declaration(
        &mut self,
        symbol: SymbolId,
        module: ModuleId,
        body: NodeIndex,
    ) -> DeclId {
        let id = DeclId::from_len(self.declarations.len());
        self.declarations.push(MethodDecl {
            id,
            symbol,
            module,
            body,
        });
        if body.is_some() {
            self.body_owner.insert(body, id);
            self.root_module.insert(body, module);
        }
        if let Some(sym) = self.symbols.get_mut(symbol.index()) {
            sym.declarations.push(id);
        }
        id
    }

    pub(crate) fn attach_body(&mut self, decl: DeclId, body: NodeIndex) {
        let Some(entry) = self.declarations.get_mut(decl.index()) else {
            return;
        };
        if entry.body.is_some() {
            self.body_owner.remove(&entry.body);
            self.root_module.remove(&entry.body);
        }
        entry.body = body;
        let module = entry.module;
        self.body_owner.insert(body, decl);
        self.root_module.insert(body, module);
    }

    pub(crate) fn push_initializer(&mut self, ty: TypeId, root: NodeIndex) {
        let Some(decl) = self.types.get_mut(ty.index()) else {
            return;
        };
        decl.initializers.push(root);
        let module = decl.module;
        self.root_module.insert(root, module);
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    /// Check id integrity and reject cyclic or ill-kinded inheritance.
    pub fn validate(&self) -> Result<(), ModelError> {
        for ty in &self.types {
            if self.module(ty.module).is_none() {
                return Err(ModelError::DanglingId {
                    kind: "module",
                    index: ty.module.0,
                });
            }
            if let Some(base) = ty.base_class {
                let parent = self.type_decl(base).ok_or(ModelError::DanglingId {
                    kind: "type",
                    index: base.0,
                })?;
                if ty.kind != TypeKind::Class || parent.kind != TypeKind::Class {
                    return Err(ModelError::InvalidHeritage {
                        child: ty.name.clone(),
                        parent: parent.name.clone(),
                        reason: "only a class can extend a class",
                    });
                }
            }
            for iface in &ty.interfaces {
                let parent = self.type_decl(*iface).ok_or(ModelError::DanglingId {
                    kind: "type",
                    index: iface.0,
                })?;
                if parent.kind != TypeKind::Interface {
                    return Err(ModelError::InvalidHeritage {
                        child: ty.name.clone(),
                        parent: parent.name.clone(),
                        reason: "only interfaces can be implemented",
                    });
                }
            }
        }

        let mut keys = FxHashSet::default();
        for symbol in &self.symbols {
            if self.type_decl(symbol.owner).is_none() {
                return Err(ModelError::DanglingId {
                    kind: "type",
                    index: symbol.owner.0,
                });
            }
            if let Some(key) = &symbol.key
                && !keys.insert(key.as_str())
            {
                return Err(ModelError::DuplicateKey(key.clone()));
            }
        }

        for (_, node) in self.nodes.iter() {
            if let Some(target) = node.referenced_symbol()
                && self.symbol(target).is_none()
            {
                return Err(ModelError::DanglingId {
                    kind: "symbol",
                    index: target.0,
                });
            }
        }

        self.check_inheritance_cycles()
    }

    fn check_inheritance_cycles(&self) -> Result<(), ModelError> {
        #[derive(Clone, Copy, PartialEq, Eq)]
        enum Mark {
            Unvisited,
            InProgress,
            Done,
        }

        let mut marks = vec![Mark::Unvisited; self.types.len()];
        for start in &self.types {
            if marks[start.id.index()] != Mark::Unvisited {
                continue;
            }
            // Iterative DFS: (type, next supertype position).
            let mut stack: Vec<(TypeId, usize)> = vec![(start.id, 0)];
            marks[start.id.index()] = Mark::InProgress;
            while let Some((ty, pos)) = stack.pop() {
                let supers: SmallVec<[TypeId; 4]> = self
                    .type_decl(ty)
                    .map(|t| t.supertypes().collect())
                    .unwrap_or_default();
                if let Some(&next) = supers.get(pos) {
                    stack.push((ty, pos + 1));
                    match marks[next.index()] {
                        Mark::InProgress => {
                            let name = self
                                .type_decl(next)
                                .map_or_else(|| next.to_string(), |t| t.name.clone());
                            return Err(ModelError::CyclicInheritance(name));
                        }
                        Mark::Unvisited => {
                            marks[next.index()] = Mark::InProgress;
                            stack.push((next, 0));
                        }
                        Mark::Done => {}
                    }
                } else {
                    marks[ty.index()] = Mark::Done;
                }
            }
        }
        Ok(())
    }

    /// Every type reachable through supertypes of `ty`, nearest first,
    /// excluding `ty` itself.
    pub fn ancestors(&self, ty: TypeId) -> Vec<TypeId> {
        let mut seen = FxHashSet::default();
        let mut out = Vec::new();
        let mut queue: std::collections::VecDeque<TypeId> =
            self.type_decl(ty).into_iter().flat_map(|t| t.supertypes()).collect();
        while let Some(next) = queue.pop_front() {
            if !seen.insert(next) {
                continue;
            }
            out.push(next);
            if let Some(decl) = self.type_decl(next) {
                queue.extend(decl.supertypes());
            }
        }
        out
    }
}
