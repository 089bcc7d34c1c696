//! Override hierarchy navigation.
//!
//! Answers two questions about a method symbol:
//! - `immediate_bases`: the methods it directly overrides or implements
//!   (upward edges of the override DAG)
//! - `implementing_members`: every method that overrides or implements it,
//!   transitively (downward closure)
//!
//! Edges are derived from the type hierarchy: a class method marked
//! `override` overrides the matching method of the nearest base class that
//! declares one; a class method implements the matching members of every
//! interface in the closure of the interfaces listed on its class, and of
//! the interfaces listed on any derived class that inherits the method
//! without redeclaring it. "Matching" means same name and same parameter
//! types.

use asyncify_common::limits::MAX_HIERARCHY_DEPTH;
use asyncify_model::{
    MethodKind, MethodSymbol, ModifierFlags, Program, SymbolId, TypeDecl, TypeId, TypeKind,
};
use indexmap::IndexSet;
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use tracing::trace;

pub type Bases = SmallVec<[SymbolId; 2]>;

pub struct HierarchyNavigator<'a> {
    program: &'a Program,
}

impl<'a> HierarchyNavigator<'a> {
    pub fn new(program: &'a Program) -> Self {
        Self { program }
    }

    /// Direct parents of `symbol` in the override DAG.
    ///
    /// Empty when the method introduces its member, and when the symbol has
    /// no declaration to navigate from.
    pub fn immediate_bases(&self, symbol: SymbolId) -> Bases {
        match self.program.symbol(symbol) {
            Some(sym) if !sym.declarations.is_empty() => self.override_targets(sym),
            _ => Bases::new(),
        }
    }

    /// Every method that overrides or implements `symbol`, transitively, in
    /// breadth-first discovery order.
    ///
    /// Empty when the symbol has no declaration.
    pub fn implementing_members(&self, symbol: SymbolId) -> Vec<SymbolId> {
        match self.program.symbol(symbol) {
            Some(sym) if !sym.declarations.is_empty() => {}
            _ => return Vec::new(),
        }

        let derived = self.derived_edges();
        let mut found: IndexSet<SymbolId> = IndexSet::default();
        let mut frontier = vec![symbol];
        let mut depth = 0;
        while !frontier.is_empty() && depth < MAX_HIERARCHY_DEPTH {
            depth += 1;
            let mut next = Vec::new();
            for parent in frontier {
                let Some(children) = derived.get(&parent) else {
                    continue;
                };
                for &child in children {
                    if child != symbol && found.insert(child) {
                        next.push(child);
                    }
                }
            }
            frontier = next;
        }
        found.into_iter().collect()
    }

    /// Reverse of `override_targets` over every symbol in the program,
    /// children listed in symbol order.
    fn derived_edges(&self) -> FxHashMap<SymbolId, SmallVec<[SymbolId; 2]>> {
        let mut edges: FxHashMap<SymbolId, SmallVec<[SymbolId; 2]>> = FxHashMap::default();
        for sym in self.program.symbols() {
            for base in self.override_targets(sym) {
                edges.entry(base).or_default().push(sym.id);
            }
        }
        edges
    }

    /// Upward edges of `sym`, whether or not it has a declaration.
    fn override_targets(&self, sym: &MethodSymbol) -> Bases {
        let mut out = Bases::new();
        if sym.is_static() {
            return out;
        }
        let Some(owner) = self.program.type_decl(sym.owner) else {
            return out;
        };

        match sym.kind {
            // An interface member introduces its member; a same-signature
            // member of a derived interface hides it rather than implementing it.
            MethodKind::InterfaceMember => {}
            MethodKind::Concrete | MethodKind::Abstract => {
                if sym.modifiers.contains(ModifierFlags::OVERRIDE)
                    && let Some(base) = self.overridden_class_member(owner.base_class, sym)
                {
                    out.push(base);
                }
                let mut visited = FxHashSet::default();
                for &iface in &owner.interfaces {
                    self.collect_interface_members(iface, sym, &mut out, &mut visited, 0);
                }
                // `class C : B, I` makes an inherited `B.M` the implementation of `I.M`.
                for derived in self.program.types() {
                    if derived.id != owner.id
                        && derived.kind == TypeKind::Class
                        && !derived.interfaces.is_empty()
                        && self.inherits_unchanged(derived, owner.id, sym)
                    {
                        for &iface in &derived.interfaces {
                            self.collect_interface_members(iface, sym, &mut out, &mut visited, 0);
                        }
                    }
                }
            }
        }

        if !out.is_empty() {
            trace!(
                symbol = %self.program.qualified_name(sym.id),
                bases = out.len(),
                "override targets"
            );
        }
        out
    }

    /// Walk the base-class chain for the nearest matching member.
    fn overridden_class_member(
        &self,
        mut current: Option<TypeId>,
        sym: &MethodSymbol,
    ) -> Option<SymbolId> {
        let mut depth = 0;
        while let Some(ty) = current {
            depth += 1;
            if depth > MAX_HIERARCHY_DEPTH {
                return None;
            }
            if let Some(found) = self.matching_member(ty, sym) {
                return Some(found);
            }
            current = self.program.type_decl(ty).and_then(|t| t.base_class);
        }
        None
    }

    /// Whether `derived` inherits `sym` from `owner` with no class in between
    /// (or `derived` itself) declaring a matching member.
    fn inherits_unchanged(&self, derived: &TypeDecl, owner: TypeId, sym: &MethodSymbol) -> bool {
        if self.matching_member(derived.id, sym).is_some() {
            return false;
        }
        let mut current = derived.base_class;
        let mut depth = 0;
        while let Some(ty) = current {
            depth += 1;
            if depth > MAX_HIERARCHY_DEPTH {
                return false;
            }
            if ty == owner {
                return true;
            }
            if self.matching_member(ty, sym).is_some() {
                return false;
            }
            current = self.program.type_decl(ty).and_then(|t| t.base_class);
        }
        false
    }

    /// The matching members of `iface` and of every interface it extends.
    /// A redeclaration in a derived interface hides the base member but the
    /// implementing class method implements both.
    fn collect_interface_members(
        &self,
        iface: TypeId,
        sym: &MethodSymbol,
        out: &mut Bases,
        visited: &mut FxHashSet<TypeId>,
        depth: u32,
    ) {
        if depth > MAX_HIERARCHY_DEPTH || !visited.insert(iface) {
            return;
        }
        if let Some(found) = self.matching_member(iface, sym) {
            if !out.contains(&found) {
                out.push(found);
            }
        }
        let Some(decl) = self.program.type_decl(iface) else {
            return;
        };
        for &parent in &decl.interfaces {
            self.collect_interface_members(parent, sym, out, visited, depth + 1);
        }
    }

    fn matching_member(&self, ty: TypeId, sym: &MethodSymbol) -> Option<SymbolId> {
        self.program
            .members_named(ty, &sym.name)
            .find(|candidate| {
                candidate.id != sym.id && !candidate.is_static() && candidate.signature_matches(sym)
            })
            .map(|candidate| candidate.id)
    }
}
