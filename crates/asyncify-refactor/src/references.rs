//! Reference location: every syntactic reference to a method, with the
//! named function each one sits in.
//!
//! The usage index is a capability handed to the engine (`ReferenceSearch`)
//! rather than ambient state, so tests can substitute their own.

use crate::options::SearchScope;
use asyncify_common::limits::MAX_TREE_WALK_ITERATIONS;
use asyncify_model::{DeclId, ModuleId, Node, NodeIndex, Program, SymbolId};
use serde::Serialize;

/// Finds the nodes that reference a symbol.
pub trait ReferenceSearch {
    fn find_references(&self, program: &Program, symbol: SymbolId) -> Vec<NodeIndex>;
}

/// On-demand search over the program's node arena.
///
/// With `SearchScope::DeclaringModule` the search is limited to one module:
/// the module of the conversion root once `anchored_at` has been called, and
/// otherwise the module of each searched symbol.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArenaSearch {
    scope: SearchScope,
    module: Option<ModuleId>,
}

impl ArenaSearch {
    pub fn new(scope: SearchScope) -> Self {
        Self {
            scope,
            module: None,
        }
    }

    /// Pin the declaring-module scope to the module of `root`.
    pub fn anchored_at(mut self, program: &Program, root: SymbolId) -> Self {
        if self.scope == SearchScope::DeclaringModule {
            self.module = declaring_module(program, root);
        }
        self
    }
}

fn declaring_module(program: &Program, symbol: SymbolId) -> Option<ModuleId> {
    program
        .symbol(symbol)
        .and_then(|s| s.declarations.first())
        .and_then(|d| program.declaration(*d))
        .map(|d| d.module)
}

impl ReferenceSearch for ArenaSearch {
    fn find_references(&self, program: &Program, symbol: SymbolId) -> Vec<NodeIndex> {
        let module = match self.scope {
            SearchScope::Solution => None,
            SearchScope::DeclaringModule => {
                self.module.or_else(|| declaring_module(program, symbol))
            }
        };
        program
            .nodes
            .iter()
            .filter(|(_, node)| node.referenced_symbol() == Some(symbol))
            .map(|(idx, _)| idx)
            .filter(|idx| module.is_none() || program.module_of_node(*idx) == module)
            .collect()
    }
}

/// The named function a call site belongs to, looking through lambdas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnclosingFunction {
    /// A method declaration.
    Method(DeclId),
    /// A local function node.
    Local(NodeIndex),
}

impl EnclosingFunction {
    /// Current async flag. Always read from the program: an earlier step of
    /// the same pass may have just flipped it.
    pub fn is_async(self, program: &Program) -> bool {
        match self {
            EnclosingFunction::Method(decl) => program
                .declaration(decl)
                .and_then(|d| program.symbol(d.symbol))
                .is_some_and(|s| s.is_async()),
            EnclosingFunction::Local(idx) => matches!(
                program.nodes.get(idx),
                Some(Node::LocalFunction { is_async: true, .. })
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    Invocation,
    /// The method is named but not called (`Action a = M;`).
    MethodGroup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    pub node: NodeIndex,
    pub symbol: SymbolId,
    pub kind: ReferenceKind,
    /// `None` for code outside any named function (field initializers).
    pub enclosing: Option<EnclosingFunction>,
}

pub struct ReferenceLocator<'s> {
    search: &'s dyn ReferenceSearch,
}

impl<'s> ReferenceLocator<'s> {
    pub fn new(search: &'s dyn ReferenceSearch) -> Self {
        Self { search }
    }

    /// Every reference to `symbol`, including those without an enclosing
    /// function; the consumer decides what to skip.
    pub fn find_call_sites(&self, program: &Program, symbol: SymbolId) -> Vec<CallSite> {
        self.search
            .find_references(program, symbol)
            .into_iter()
            .filter_map(|node| {
                let kind = match program.nodes.get(node)? {
                    Node::Call(_) => ReferenceKind::Invocation,
                    Node::MethodGroup { .. } => ReferenceKind::MethodGroup,
                    _ => return None,
                };
                Some(CallSite {
                    node,
                    symbol,
                    kind,
                    enclosing: enclosing_function(program, node),
                })
            })
            .collect()
    }
}

/// Innermost named function containing `idx`, skipping lambdas.
pub fn enclosing_function(program: &Program, idx: NodeIndex) -> Option<EnclosingFunction> {
    let mut current = program.nodes.parent(idx);
    let mut iterations = 0;
    while current.is_some() {
        iterations += 1;
        if iterations > MAX_TREE_WALK_ITERATIONS {
            return None;
        }
        match program.nodes.get(current)? {
            Node::LocalFunction { .. } => return Some(EnclosingFunction::Local(current)),
            Node::Initializer { .. } => return None,
            _ => {}
        }
        let parent = program.nodes.parent(current);
        if parent.is_none() {
            return program.body_owner(current).map(EnclosingFunction::Method);
        }
        current = parent;
    }
    None
}
