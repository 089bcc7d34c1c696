//! Body nodes and the arena that owns them.
//!
//! Method bodies, local functions, lambdas and field initializers are stored
//! as a flat arena of `Node`s with parent links. Nodes are created bottom-up
//! (children first); `NodeArena::add` stamps the new index as the parent of
//! each child.

use crate::ids::{NodeIndex, SymbolId};
use crate::types::TypeRef;
use asyncify_common::limits::MAX_BODY_DEPTH;
use smallvec::SmallVec;

/// An invocation expression: `receiver.name(args)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallExpr {
    /// The receiver expression, or `NodeIndex::NONE` for an unqualified call.
    pub receiver: NodeIndex,
    /// The invoked name as written.
    pub name: String,
    /// The method the call resolves to, when it resolves to a program symbol.
    pub target: Option<SymbolId>,
    pub args: Vec<NodeIndex>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Block {
        statements: Vec<NodeIndex>,
    },
    ExprStatement {
        expr: NodeIndex,
    },
    /// `return;` when `expr` is `NONE`.
    Return {
        expr: NodeIndex,
    },
    /// `var name = init;`
    Local {
        name: String,
        init: NodeIndex,
    },
    Call(CallExpr),
    Await {
        operand: NodeIndex,
    },
    /// A reference to a method that is not an invocation (`Action a = M;`).
    MethodGroup {
        receiver: NodeIndex,
        name: String,
        target: Option<SymbolId>,
    },
    /// An anonymous closure. Not a named function: enclosing-function
    /// resolution looks through it.
    Lambda {
        is_async: bool,
        params: Vec<String>,
        body: NodeIndex,
    },
    /// A named function nested in a body.
    LocalFunction {
        name: String,
        is_async: bool,
        return_type: TypeRef,
        body: NodeIndex,
    },
    Name {
        text: String,
    },
    Literal {
        text: String,
    },
    /// Root of a field initializer; code here has no enclosing function.
    Initializer {
        field: String,
        expr: NodeIndex,
    },
}

impl Node {
    /// Direct children in source order.
    pub fn children(&self) -> SmallVec<[NodeIndex; 4]> {
        let mut out = SmallVec::new();
        let mut push = |idx: NodeIndex| {
            if idx.is_some() {
                out.push(idx);
            }
        };
        match self {
            Node::Block { statements } => statements.iter().copied().for_each(&mut push),
            Node::ExprStatement { expr }
            | Node::Return { expr }
            | Node::Local { init: expr, .. }
            | Node::Initializer { expr, .. } => push(*expr),
            Node::Call(call) => {
                push(call.receiver);
                call.args.iter().copied().for_each(&mut push);
            }
            Node::Await { operand } => push(*operand),
            Node::MethodGroup { receiver, .. } => push(*receiver),
            Node::Lambda { body, .. } | Node::LocalFunction { body, .. } => push(*body),
            Node::Name { .. } | Node::Literal { .. } => {}
        }
        out
    }

    pub const fn is_call(&self) -> bool {
        matches!(self, Node::Call(_))
    }

    pub fn as_call(&self) -> Option<&CallExpr> {
        match self {
            Node::Call(call) => Some(call),
            _ => None,
        }
    }

    pub fn as_call_mut(&mut self) -> Option<&mut CallExpr> {
        match self {
            Node::Call(call) => Some(call),
            _ => None,
        }
    }

    /// The symbol this node references, for calls and method groups.
    pub fn referenced_symbol(&self) -> Option<SymbolId> {
        match self {
            Node::Call(call) => call.target,
            Node::MethodGroup { target, .. } => *target,
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
struct NodeEntry {
    node: Node,
    parent: NodeIndex,
}

/// Arena of body nodes.
#[derive(Debug, Clone, Default)]
pub struct NodeArena {
    entries: Vec<NodeEntry>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append a node and adopt its children.
    pub fn add(&mut self, node: Node) -> NodeIndex {
        let idx = NodeIndex::from_len(self.entries.len());
        for child in node.children() {
            if let Some(entry) = self.entries.get_mut(child.index()) {
                entry.parent = idx;
            }
        }
        self.entries.push(NodeEntry {
            node,
            parent: NodeIndex::NONE,
        });
        idx
    }

    #[inline]
    pub fn get(&self, idx: NodeIndex) -> Option<&Node> {
        self.entries.get(idx.index()).map(|e| &e.node)
    }

    #[inline]
    pub fn get_mut(&mut self, idx: NodeIndex) -> Option<&mut Node> {
        self.entries.get_mut(idx.index()).map(|e| &mut e.node)
    }

    /// Parent of a node, `NONE` for roots and unknown indices.
    #[inline]
    pub fn parent(&self, idx: NodeIndex) -> NodeIndex {
        self.entries
            .get(idx.index())
            .map_or(NodeIndex::NONE, |e| e.parent)
    }

    /// Iterate every node with its index.
    pub fn iter(&self) -> impl Iterator<Item = (NodeIndex, &Node)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, e)| (NodeIndex::from_len(i), &e.node))
    }

    /// All nodes strictly below `root`, pre-order, source order.
    ///
    /// Descent stops at `MAX_BODY_DEPTH`.
    pub fn descendants(&self, root: NodeIndex) -> Vec<NodeIndex> {
        let mut out = Vec::new();
        let Some(node) = self.get(root) else {
            return out;
        };
        let mut stack: Vec<(NodeIndex, u32)> =
            node.children().into_iter().rev().map(|c| (c, 1)).collect();
        while let Some((idx, depth)) = stack.pop() {
            out.push(idx);
            if depth >= MAX_BODY_DEPTH {
                continue;
            }
            if let Some(node) = self.get(idx) {
                stack.extend(node.children().into_iter().rev().map(|c| (c, depth + 1)));
            }
        }
        out
    }

    /// Wrap the node at `idx` in an `Await` without disturbing its parent.
    ///
    /// The slot at `idx` becomes the `Await`; the original node moves to a
    /// fresh slot whose index is returned. Children of the moved node are
    /// re-parented to its new slot.
    pub fn wrap_in_await(&mut self, idx: NodeIndex) -> Option<NodeIndex> {
        let moved = NodeIndex::from_len(self.entries.len());
        let entry = self.entries.get_mut(idx.index())?;
        let original = std::mem::replace(&mut entry.node, Node::Await { operand: moved });
        let children = original.children();
        self.entries.push(NodeEntry {
            node: original,
            parent: idx,
        });
        for child in children {
            if let Some(entry) = self.entries.get_mut(child.index()) {
                entry.parent = moved;
            }
        }
        Some(moved)
    }

    /// Walk parents from `idx` up to the root of its tree.
    pub fn root_of(&self, idx: NodeIndex) -> NodeIndex {
        let mut current = idx;
        let mut iterations = 0;
        while iterations < asyncify_common::limits::MAX_TREE_WALK_ITERATIONS {
            iterations += 1;
            let parent = self.parent(current);
            if parent.is_none() {
                return current;
            }
            current = parent;
        }
        NodeIndex::NONE
    }
}
