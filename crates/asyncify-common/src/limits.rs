//! Centralized limits and thresholds for the refactoring engine.
//!
//! The program model is supplied from outside (a JSON project or a host
//! IDE), so every walk over it is bounded. Exceeding a limit never panics:
//! the walk gives up and the caller treats the result as "not found".

// =============================================================================
// Tree Walks
// =============================================================================

/// Maximum number of parent hops when walking from a node towards the root
/// of its body (enclosing-function resolution).
///
/// A well-formed arena always terminates at a body root; this only guards
/// against corrupted parent links forming a loop.
pub const MAX_TREE_WALK_ITERATIONS: usize = 10_000;

/// Maximum nesting depth when descending into a body (collecting nested
/// invocations, printing).
pub const MAX_BODY_DEPTH: u32 = 512;

// =============================================================================
// Hierarchy
// =============================================================================

/// Maximum depth of the override DAG explored by the hierarchy navigator
/// and the conversion planner.
///
/// Inheritance cycles are rejected when the program is validated; this is
/// the backstop for programs that were mutated after validation.
pub const MAX_HIERARCHY_DEPTH: u32 = 256;
