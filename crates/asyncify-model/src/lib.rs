//! Program model for the asyncify refactoring engine.
//!
//! This crate provides the mutable view of a codebase the refactoring core
//! reads and rewrites:
//! - Stable ids (`ModuleId`, `TypeId`, `SymbolId`, `DeclId`, `NodeIndex`)
//! - Type references, modifiers and method kinds
//! - The body `NodeArena` with parent links
//! - `Program`, the arena of modules, types, method symbols and declarations
//! - `ProgramBuilder` for assembling programs in code
//! - JSON project loading and a C#-like source printer

pub mod builder;
pub mod error;
pub mod ids;
pub mod node;
pub mod printer;
pub mod program;
pub mod project;
pub mod types;

pub use builder::{MethodSpec, ProgramBuilder};
pub use error::ModelError;
pub use ids::{DeclId, ModuleId, NodeIndex, SymbolId, TypeId};
pub use node::{CallExpr, Node, NodeArena};
pub use program::{MethodDecl, MethodSymbol, Module, Program, TypeDecl};
pub use types::{MethodKind, ModifierFlags, Param, TypeKind, TypeRef};
