//! Errors raised while building, loading or validating a program.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("cyclic inheritance involving type `{0}`")]
    CyclicInheritance(String),

    #[error("type `{child}` cannot inherit from `{parent}`: {reason}")]
    InvalidHeritage {
        child: String,
        parent: String,
        reason: &'static str,
    },

    #[error("unknown type `{0}`")]
    UnknownType(String),

    #[error("unknown method `{0}`")]
    UnknownMethod(String),

    #[error("method reference `{0}` is ambiguous; give the overloads explicit keys")]
    AmbiguousMethod(String),

    #[error("duplicate method key `{0}`")]
    DuplicateKey(String),

    #[error("invalid type reference `{0}`")]
    InvalidTypeRef(String),

    #[error("unknown modifier `{0}`")]
    UnknownModifier(String),

    #[error("dangling {kind} id {index}")]
    DanglingId { kind: &'static str, index: u32 },

    #[error("malformed project: {0}")]
    Json(#[from] serde_json::Error),
}
