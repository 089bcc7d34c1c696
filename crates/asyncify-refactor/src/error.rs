use asyncify_model::SymbolId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// The root does not name a method declared in the program. Nothing
    /// was changed.
    #[error("`{0}` does not resolve to a method declaration")]
    UnresolvedRoot(String),

    /// The root is already async; the action is not offered.
    #[error("`{0}` already returns an async-completion type")]
    NotAvailable(String),

    /// A method in the conversion plan has no declaration to rewrite. The
    /// pass stopped here; methods in `converted` stay converted unless the
    /// host rolls back.
    #[error(
        "cannot resolve a declaration for `{name}`; aborted after converting {} method(s)",
        .converted.len()
    )]
    UnresolvedMember {
        symbol: SymbolId,
        name: String,
        converted: Vec<SymbolId>,
    },
}
