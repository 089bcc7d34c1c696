//! What a conversion pass did.

use crate::references::EnclosingFunction;
use crate::signature::SignatureChange;
use asyncify_model::{NodeIndex, SymbolId};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CallOrigin {
    /// A reference to a converted method.
    ReferenceSearch,
    /// An invocation inside a converted body, retargeted to an existing
    /// async counterpart.
    BodyScan,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RewrittenCall {
    /// The call node after rewriting (it moves when wrapped in `await`).
    pub node: NodeIndex,
    pub target: SymbolId,
    pub enclosing: EnclosingFunction,
    pub awaited: bool,
    pub origin: CallOrigin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Field initializers and other code outside a named function.
    NoEnclosingFunction,
    /// A method group or other non-call reference.
    NotAnInvocation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedReference {
    pub node: NodeIndex,
    pub symbol: SymbolId,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversionReport {
    /// Planned conversion order.
    pub plan: Vec<SymbolId>,
    /// Signature changes, in conversion order.
    pub converted: Vec<SignatureChange>,
    pub rewritten: Vec<RewrittenCall>,
    pub skipped: Vec<SkippedReference>,
}

impl ConversionReport {
    pub fn converted_symbols(&self) -> Vec<SymbolId> {
        self.converted.iter().map(|c| c.symbol).collect()
    }

    pub fn awaited_calls(&self) -> usize {
        self.rewritten.iter().filter(|c| c.awaited).count()
    }

    pub fn rewritten_from(&self, origin: CallOrigin) -> impl Iterator<Item = &RewrittenCall> {
        self.rewritten.iter().filter(move |c| c.origin == origin)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
