//! The "convert to async" code action a host offers on a method.
//!
//! The action owns what the engine leaves to its host: the availability
//! guard, resolving the method under the caret, and the edit transaction
//! that can undo a pass that aborted halfway.

use crate::availability::is_available;
use crate::engine::AsyncConverter;
use crate::error::ConversionError;
use crate::options::ConvertOptions;
use crate::report::ConversionReport;
use asyncify_model::{Program, SymbolId};
use tracing::{info, warn};

pub struct ConvertToAsyncAction {
    options: ConvertOptions,
}

impl ConvertToAsyncAction {
    pub const NAME: &'static str = "ConvertToAsync";
    pub const TEXT: &'static str =
        "Convert method to async and replace all inner call to async version if exist.";

    pub fn new(options: ConvertOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Whether the action is offered for `symbol`.
    pub fn is_available(&self, program: &Program, symbol: SymbolId) -> bool {
        is_available(program, symbol, &self.options)
    }

    /// The method a host identifier (`Type.Method` or an overload key)
    /// points at, if the action applies to it.
    pub fn resolve_target(&self, program: &Program, path: &str) -> Option<SymbolId> {
        program
            .resolve_method(path)
            .ok()
            .filter(|symbol| self.is_available(program, *symbol))
    }

    /// Run the conversion inside one edit transaction.
    ///
    /// With `rollback_on_abort` set, a pass that aborts leaves the program
    /// exactly as it was; otherwise the partial conversion is kept and
    /// listed in the error.
    pub fn execute(
        &self,
        program: &mut Program,
        symbol: SymbolId,
    ) -> Result<ConversionReport, ConversionError> {
        if program.symbol(symbol).is_none_or(|s| s.declarations.is_empty()) {
            return Err(ConversionError::UnresolvedRoot(program.qualified_name(symbol)));
        }
        if !self.is_available(program, symbol) {
            return Err(ConversionError::NotAvailable(program.qualified_name(symbol)));
        }

        let mut transaction = EditTransaction::begin(program, self.options.rollback_on_abort);
        let converter = AsyncConverter::new(self.options.clone());
        match converter.convert(transaction.program(), symbol) {
            Ok(report) => {
                info!(
                    converted = report.converted.len(),
                    rewritten = report.rewritten.len(),
                    "{}",
                    Self::NAME
                );
                transaction.commit();
                Ok(report)
            }
            Err(err) => {
                if transaction.rollback() {
                    warn!(%err, "rolled back");
                }
                Err(err)
            }
        }
    }
}

impl Default for ConvertToAsyncAction {
    fn default() -> Self {
        Self::new(ConvertOptions::default())
    }
}

/// Snapshot-based undo unit over a program.
struct EditTransaction<'p> {
    program: &'p mut Program,
    snapshot: Option<Program>,
}

impl<'p> EditTransaction<'p> {
    fn begin(program: &'p mut Program, keep_snapshot: bool) -> Self {
        let snapshot = keep_snapshot.then(|| program.clone());
        Self { program, snapshot }
    }

    fn program(&mut self) -> &mut Program {
        self.program
    }

    fn commit(self) {}

    /// Restore the snapshot; false when there was none.
    fn rollback(self) -> bool {
        match self.snapshot {
            Some(snapshot) => {
                *self.program = snapshot;
                true
            }
            None => false,
        }
    }
}
