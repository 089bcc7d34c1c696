//! The conversion pass.
//!
//! For each method in plan order: rewrite its signature, rewrite every
//! reference to it, then retarget invocations in its own body to existing
//! async counterparts. Signatures go first so that a recursive call, or a
//! reference from inside another already-converted member, sees its
//! enclosing function as async.
//!
//! A planned method with no declaration aborts the pass. Methods converted
//! before the abort stay converted; undoing them is the host's business.

use crate::call_site::CallSiteRewriter;
use crate::error::ConversionError;
use crate::options::ConvertOptions;
use crate::planner::ConversionPlanner;
use crate::references::{ArenaSearch, ReferenceLocator, ReferenceSearch};
use crate::report::ConversionReport;
use crate::signature::DeclarationRewriter;
use asyncify_model::{DeclId, Program, SymbolId};
use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use tracing::{debug, debug_span, warn};

pub struct AsyncConverter<'s> {
    options: ConvertOptions,
    search: Option<&'s dyn ReferenceSearch>,
}

impl<'s> AsyncConverter<'s> {
    /// A converter that searches the program arena with the configured scope.
    pub fn new(options: ConvertOptions) -> Self {
        Self {
            options,
            search: None,
        }
    }

    /// A converter with an injected reference search.
    pub fn with_search(options: ConvertOptions, search: &'s dyn ReferenceSearch) -> Self {
        Self {
            options,
            search: Some(search),
        }
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Resolve `path` (see `Program::resolve_method`) and convert it.
    pub fn convert_path(
        &self,
        program: &mut Program,
        path: &str,
    ) -> Result<ConversionReport, ConversionError> {
        let root = program
            .resolve_method(path)
            .map_err(|_| ConversionError::UnresolvedRoot(path.to_string()))?;
        self.convert(program, root)
    }

    /// Convert `root` and its override closure, rewriting call sites.
    pub fn convert(
        &self,
        program: &mut Program,
        root: SymbolId,
    ) -> Result<ConversionReport, ConversionError> {
        let has_declaration = program
            .symbol(root)
            .is_some_and(|s| !s.declarations.is_empty());
        if !has_declaration {
            return Err(ConversionError::UnresolvedRoot(program.qualified_name(root)));
        }

        let arena_search = ArenaSearch::new(self.options.search_scope).anchored_at(program, root);
        let search: &dyn ReferenceSearch = match self.search {
            Some(search) => search,
            None => &arena_search,
        };
        let locator = ReferenceLocator::new(search);
        let declarations = DeclarationRewriter::new(&self.options);
        let mut calls = CallSiteRewriter::new(&self.options);

        let plan = ConversionPlanner::new(program).plan(root);
        let planned: FxHashSet<SymbolId> = plan.order.iter().copied().collect();
        let mut report = ConversionReport {
            plan: plan.order.clone(),
            ..ConversionReport::default()
        };

        for &symbol in &plan.order {
            let _span = debug_span!("convert", symbol = %program.qualified_name(symbol)).entered();

            let decls: SmallVec<[DeclId; 1]> = program
                .symbol(symbol)
                .map(|s| s.declarations.clone())
                .unwrap_or_default();
            if decls.is_empty() {
                let name = program.qualified_name(symbol);
                let converted = report.converted_symbols();
                warn!(
                    method = %name,
                    converted = converted.len(),
                    "no declaration to rewrite; aborting"
                );
                return Err(ConversionError::UnresolvedMember {
                    symbol,
                    name,
                    converted,
                });
            }

            if let Some(change) = declarations.convert(program, symbol) {
                report.converted.push(change);
            }

            let sites = locator.find_call_sites(program, symbol);
            debug!(references = sites.len(), "rewriting references");
            for site in &sites {
                calls.rewrite_call_site(program, site, &mut report);
            }

            for decl in decls {
                calls.rewrite_body_invocations(program, decl, &planned, &mut report);
            }
        }

        debug!(
            converted = report.converted.len(),
            rewritten = report.rewritten.len(),
            skipped = report.skipped.len(),
            "conversion finished"
        );
        Ok(report)
    }
}
