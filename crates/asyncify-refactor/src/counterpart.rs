//! Async counterparts of synchronous methods.
//!
//! A counterpart of `T.Load(int)` returning `Customer` is a member of `T` or
//! one of its ancestors named `LoadAsync`. Under the strict policy it must
//! also take `(int)`, return `Task<Customer>`, share the static-ness of
//! `Load`, and be the only such member on the nearest type that declares a
//! member with that name.

use crate::options::{ConvertOptions, CounterpartPolicy};
use crate::signature::async_return_type;
use asyncify_model::{MethodSymbol, Program, SymbolId, TypeId};
use smallvec::SmallVec;
use tracing::{debug, trace};

pub struct CounterpartMatcher<'a> {
    program: &'a Program,
    options: &'a ConvertOptions,
}

impl<'a> CounterpartMatcher<'a> {
    pub fn new(program: &'a Program, options: &'a ConvertOptions) -> Self {
        Self { program, options }
    }

    /// The async counterpart of `symbol`, if one can be told apart.
    pub fn find(&self, symbol: SymbolId) -> Option<SymbolId> {
        let sym = self.program.symbol(symbol)?;
        let wanted = self.options.async_name(&sym.name);
        let found = match self.options.counterpart {
            CounterpartPolicy::Off => None,
            CounterpartPolicy::NameOnly => self.first_named(sym, &wanted),
            CounterpartPolicy::Strict => self.strict(sym, &wanted),
        };
        if let Some(found) = found {
            trace!(
                from = %self.program.qualified_name(symbol),
                to = %self.program.qualified_name(found),
                "async counterpart"
            );
        }
        found
    }

    /// Owner first, then ancestors nearest first.
    fn search_path(&self, sym: &MethodSymbol) -> Vec<TypeId> {
        let mut path = vec![sym.owner];
        path.extend(self.program.ancestors(sym.owner));
        path
    }

    fn first_named(&self, sym: &MethodSymbol, wanted: &str) -> Option<SymbolId> {
        self.search_path(sym).into_iter().find_map(|ty| {
            self.program
                .members_named(ty, wanted)
                .find(|candidate| candidate.id != sym.id)
                .map(|candidate| candidate.id)
        })
    }

    fn strict(&self, sym: &MethodSymbol, wanted: &str) -> Option<SymbolId> {
        let expected_return = async_return_type(&sym.return_type, self.options);
        for ty in self.search_path(sym) {
            let named: SmallVec<[&MethodSymbol; 4]> = self
                .program
                .members_named(ty, wanted)
                .filter(|candidate| candidate.id != sym.id)
                .collect();
            if named.is_empty() {
                continue;
            }
            // The nearest type declaring the name hides the rest.
            let matching: SmallVec<[SymbolId; 2]> = named
                .iter()
                .filter(|candidate| {
                    candidate.is_static() == sym.is_static()
                        && candidate.param_types_match(&sym.params)
                        && candidate.return_type == expected_return
                })
                .map(|candidate| candidate.id)
                .collect();
            return match matching.as_slice() {
                [only] => Some(*only),
                [] => None,
                _ => {
                    debug!(
                        method = %self.program.qualified_name(sym.id),
                        candidates = matching.len(),
                        "ambiguous async counterpart"
                    );
                    None
                }
            };
        }
        None
    }
}
