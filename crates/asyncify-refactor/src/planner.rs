//! Conversion order.
//!
//! The plan lists the upward closure from the topmost ancestor down to the
//! nearest base, then the downward closure in discovery order, then the
//! root. Each symbol appears once.

use crate::hierarchy::HierarchyNavigator;
use asyncify_common::limits::MAX_HIERARCHY_DEPTH;
use asyncify_model::{Program, SymbolId};
use indexmap::IndexSet;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionPlan {
    pub root: SymbolId,
    /// Conversion order; `root` is last.
    pub order: Vec<SymbolId>,
    /// How many leading entries of `order` are ancestors of the root.
    pub upward: usize,
}

impl ConversionPlan {
    /// Ancestors, topmost first.
    pub fn ancestors(&self) -> &[SymbolId] {
        &self.order[..self.upward]
    }

    /// Overriding and implementing members of the root.
    pub fn descendants(&self) -> &[SymbolId] {
        let end = self.order.len().saturating_sub(1).max(self.upward);
        &self.order[self.upward..end]
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

pub struct ConversionPlanner<'a> {
    program: &'a Program,
    navigator: HierarchyNavigator<'a>,
}

impl<'a> ConversionPlanner<'a> {
    pub fn new(program: &'a Program) -> Self {
        Self {
            program,
            navigator: HierarchyNavigator::new(program),
        }
    }

    pub fn plan(&self, root: SymbolId) -> ConversionPlan {
        let mut order: IndexSet<SymbolId> = IndexSet::default();
        self.plan_bases(root, &mut order, 0);
        // The root is scheduled last, never among its own ancestors.
        order.shift_remove(&root);
        let upward = order.len();

        for member in self.navigator.implementing_members(root) {
            order.insert(member);
        }
        order.shift_remove(&root);
        order.insert(root);

        let plan = ConversionPlan {
            root,
            order: order.into_iter().collect(),
            upward,
        };
        debug!(
            root = %self.program.qualified_name(root),
            ancestors = plan.upward,
            descendants = plan.descendants().len(),
            "planned conversion"
        );
        plan
    }

    /// Post-order over immediate bases: a base's own ancestors are placed
    /// before the base itself.
    fn plan_bases(&self, symbol: SymbolId, order: &mut IndexSet<SymbolId>, depth: u32) {
        if depth > MAX_HIERARCHY_DEPTH {
            return;
        }
        for base in self.navigator.immediate_bases(symbol) {
            if order.contains(&base) {
                continue;
            }
            self.plan_bases(base, order, depth + 1);
            order.insert(base);
        }
    }
}
