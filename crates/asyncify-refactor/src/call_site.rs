//! Call-site rewriting.
//!
//! Two entry points share one rewrite:
//! - `rewrite_call_site` handles a reference found by the reference search
//!   and points it at the renamed method
//! - `rewrite_body_invocations` retargets invocations in a converted body
//!   to an existing async counterpart of their callee
//!
//! Either way the call is awaited exactly when its enclosing function is
//! async at the moment of rewriting. Every call node is rewritten at most
//! once per pass.

use crate::availability::is_async_completion;
use crate::counterpart::CounterpartMatcher;
use crate::options::ConvertOptions;
use crate::references::{CallSite, EnclosingFunction, ReferenceKind, enclosing_function};
use crate::report::{CallOrigin, ConversionReport, RewrittenCall, SkipReason, SkippedReference};
use asyncify_model::{DeclId, Node, NodeIndex, Program, SymbolId};
use rustc_hash::FxHashSet;
use tracing::trace;

/// Where a rewritten call ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewriteOutcome {
    /// The call node; differs from the input node when it was wrapped.
    pub call: NodeIndex,
    pub awaited: bool,
}

/// Point the call at `node` to `target` under the target's current name,
/// and wrap it in `await` when asked. A call that is already the operand
/// of an `await` is not wrapped again.
///
/// Returns `None` when `node` is not a call or `target` is unknown.
pub fn rewrite_invocation(
    program: &mut Program,
    node: NodeIndex,
    target: SymbolId,
    await_call: bool,
) -> Option<RewriteOutcome> {
    let name = program.symbol(target)?.name.clone();
    let call = program.nodes.get_mut(node)?.as_call_mut()?;
    call.name = name;
    call.target = Some(target);

    if !await_call {
        return Some(RewriteOutcome {
            call: node,
            awaited: false,
        });
    }
    let parent = program.nodes.parent(node);
    if matches!(program.nodes.get(parent), Some(Node::Await { .. })) {
        return Some(RewriteOutcome {
            call: node,
            awaited: true,
        });
    }
    let moved = program.nodes.wrap_in_await(node)?;
    Some(RewriteOutcome {
        call: moved,
        awaited: true,
    })
}

/// Every invocation below `root`, source order.
pub fn collect_invocations(program: &Program, root: NodeIndex) -> Vec<NodeIndex> {
    program
        .nodes
        .descendants(root)
        .into_iter()
        .filter(|idx| program.nodes.get(*idx).is_some_and(Node::is_call))
        .collect()
}

pub struct CallSiteRewriter<'o> {
    options: &'o ConvertOptions,
    visited: FxHashSet<NodeIndex>,
}

impl<'o> CallSiteRewriter<'o> {
    pub fn new(options: &'o ConvertOptions) -> Self {
        Self {
            options,
            visited: FxHashSet::default(),
        }
    }

    /// Rewrite one reference to the converted method `site.symbol`.
    pub fn rewrite_call_site(
        &mut self,
        program: &mut Program,
        site: &CallSite,
        report: &mut ConversionReport,
    ) {
        if !self.visited.insert(site.node) {
            return;
        }
        let skip = match (site.kind, site.enclosing) {
            (ReferenceKind::MethodGroup, _) => Some(SkipReason::NotAnInvocation),
            (ReferenceKind::Invocation, None) => Some(SkipReason::NoEnclosingFunction),
            (ReferenceKind::Invocation, Some(_)) => None,
        };
        if let Some(reason) = skip {
            trace!(node = %site.node, ?reason, "skipped reference");
            report.skipped.push(SkippedReference {
                node: site.node,
                symbol: site.symbol,
                reason,
            });
            return;
        }
        if let Some(enclosing) = site.enclosing {
            self.apply(
                program,
                site.node,
                site.symbol,
                enclosing,
                CallOrigin::ReferenceSearch,
                report,
            );
        }
    }

    /// Retarget invocations in the body of `decl` whose callee has an async
    /// counterpart. Callees in `planned` are left to the reference search.
    pub fn rewrite_body_invocations(
        &mut self,
        program: &mut Program,
        decl: DeclId,
        planned: &FxHashSet<SymbolId>,
        report: &mut ConversionReport,
    ) {
        let Some(body) = program.declaration(decl).map(|d| d.body) else {
            return;
        };
        if body.is_none() {
            return;
        }
        // Collected up front: wrapping moves calls to fresh slots.
        for node in collect_invocations(program, body) {
            if self.visited.contains(&node) {
                continue;
            }
            let Some(callee) = program
                .nodes
                .get(node)
                .and_then(Node::as_call)
                .and_then(|call| call.target)
            else {
                continue;
            };
            if planned.contains(&callee) {
                continue;
            }
            let callee_is_async = program
                .symbol(callee)
                .is_some_and(|s| is_async_completion(&s.return_type, self.options));
            if callee_is_async {
                continue;
            }
            let Some(counterpart) = CounterpartMatcher::new(program, self.options).find(callee)
            else {
                continue;
            };
            let Some(enclosing) = enclosing_function(program, node) else {
                continue;
            };
            self.visited.insert(node);
            self.apply(
                program,
                node,
                counterpart,
                enclosing,
                CallOrigin::BodyScan,
                report,
            );
        }
    }

    fn apply(
        &mut self,
        program: &mut Program,
        node: NodeIndex,
        target: SymbolId,
        enclosing: EnclosingFunction,
        origin: CallOrigin,
        report: &mut ConversionReport,
    ) {
        // Read now: an earlier step of this pass may have made it async.
        let awaited = enclosing.is_async(program);
        let Some(outcome) = rewrite_invocation(program, node, target, awaited) else {
            return;
        };
        self.visited.insert(outcome.call);
        trace!(
            node = %outcome.call,
            target = %program.qualified_name(target),
            awaited = outcome.awaited,
            ?origin,
            "rewrote call"
        );
        report.rewritten.push(RewrittenCall {
            node: outcome.call,
            target,
            enclosing,
            awaited: outcome.awaited,
            origin,
        });
    }
}
