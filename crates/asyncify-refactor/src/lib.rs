//! Convert-to-async refactoring.
//!
//! Given a method, the engine converts it to async together with every
//! method it overrides or implements (upward) and every method that
//! overrides or implements it (downward), and rewrites every call site of
//! each converted method to the renamed async version, awaiting the call
//! when the calling function is itself async.
//!
//! Pieces, leaves first:
//! - `hierarchy`: immediate bases and implementing members of a method
//! - `references`: call sites of a method and their enclosing functions
//! - `planner`: conversion order (ancestors, descendants, root)
//! - `signature`: rewrite one declaration's modifier, name and return type
//! - `call_site`: rewrite invocations, at reference sites and in bodies
//! - `counterpart`: find an existing async counterpart of a sync method
//! - `availability`: the "is this already async" guard
//! - `engine`: drives one conversion pass
//! - `action`: the host-facing code action with its edit transaction

pub mod action;
pub mod availability;
pub mod call_site;
pub mod counterpart;
pub mod engine;
pub mod error;
pub mod hierarchy;
pub mod options;
pub mod planner;
pub mod references;
pub mod report;
pub mod signature;

pub use action::ConvertToAsyncAction;
pub use engine::AsyncConverter;
pub use error::ConversionError;
pub use options::{ConvertOptions, CounterpartPolicy, SearchScope};
pub use report::ConversionReport;
