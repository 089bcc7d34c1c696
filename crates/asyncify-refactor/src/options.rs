//! Conversion options.
//!
//! Options are plain data with serde defaults so a host can load them from
//! a JSON file and override individual fields.

use serde::{Deserialize, Serialize};

/// Where the reference search looks for call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchScope {
    /// Every module of the program.
    #[default]
    Solution,
    /// Only the module that declares the method being converted.
    DeclaringModule,
}

/// How body invocations are matched to an existing async counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CounterpartPolicy {
    /// `Name` + suffix, identical parameter types, an async-completion
    /// return wrapping the original return, and exactly one such member on
    /// the nearest type that declares any.
    #[default]
    Strict,
    /// The first member named `Name` + suffix, whatever its signature.
    NameOnly,
    /// Never retarget body invocations.
    Off,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConvertOptions {
    /// Appended to the name of every converted method.
    pub async_suffix: String,
    /// Name of the async-completion type (`Task` / `Task<T>`).
    pub task_type: String,
    pub search_scope: SearchScope,
    pub counterpart: CounterpartPolicy,
    /// Restore the program when a pass aborts. Applies to
    /// `ConvertToAsyncAction` only; the engine never rolls back.
    pub rollback_on_abort: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            async_suffix: "Async".to_string(),
            task_type: "Task".to_string(),
            search_scope: SearchScope::Solution,
            counterpart: CounterpartPolicy::Strict,
            rollback_on_abort: true,
        }
    }
}

impl ConvertOptions {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// The name a method gets after conversion.
    pub fn async_name(&self, name: &str) -> String {
        format!("{name}{}", self.async_suffix)
    }
}
