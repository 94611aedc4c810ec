//! Extensibility seam for CTX tool invocation (`spec.md` §9: "a small
//! trait/interface with one method `execute(params) -> string`,
//! registered by value").

use std::collections::HashMap;

use async_trait::async_trait;

/// Something a registered [`crate::domain::models::tool::Tool`] can run.
///
/// Implementations must be non-blocking and side-effect-contained; CTX
/// invokes `execute` while holding only the tool-table lock.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    async fn execute(&self, params: &HashMap<String, String>) -> String;
}

/// A trivial executor that echoes its parameters back as a debug string.
/// Useful as a default/placeholder and in tests; not registered by the
/// substrate itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoToolExecutor;

#[async_trait]
impl ToolExecutor for EchoToolExecutor {
    async fn execute(&self, params: &HashMap<String, String>) -> String {
        let mut entries: Vec<_> = params.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
            .into_iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(",")
    }
}
