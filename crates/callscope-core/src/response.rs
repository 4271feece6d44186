use crate::{CallGraph, CallscopeError, Result, consistency};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

/// Response envelope of the code-analysis backend.
///
/// `call_graph` stays an untyped value until `detail` and `error` have been
/// checked, so a failed response is never interpreted as a graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisResponse {
    #[serde(default)]
    pub call_graph: Option<Value>,
    #[serde(default)]
    pub detail: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
}

impl AnalysisResponse {
    /// The upstream failure message, if the backend reported one.
    pub fn failure(&self) -> Option<String> {
        self.detail
            .as_ref()
            .and_then(non_empty_message)
            .or_else(|| self.error.as_ref().and_then(non_empty_message))
    }

    pub fn into_result(self) -> Result<CallGraph> {
        if let Some(message) = self.failure() {
            return Err(CallscopeError::Upstream(message));
        }
        match self.call_graph {
            None | Some(Value::Null) => Ok(CallGraph::new()),
            Some(value) => Ok(serde_json::from_value(value)?),
        }
    }
}

fn non_empty_message(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) if text.trim().is_empty() => None,
        Value::String(text) => Some(text.clone()),
        Value::Array(items) if items.is_empty() => None,
        Value::Object(fields) if fields.is_empty() => None,
        other => Some(other.to_string()),
    }
}

/// A top-level `call_graph` key, or any non-empty `detail`/`error`, marks a
/// backend envelope rather than a bare graph.
fn is_envelope(value: &Value) -> bool {
    let Value::Object(fields) = value else {
        return false;
    };
    fields.contains_key("call_graph")
        || ["detail", "error"]
            .iter()
            .any(|key| fields.get(*key).and_then(non_empty_message).is_some())
}

/// Parse either a backend response envelope or a bare call-graph document.
///
/// A `[body, status]` pair, as emitted by the backend's internal-error path,
/// is unwrapped to its body first.
pub fn parse_call_graph(text: &str) -> Result<CallGraph> {
    let value: Value = serde_json::from_str(text)?;
    let body = match value {
        Value::Array(items) => items.into_iter().next().unwrap_or(Value::Null),
        other => other,
    };

    let graph = if is_envelope(&body) {
        serde_json::from_value::<AnalysisResponse>(body)?.into_result()?
    } else {
        serde_json::from_value(body)?
    };

    if tracing::enabled!(tracing::Level::DEBUG) {
        tracing::debug!(
            "Parsed call graph with {} files ({} calls/called_by mismatches)",
            graph.len(),
            consistency::asymmetries(&graph).len()
        );
    }
    Ok(graph)
}

pub fn load_call_graph(path: impl AsRef<Path>) -> Result<CallGraph> {
    let path = path.as_ref();
    tracing::info!("Loading call graph from {:?}", path);
    let text = std::fs::read_to_string(path)?;
    parse_call_graph(&text)
}
