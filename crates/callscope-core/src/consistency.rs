//! Observability for the calls/called_by asymmetry.
//!
//! The two lists come from independent analysis passes. Nothing here repairs
//! them; the report only tells which side is missing an entry.

use crate::{CallGraph, DefinitionIndex, FunctionRef};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AsymmetrySide {
    /// The caller lists the call but the callee has no matching `called_by`.
    MissingCalledBy,
    /// The callee lists the caller but the caller has no matching `calls`.
    MissingCall,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Asymmetry {
    pub caller: FunctionRef,
    pub callee: FunctionRef,
    pub side: AsymmetrySide,
}

/// Every caller/callee pair whose two sides disagree.
///
/// References that do not resolve to a function in the graph (builtins,
/// unanalyzed files) are skipped.
pub fn asymmetries(graph: &CallGraph) -> Vec<Asymmetry> {
    let index = DefinitionIndex::new(graph);
    let mut found = BTreeSet::new();

    for (path, file) in graph {
        let Some(functions) = file.functions() else {
            continue;
        };
        for (name, info) in functions {
            for call in &info.calls {
                let Some((callee_file, callee)) = index.resolve(path, &call.function) else {
                    continue;
                };
                if !callee.called_by.iter().any(|c| c.function == *name) {
                    found.insert(Asymmetry {
                        caller: FunctionRef::new(path.as_str(), name.as_str()),
                        callee: FunctionRef::new(callee_file, call.function.as_str()),
                        side: AsymmetrySide::MissingCalledBy,
                    });
                }
            }

            for caller_ref in &info.called_by {
                let Some((caller_file, caller)) = index.resolve(path, &caller_ref.function)
                else {
                    continue;
                };
                if !caller.calls.iter().any(|c| c.function == *name) {
                    found.insert(Asymmetry {
                        caller: FunctionRef::new(caller_file, caller_ref.function.as_str()),
                        callee: FunctionRef::new(path.as_str(), name.as_str()),
                        side: AsymmetrySide::MissingCall,
                    });
                }
            }
        }
    }

    found.into_iter().collect()
}
