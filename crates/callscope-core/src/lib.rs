use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

pub mod consistency;
pub mod error;
pub mod language;
pub mod response;

pub use consistency::{Asymmetry, AsymmetrySide, asymmetries};
pub use error::{CallscopeError, Result};
pub use language::Language;
pub use response::{AnalysisResponse, load_call_graph, parse_call_graph};

/// Full per-file, per-function call/caller dataset produced by the analyzer.
///
/// Keys are `/`-separated file paths. The map is ordered so every derived
/// view (tree, overview, resolution of callee files) is deterministic.
pub type CallGraph = BTreeMap<String, FileGraph>;

/// Functions defined by one file, keyed by function name.
pub type FunctionMap = BTreeMap<String, FunctionInfo>;

/// One call site: the other function's name and the line of the call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallRef {
    pub function: String,
    #[serde(default)]
    pub line: Option<u32>,
}

impl CallRef {
    pub fn new(function: impl Into<String>, line: Option<u32>) -> Self {
        Self {
            function: function.into(),
            line,
        }
    }
}

/// Metadata the analyzer reports for a single function.
///
/// `calls` and `called_by` come from independent passes and are not
/// guaranteed to mirror each other. An explicit `null` reads as the default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionInfo {
    #[serde(default)]
    pub line: Option<u32>,
    #[serde(default)]
    pub docstring: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_fixture: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub calls: Vec<CallRef>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub called_by: Vec<CallRef>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// A file the analyzer could not turn into functions.
///
/// The wire form carries a file-level `type` tag (`"text"`, `"unknown"`,
/// `"json"`, `"yaml"`) plus arbitrary preview fields that are kept as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NonAnalyzableFile {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FileGraph {
    NonAnalyzable(NonAnalyzableFile),
    Functions(FunctionMap),
}

impl Default for FileGraph {
    fn default() -> Self {
        FileGraph::Functions(FunctionMap::new())
    }
}

impl FileGraph {
    /// Functions of an analyzable file, `None` for a tagged file.
    pub fn functions(&self) -> Option<&FunctionMap> {
        match self {
            FileGraph::Functions(functions) => Some(functions),
            FileGraph::NonAnalyzable(_) => None,
        }
    }

    pub fn function(&self, name: &str) -> Option<&FunctionInfo> {
        self.functions().and_then(|functions| functions.get(name))
    }

    /// The file-level `type` tag, if any.
    pub fn kind_tag(&self) -> Option<&str> {
        match self {
            FileGraph::NonAnalyzable(file) => Some(file.kind.as_str()),
            FileGraph::Functions(_) => None,
        }
    }
}

/// Analyzability of a single file, combining its language tag and any
/// file-level `type` marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    Analyzable(Language),
    Disabled { badge: String },
}

impl FileStatus {
    pub fn of(path: &str, file: &FileGraph) -> Self {
        if let Some(kind) = file.kind_tag() {
            return FileStatus::Disabled {
                badge: kind.to_string(),
            };
        }
        match Language::from_path(path) {
            Language::Unsupported(ext) => FileStatus::Disabled {
                badge: if ext.is_empty() {
                    "unsupported".to_string()
                } else {
                    ext
                },
            },
            language => FileStatus::Analyzable(language),
        }
    }

    pub fn is_analyzable(&self) -> bool {
        matches!(self, FileStatus::Analyzable(_))
    }
}

/// Identifies a function by the file that defines it and its name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FunctionRef {
    pub file: String,
    pub function: String,
}

impl FunctionRef {
    pub fn new(file: impl Into<String>, function: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            function: function.into(),
        }
    }
}

impl fmt::Display for FunctionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.function)
    }
}

/// Look up a function, reporting which part of the reference is unknown.
pub fn lookup<'a>(graph: &'a CallGraph, file: &str, function: &str) -> Result<&'a FunctionInfo> {
    let file_graph = graph
        .get(file)
        .ok_or_else(|| CallscopeError::UnknownFile(file.to_string()))?;
    file_graph
        .function(function)
        .ok_or_else(|| CallscopeError::UnknownFunction {
            file: file.to_string(),
            function: function.to_string(),
        })
}

/// Find the file that defines `function`, preferring `preferred_file`.
///
/// Falls back to the first file in path order that defines a function with
/// that name.
pub fn resolve_definition<'a>(
    graph: &'a CallGraph,
    preferred_file: &str,
    function: &str,
) -> Option<(&'a str, &'a FunctionInfo)> {
    if let Some((path, file)) = graph.get_key_value(preferred_file)
        && let Some(info) = file.function(function)
    {
        return Some((path.as_str(), info));
    }

    graph
        .iter()
        .find_map(|(path, file)| file.function(function).map(|info| (path.as_str(), info)))
}

/// Name index over every defined function, for resolving many references
/// against the same graph.
///
/// Resolves exactly like [`resolve_definition`] without rescanning the graph
/// per lookup.
#[derive(Debug)]
pub struct DefinitionIndex<'a> {
    graph: &'a CallGraph,
    first_definer: HashMap<&'a str, (&'a str, &'a FunctionInfo)>,
}

impl<'a> DefinitionIndex<'a> {
    pub fn new(graph: &'a CallGraph) -> Self {
        let mut first_definer = HashMap::new();
        for (path, file) in graph {
            let Some(functions) = file.functions() else {
                continue;
            };
            for (name, info) in functions {
                first_definer
                    .entry(name.as_str())
                    .or_insert((path.as_str(), info));
            }
        }
        Self {
            graph,
            first_definer,
        }
    }

    pub fn resolve(
        &self,
        preferred_file: &str,
        function: &str,
    ) -> Option<(&'a str, &'a FunctionInfo)> {
        if let Some((path, file)) = self.graph.get_key_value(preferred_file)
            && let Some(info) = file.function(function)
        {
            return Some((path.as_str(), info));
        }
        self.first_definer.get(function).copied()
    }
}
