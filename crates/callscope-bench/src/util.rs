use callscope_core::{CallGraph, CallRef, FileGraph, FunctionInfo, FunctionMap};
use std::collections::HashMap;
use std::path::PathBuf;
use tempfile::TempDir;

/// A call graph with `file_count` files of `functions_per_file` functions,
/// each calling `calls_per_function` functions in later files.
///
/// Every call is listed twice (two call sites) and mirrored into the
/// callee's `called_by`, so the data is consistent.
pub fn synthetic_call_graph(
    file_count: usize,
    functions_per_file: usize,
    calls_per_function: usize,
) -> CallGraph {
    let mut graph = CallGraph::new();
    for f in 0..file_count {
        let mut functions = FunctionMap::new();
        for i in 0..functions_per_file {
            let calls = (1..=calls_per_function)
                .flat_map(|k| {
                    let callee = function_name((f + k) % file_count, (i + k) % functions_per_file);
                    let line = (i * 10 + k) as u32;
                    [
                        CallRef::new(callee.clone(), Some(line)),
                        CallRef::new(callee, Some(line + 1)),
                    ]
                })
                .collect();
            functions.insert(
                function_name(f, i),
                FunctionInfo {
                    line: Some((i * 10) as u32),
                    calls,
                    ..FunctionInfo::default()
                },
            );
        }
        graph.insert(file_path(f), FileGraph::Functions(functions));
    }
    link_called_by(&mut graph);
    graph
}

/// One `hub` function calling `fan` leaves and called by `fan` callers.
pub fn hub_call_graph(fan: usize) -> CallGraph {
    let mut hub = FunctionMap::new();
    hub.insert(
        "hub".to_string(),
        FunctionInfo {
            line: Some(1),
            calls: (0..fan)
                .map(|i| CallRef::new(format!("leaf_{i}"), Some(i as u32 + 2)))
                .collect(),
            ..FunctionInfo::default()
        },
    );

    let mut graph = CallGraph::new();
    graph.insert("hub.py".to_string(), FileGraph::Functions(hub));
    for i in 0..fan {
        let path = format!("pkg_{}/mod.py", i % 10);
        let FileGraph::Functions(functions) = graph
            .entry(path)
            .or_insert_with(|| FileGraph::Functions(FunctionMap::new()))
        else {
            continue;
        };
        functions.insert(format!("leaf_{i}"), FunctionInfo::default());
        functions.insert(
            format!("caller_{i}"),
            FunctionInfo {
                calls: vec![CallRef::new("hub", Some(3))],
                ..FunctionInfo::default()
            },
        );
    }
    link_called_by(&mut graph);
    graph
}

/// Write `graph` as a `{call_graph: ...}` response into a temp dir.
pub fn write_response(graph: &CallGraph) -> anyhow::Result<(TempDir, PathBuf)> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("call_graph.json");
    let body = serde_json::json!({ "call_graph": graph });
    std::fs::write(&path, serde_json::to_string(&body)?)?;
    Ok((dir, path))
}

pub fn file_path(index: usize) -> String {
    format!("pkg_{}/module_{}.py", index % 10, index)
}

pub fn function_name(file: usize, index: usize) -> String {
    format!("func_{file}_{index}")
}

fn link_called_by(graph: &mut CallGraph) {
    let mut defined_in = HashMap::new();
    let mut edges = Vec::new();
    for (path, file) in graph.iter() {
        let Some(functions) = file.functions() else {
            continue;
        };
        for (name, info) in functions {
            defined_in.insert(name.clone(), path.clone());
            for call in &info.calls {
                edges.push((name.clone(), call.clone()));
            }
        }
    }

    for (caller, call) in edges {
        let Some(path) = defined_in.get(&call.function) else {
            continue;
        };
        if let Some(FileGraph::Functions(functions)) = graph.get_mut(path)
            && let Some(callee) = functions.get_mut(&call.function)
        {
            callee.called_by.push(CallRef::new(caller, call.line));
        }
    }
}
