use callscope_core::{
    CallGraph, CallRef, FileGraph, FileStatus, FunctionInfo, FunctionMap, NonAnalyzableFile,
};
use callscope_graph::{
    Direction, EdgeAggregator, ForceLayouter, GraphModel, Layouter, TreeBuilder, TreeFilter,
    TreeNode, file_name,
};
use proptest::prelude::*;
use std::collections::BTreeSet;

fn path_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-c]{1,2}", 1..4).prop_map(|segments| {
        let mut path = segments.join("/");
        path.push_str(".py");
        path
    })
}

/// Mixed files: analyzable `.py`, unsupported `.md`/`.go` that still list
/// functions, and files carrying a `type` tag.
fn mixed_graph() -> impl Strategy<Value = CallGraph> {
    let path = (
        prop::collection::vec("[a-cA-C]{1,2}", 1..4),
        prop_oneof!["py", "md", "go"],
    )
        .prop_map(|(segments, ext)| format!("{}.{ext}", segments.join("/")));
    let file = (
        any::<bool>(),
        prop::collection::btree_set("[a-eA-E_]{1,4}", 0..4),
    )
        .prop_map(|(tagged, names)| {
            if tagged {
                FileGraph::NonAnalyzable(NonAnalyzableFile {
                    kind: "text".to_string(),
                    extra: Default::default(),
                })
            } else {
                FileGraph::Functions(
                    names
                        .into_iter()
                        .map(|name| (name, FunctionInfo::default()))
                        .collect(),
                )
            }
        });
    prop::collection::btree_map(path, file, 0..16)
}

fn contains_ignoring_case(text: &str, search: &str) -> bool {
    text.to_lowercase().contains(&search.to_lowercase())
}

fn call_refs() -> impl Strategy<Value = Vec<CallRef>> {
    prop::collection::vec(
        ("[f-j]", prop::option::of(1u32..50)).prop_map(|(f, l)| CallRef::new(f, l)),
        0..12,
    )
}

fn graph_from(paths: &BTreeSet<String>) -> CallGraph {
    paths
        .iter()
        .map(|p| (p.clone(), FileGraph::Functions(FunctionMap::new())))
        .collect()
}

proptest! {
    #[test]
    fn prop_tree_round_trips_every_key(paths in prop::collection::btree_set(path_strategy(), 0..20)) {
        let tree = TreeBuilder::build(&graph_from(&paths));
        let leaves: BTreeSet<String> = tree.file_paths().into_iter().map(str::to_string).collect();
        prop_assert_eq!(&leaves, &paths);
        for path in &paths {
            let expected = TreeNode::File { path: path.clone() };
            prop_assert_eq!(tree.find(path), Some(&expected));
        }
    }

    #[test]
    fn prop_filter_matches_names_and_propagates_to_folders(
        graph in mixed_graph(),
        search in "[a-eA-E_./]{1,3}",
    ) {
        let tree = TreeBuilder::build(&graph);
        let everything = TreeFilter::new(&graph, "");
        let filter = TreeFilter::new(&graph, &search);
        let pruned = everything.prune(&tree);
        prop_assert_eq!(pruned.as_ref(), Some(&tree));

        let mut visible = BTreeSet::new();
        for (path, file) in &graph {
            let by_name = contains_ignoring_case(file_name(path), &search);
            let analyzable = FileStatus::of(path, file).is_analyzable();
            let by_function = analyzable
                && file.functions().is_some_and(|functions| {
                    functions.keys().any(|name| contains_ignoring_case(name, &search))
                });

            let shown = filter.file_visible(path);
            prop_assert_eq!(shown, by_name || by_function, "{}", path);
            if !analyzable {
                prop_assert_eq!(shown, by_name, "disabled file {}", path);
            }
            if shown {
                prop_assert!(everything.file_visible(path));
                visible.insert(path.clone());
            }
        }

        // A folder is visible exactly when some file below it is.
        for path in graph.keys() {
            let segments: Vec<&str> = path.split('/').collect();
            for depth in 1..segments.len() {
                let folder = segments[..depth].join("/");
                let node = tree.find(&folder);
                prop_assert!(node.is_some());
                let prefix = format!("{folder}/");
                let expected = visible.iter().any(|p| p.starts_with(&prefix));
                prop_assert_eq!(node.is_some_and(|n| filter.is_visible(n)), expected, "{}", folder);
                if let Some(node) = node {
                    prop_assert!(!filter.is_visible(node) || everything.is_visible(node));
                }
            }
        }

        let shown: BTreeSet<String> = filter
            .prune(&tree)
            .map(|t| t.file_paths().into_iter().map(str::to_string).collect())
            .unwrap_or_default();
        prop_assert_eq!(shown, visible);
    }

    #[test]
    fn prop_aggregation_conserves_call_sites(calls in call_refs(), called_by in call_refs()) {
        let info = FunctionInfo { calls: calls.clone(), called_by: called_by.clone(), ..Default::default() };

        let outgoing = EdgeAggregator::aggregate("sel", &info, Direction::Outgoing);
        let incoming = EdgeAggregator::aggregate("sel", &info, Direction::Incoming);
        prop_assert_eq!(outgoing.iter().map(|e| e.count).sum::<usize>(), calls.len());
        prop_assert_eq!(incoming.iter().map(|e| e.count).sum::<usize>(), called_by.len());

        for edge in &outgoing {
            prop_assert_eq!(edge.lines.len(), edge.count);
            prop_assert_eq!(edge.source.as_str(), "sel");
        }
        let targets: BTreeSet<&str> = outgoing.iter().map(|e| e.target.as_str()).collect();
        prop_assert_eq!(targets.len(), outgoing.len());

        // Same input, same output.
        prop_assert_eq!(&outgoing, &EdgeAggregator::aggregate("sel", &info, Direction::Outgoing));
    }

    #[test]
    fn prop_layout_positions_are_finite(calls in call_refs(), called_by in call_refs()) {
        let info = FunctionInfo { calls, called_by, ..Default::default() };
        let mut functions = FunctionMap::new();
        functions.insert("sel".to_string(), info);
        let graph: CallGraph = [("m.py".to_string(), FileGraph::Functions(functions))].into();

        let model = GraphModel::for_selection(&graph, "m.py", "sel").unwrap();
        let layouter = ForceLayouter::default();
        let positions = layouter.execute(&model);
        prop_assert_eq!(positions.len(), model.node_count());
        for p in positions {
            prop_assert!(p.is_finite());
            prop_assert!(p.x >= layouter.config.margin && p.x <= layouter.config.width - layouter.config.margin);
        }
    }
}

#[test]
fn end_to_end_single_file_scenario() {
    let graph: CallGraph = serde_json::from_str(
        r#"{
            "a.py": {
                "foo": {
                    "line": 1,
                    "calls": [{"function": "bar", "line": 2}, {"function": "bar", "line": 5}],
                    "called_by": []
                },
                "bar": {"line": 7, "calls": [], "called_by": [{"function": "foo", "line": 2}]}
            }
        }"#,
    )
    .unwrap();

    let tree = TreeBuilder::build(&graph);
    assert_eq!(tree.file_paths(), vec!["a.py"]);

    let model = GraphModel::for_selection(&graph, "a.py", "foo").unwrap();
    let names: BTreeSet<&str> = model.nodes().iter().map(|n| n.function()).collect();
    assert_eq!(names, BTreeSet::from(["foo", "bar"]));
    assert_eq!(model.edge_count(), 1);

    let edge = &model.edges()[0];
    assert_eq!(edge.source, "foo");
    assert_eq!(edge.target, "bar");
    assert_eq!(edge.count, 2);
    assert_eq!(edge.display_lines(), vec![2, 5]);
}
