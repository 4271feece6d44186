use crate::Event;
use callscope_core::{CallGraph, FunctionRef};
use std::collections::BTreeSet;

/// Everything the UI shows that is not derived from the call graph.
///
/// Only [`AppState::apply`] advances it; views read it and publish events.
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub graph: CallGraph,
    pub source: Option<String>,
    pub selected_file: Option<String>,
    pub selected_function: Option<FunctionRef>,
    pub inspected: Option<String>,
    pub search: String,
    pub expanded: BTreeSet<String>,
    pub link_distance: f32,
    pub last_error: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            graph: CallGraph::new(),
            source: None,
            selected_file: None,
            selected_function: None,
            inspected: None,
            search: String::new(),
            expanded: BTreeSet::new(),
            link_distance: 100.0,
            last_error: None,
        }
    }
}

impl AppState {
    pub fn with_link_distance(link_distance: f32) -> Self {
        Self {
            link_distance,
            ..Self::default()
        }
    }

    pub fn apply(mut self, event: &Event) -> AppState {
        match event {
            Event::CallGraphLoaded { source, graph } => {
                tracing::debug!("Loaded call graph from {} ({} files)", source, graph.len());
                self.graph = graph.clone();
                self.source = Some(source.clone());
                self.selected_file = None;
                self.selected_function = None;
                self.inspected = None;
                self.expanded.clear();
                self.last_error = None;
            }
            Event::UpstreamFailed { message } => {
                self.last_error = Some(message.clone());
            }
            Event::FileSelected { path } => {
                self.selected_file = Some(path.clone());
                self.selected_function = None;
                self.inspected = None;
            }
            Event::FunctionSelected { function } => {
                self.selected_file = Some(function.file.clone());
                self.selected_function = Some(function.clone());
                self.inspected = None;
            }
            Event::NodeInspected { function } => {
                self.inspected = function.clone();
            }
            Event::SearchChanged { query } => {
                self.search = query.clone();
            }
            Event::FolderToggled { path, expanded } => {
                if *expanded {
                    self.expanded.insert(path.clone());
                } else {
                    self.expanded.remove(path);
                }
            }
            Event::LinkDistanceChanged { distance } => {
                self.link_distance = *distance;
            }
            Event::NoticeDismissed => {
                self.last_error = None;
            }
        }
        self
    }

    pub fn is_expanded(&self, folder: &str) -> bool {
        self.expanded.contains(folder)
    }
}
