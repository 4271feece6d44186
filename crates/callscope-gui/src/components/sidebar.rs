use crate::theme::{badge, empty_state, spacing};
use callscope_core::{FunctionInfo, FunctionRef};
use callscope_events::{AppState, Event, EventBus};
use callscope_graph::{FunctionListing, TreeBuilder, TreeFilter, TreeNode};
use eframe::egui;

/// File tree with search, folder expansion and per-file function lists.
///
/// The tree is rebuilt only when a different call graph is loaded. Everything
/// else (search text, open folders, selection) comes from [`AppState`] and
/// changes only through published events.
pub struct Sidebar {
    search: String,
    tree: TreeNode,
    tree_version: u64,
}

impl Sidebar {
    pub fn new() -> Self {
        Self {
            search: String::new(),
            tree: TreeNode::folder(),
            tree_version: 0,
        }
    }

    /// Rebuild the tree when `version` moves past the one last shown.
    pub fn sync(&mut self, state: &AppState, version: u64) {
        if version != self.tree_version {
            self.tree = TreeBuilder::build(&state.graph);
            self.tree_version = version;
        }
        if self.search != state.search {
            self.search = state.search.clone();
        }
    }

    pub fn tree(&self) -> &TreeNode {
        &self.tree
    }

    pub fn ui(&mut self, ui: &mut egui::Ui, state: &AppState, bus: &EventBus) {
        ui.horizontal(|ui| {
            ui.label("Search");
            let response = ui.add(
                egui::TextEdit::singleline(&mut self.search)
                    .hint_text("file or function")
                    .desired_width(f32::INFINITY),
            );
            if response.changed() {
                bus.publish(Event::SearchChanged {
                    query: self.search.clone(),
                });
            }
        });
        ui.add_space(spacing::ITEM_SPACING);
        ui.separator();

        if self.tree.file_count() == 0 {
            empty_state(ui, "No call graph", "Open a call graph JSON file to get started");
            return;
        }

        let filter = TreeFilter::new(&state.graph, &state.search);
        let children = filter.visible_children(&self.tree);
        if children.is_empty() {
            empty_state(ui, "No matching files", "Try a different search");
            return;
        }

        egui::ScrollArea::vertical()
            .id_salt("sidebar_files_tree")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for (name, child) in children {
                    render_node(ui, &filter, state, bus, "", name, child);
                }
            });
    }
}

impl Default for Sidebar {
    fn default() -> Self {
        Self::new()
    }
}

/// Folder key used for the expanded set: the joined path of its segments.
fn child_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}/{name}")
    }
}

fn render_node(
    ui: &mut egui::Ui,
    filter: &TreeFilter<'_>,
    state: &AppState,
    bus: &EventBus,
    parent: &str,
    name: &str,
    node: &TreeNode,
) {
    match node {
        TreeNode::Folder { .. } => {
            let path = child_path(parent, name);
            let expanded = state.is_expanded(&path);
            // A search forces every visible folder open.
            let open = expanded || filter.is_active();
            let response = egui::CollapsingHeader::new(
                egui::RichText::new(name).color(ui.visuals().hyperlink_color),
            )
            .id_salt(("folder", &path))
            .open(Some(open))
            .show(ui, |ui| {
                for (child_name, child) in filter.visible_children(node) {
                    render_node(ui, filter, state, bus, &path, child_name, child);
                }
            });
            if response.header_response.clicked() {
                bus.publish(Event::FolderToggled {
                    path,
                    expanded: !expanded,
                });
            }
        }
        TreeNode::File { path } => render_file(ui, filter, state, bus, name, path),
    }
}

fn render_file(
    ui: &mut egui::Ui,
    filter: &TreeFilter<'_>,
    state: &AppState,
    bus: &EventBus,
    name: &str,
    path: &str,
) {
    let listing = filter.functions(path);
    let is_selected = state.selected_file.as_deref() == Some(path);

    ui.horizontal(|ui| {
        match &listing {
            FunctionListing::Disabled { badge: text } => {
                ui.add_enabled(false, egui::Label::new(name));
                let fill = ui.visuals().faint_bg_color;
                badge(ui, text, fill);
            }
            _ => {
                let response = ui.selectable_label(is_selected, name);
                if response.clicked() && !is_selected {
                    bus.publish(Event::FileSelected {
                        path: path.to_string(),
                    });
                }
            }
        }
    });

    if !is_selected {
        return;
    }
    ui.indent(("functions", path), |ui| match listing {
        FunctionListing::Disabled { .. } => {
            ui.label(
                egui::RichText::new("Not analyzable")
                    .small()
                    .color(ui.visuals().weak_text_color()),
            );
        }
        FunctionListing::NoMatches => {
            ui.label(
                egui::RichText::new("No functions match")
                    .small()
                    .color(ui.visuals().weak_text_color()),
            );
        }
        FunctionListing::Functions(functions) => {
            for (function, info) in functions {
                render_function(ui, state, bus, path, function, info);
            }
        }
    });
}

fn render_function(
    ui: &mut egui::Ui,
    state: &AppState,
    bus: &EventBus,
    path: &str,
    function: &str,
    info: &FunctionInfo,
) {
    let is_selected = state
        .selected_function
        .as_ref()
        .is_some_and(|f| f.file == path && f.function == function);
    let text = if info.is_fixture {
        egui::RichText::new(format!("{function} (fixture)")).italics()
    } else {
        egui::RichText::new(function)
    };
    let response = ui.selectable_label(is_selected, text);
    if response.clicked() && !is_selected {
        bus.publish(Event::FunctionSelected {
            function: FunctionRef::new(path, function),
        });
    }
    if is_selected {
        response.scroll_to_me(Some(egui::Align::Center));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use callscope_core::CallGraph;

    fn graph() -> CallGraph {
        serde_json::from_str(r#"{"src/a.py": {"foo": {}}, "b.py": {}}"#).unwrap()
    }

    #[test]
    fn test_sync_rebuilds_only_on_new_version() {
        let mut sidebar = Sidebar::new();
        let mut state = AppState::default();
        sidebar.sync(&state, 0);
        assert_eq!(sidebar.tree().file_count(), 0);

        state.graph = graph();
        sidebar.sync(&state, 0);
        assert_eq!(sidebar.tree().file_count(), 0);

        sidebar.sync(&state, 1);
        assert_eq!(sidebar.tree().file_count(), 2);
        assert!(sidebar.tree().find("src/a.py").is_some());
    }

    #[test]
    fn test_sync_follows_search() {
        let mut sidebar = Sidebar::new();
        let state = AppState {
            search: "foo".to_string(),
            ..AppState::default()
        };
        sidebar.sync(&state, 0);
        assert_eq!(sidebar.search, "foo");
    }

    #[test]
    fn test_child_path() {
        assert_eq!(child_path("", "src"), "src");
        assert_eq!(child_path("src", "pkg"), "src/pkg");
    }
}
