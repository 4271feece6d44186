use anyhow::{Context, Result};
use callscope_core::{CallGraph, asymmetries, load_call_graph, lookup};
use callscope_graph::{
    ForceSimulation, GraphModel, LayoutConfig, TreeBuilder, TreeFilter, clamp_link_distance,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

mod render;

/// Inspect call-graph JSON from the analyzer without the GUI
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Call-graph JSON: a `{call_graph: ...}` response or a bare graph
    #[arg(short, long, global = true, default_value = "call_graph.json")]
    file: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the file tree, optionally filtered by a search term
    Tree {
        #[arg(short, long, default_value = "")]
        search: String,
    },
    /// Overview of every function in one file with raw calls and callers
    Functions {
        path: String,
        #[arg(short, long, default_value = "")]
        search: String,
    },
    /// Aggregated edges around one function
    Edges {
        path: String,
        function: String,
        #[arg(short, long, value_enum, default_value = "both")]
        direction: DirectionArg,
    },
    /// Run the force layout for one function and print positions as JSON
    Layout {
        path: String,
        function: String,
        #[command(flatten)]
        layout: LayoutArgs,
    },
    /// Report calls/called_by pairs that disagree
    Check,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum DirectionArg {
    Out,
    In,
    Both,
}

#[derive(Args, Debug)]
struct LayoutArgs {
    /// JSON file with layout constants; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    link_distance: Option<f32>,
    #[arg(long)]
    charge: Option<f32>,
    #[arg(long)]
    width: Option<f32>,
    #[arg(long)]
    height: Option<f32>,
    #[arg(long, default_value_t = 300)]
    max_ticks: usize,
}

impl LayoutArgs {
    fn resolve(&self) -> Result<LayoutConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading layout config {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("parsing layout config {}", path.display()))?
            }
            None => LayoutConfig::default(),
        };
        if let Some(distance) = self.link_distance {
            config.link_distance = clamp_link_distance(distance);
        }
        if let Some(charge) = self.charge {
            config.charge_strength = charge;
        }
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        Ok(config)
    }
}

fn load(path: &Path) -> Result<CallGraph> {
    load_call_graph(path).with_context(|| format!("loading call graph from {}", path.display()))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    let graph = load(&cli.file)?;

    match cli.command {
        Command::Tree { search } => {
            let tree = TreeBuilder::build(&graph);
            let filter = TreeFilter::new(&graph, &search);
            print!("{}", render::tree(&filter, &tree));
        }
        Command::Functions { path, search } => {
            if !graph.contains_key(&path) {
                anyhow::bail!("{} is not in the call graph", path);
            }
            let filter = TreeFilter::new(&graph, &search);
            print!("{}", render::functions(&filter, &path));
        }
        Command::Edges {
            path,
            function,
            direction,
        } => {
            let info = lookup(&graph, &path, &function)?;
            print!("{}", render::edges(&function, info, direction.into()));
        }
        Command::Layout {
            path,
            function,
            layout,
        } => {
            let config = layout.resolve()?;
            let model = GraphModel::for_selection(&graph, &path, &function)?;
            let mut simulation = ForceSimulation::new(model, config);
            let ticks = simulation.run(layout.max_ticks);
            if simulation.is_running() {
                tracing::warn!(
                    "Stopped after {} ticks before the layout settled (alpha {:.4})",
                    ticks,
                    simulation.alpha()
                );
            }
            let report = render::layout(&simulation, ticks);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Check => {
            let found = asymmetries(&graph);
            print!("{}", render::asymmetries(&found));
            println!("{} asymmetric pair(s)", found.len());
        }
    }

    Ok(())
}

impl From<DirectionArg> for render::Sides {
    fn from(direction: DirectionArg) -> Self {
        match direction {
            DirectionArg::Out => render::Sides::Outgoing,
            DirectionArg::In => render::Sides::Incoming,
            DirectionArg::Both => render::Sides::Both,
        }
    }
}
