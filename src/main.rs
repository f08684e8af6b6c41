use std::fmt::Display;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use itertools::Itertools;
use tracing::info;
use tracing_subscriber::EnvFilter;

use matgraph::graph::algorithms::{CycleKind, ShortestPathAlgorithm, SpanningTreeAlgorithm};
use matgraph::graph::samples::Sample;
use matgraph::graph::{Graph, MatrixMode};

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        for cause in err.chain().skip(1) {
            eprintln!("  caused by: {cause}");
        }
        std::process::exit(1);
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum SampleArg {
    Cyclic,
    Acyclic,
}

impl From<SampleArg> for Sample {
    fn from(arg: SampleArg) -> Self {
        match arg {
            SampleArg::Cyclic => Sample::Cyclic,
            SampleArg::Acyclic => Sample::Acyclic,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum CyclesArg {
    Directed,
    Undirected,
}

impl From<CyclesArg> for CycleKind {
    fn from(arg: CyclesArg) -> Self {
        match arg {
            CyclesArg::Directed => CycleKind::Directed,
            CyclesArg::Undirected => CycleKind::Undirected,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "matgraph-cli",
    about = "Build one of the seven node sample graphs and print every algorithm report."
)]
struct Cli {
    /// Which sample matrix to load.
    #[arg(long, value_enum, default_value = "cyclic")]
    sample: SampleArg,
    /// Added to the 1-based row number to form each node's UUID.
    #[arg(long, default_value_t = 100)]
    offset: i64,
    /// Construct the graph through its incidence matrix.
    #[arg(long)]
    from_incidence: bool,
    /// Which cycle detector to run.
    #[arg(long, value_enum, default_value = "directed")]
    cycles: CyclesArg,
    /// Row index of the Dijkstra source.
    #[arg(long, value_name = "ROW", default_value_t = 4)]
    dijkstra_source: usize,
    /// Row index of the Bellman–Ford source.
    #[arg(long, value_name = "ROW", default_value_t = 5)]
    ford_source: usize,
    /// Row index of the label-correcting source.
    #[arg(long, value_name = "ROW", default_value_t = 6)]
    label_correcting_source: usize,
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG wins.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn setup_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

fn braced<I>(items: I) -> String
where
    I: IntoIterator,
    I::Item: Display,
{
    format!("{{ {} }}", items.into_iter().format(", "))
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let sample = Sample::from(cli.sample);
    let adjacency = sample.adjacency(cli.offset);
    let graph = if cli.from_incidence {
        Graph::new(adjacency.to_incidence().into_rows(), MatrixMode::Incidence)
            .context("failed to build the graph from its incidence matrix")?
    } else {
        Graph::from_adjacency(adjacency)
    };
    info!(?sample, offset = cli.offset, "loaded sample graph");

    println!("\nAdjacency Matrix:\n{}", graph.adjacency());
    println!("\nIncidence Matrix:\n{}", graph.incidence());

    println!(
        "\nBreadth First Search Traversal Edges List: {}",
        braced(graph.breadth_first_search())
    );
    println!(
        "\nDepth First Search Traversal Edges List: {}",
        braced(graph.depth_first_search())
    );

    let cycles = graph.find_cycles(cli.cycles.into());
    if cycles.is_empty() {
        println!("\nCycle Detection: No Cycle Detected");
    } else {
        println!(
            "\nCycle Detection: Number of Detected Cycles = {}\nCycle Terminal Vertices List: {}",
            cycles.len(),
            braced(&cycles)
        );
    }

    match graph.topological_order() {
        Ok(order) => println!("\nTopological Sort Vertices List: {}", braced(order.order())),
        Err(err) => {
            info!(%err, "topological sort rejected");
            println!("\nCycle detected in the Graph: Topological Sort Not Possible");
        }
    }

    for (algorithm, row, name) in [
        (ShortestPathAlgorithm::Dijkstra, cli.dijkstra_source, "Dijkstra"),
        (ShortestPathAlgorithm::Ford, cli.ford_source, "Ford"),
        (
            ShortestPathAlgorithm::LabelCorrecting,
            cli.label_correcting_source,
            "Generic Label Correcting",
        ),
    ] {
        let source = graph
            .uuid_at(row)
            .with_context(|| format!("no source row {row} for {name}"))?;
        let report = graph
            .shortest_paths(algorithm, source)
            .with_context(|| format!("{name} from vertex {source} failed"))?;
        println!("\nShortest Path from Vertex {source} with {name} Algorithm\n{report}");
    }

    let all_pairs = graph.floyd_warshall();
    println!(
        "\nAll-To-All Shortest Path for nodes {} with WFI Algorithm\n{all_pairs}",
        braced(graph.uuids())
    );

    for (algorithm, name) in [
        (SpanningTreeAlgorithm::Kruskal, "Kruskal"),
        (SpanningTreeAlgorithm::Dijkstra, "Dijkstra"),
    ] {
        let tree = graph
            .spanning_tree(algorithm)
            .with_context(|| format!("{name} minimum spanning tree failed"))?;
        println!(
            "\nMinimum Spanning Tree with {name} Algorithm (total weight {})\n{tree}",
            tree.total_weight
        );
    }

    Ok(())
}
