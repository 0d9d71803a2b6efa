//! owl-nets CLI: abstract ontology queries into entity networks.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use owl_nets::bindings::QueryResults;
use owl_nets::config::NetsConfig;
use owl_nets::engine::{Abstraction, Engine};
use owl_nets::export::InterchangeDocument;
use owl_nets::graph::parse_triples;

#[derive(Parser)]
#[command(name = "owl-nets", version, about = "OWL to entity-network abstraction")]
struct Cli {
    /// TOML configuration file (vocabulary and edge-label rules).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Abstract a query and show edges, ambiguities and placeholder patterns.
    Inspect {
        /// File with one triple pattern per line.
        #[arg(long)]
        triples: PathBuf,
    },

    /// Build the NETS graph from query results and write the interchange file.
    Nets {
        /// File with one triple pattern per line.
        #[arg(long)]
        triples: PathBuf,

        /// SPARQL JSON results of the augmented query.
        #[arg(long)]
        results: PathBuf,

        /// Output interchange JSON file.
        #[arg(long)]
        output: PathBuf,

        /// Also write a Graphviz DOT rendering of the network.
        #[arg(long)]
        dot: Option<PathBuf>,
    },

    /// Build the instance-level OWL graph from query results.
    Owl {
        /// File with one triple pattern per line.
        #[arg(long)]
        triples: PathBuf,

        /// SPARQL JSON results of the query.
        #[arg(long)]
        results: PathBuf,

        /// Output JSON file.
        #[arg(long)]
        output: PathBuf,

        /// Also write a Graphviz DOT rendering of the graph.
        #[arg(long)]
        dot: Option<PathBuf>,
    },

    /// Load an interchange file and summarize it.
    Load {
        /// Interchange JSON file written by `nets`.
        #[arg(long)]
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => NetsConfig::load(path)?,
        None => NetsConfig::default(),
    };
    let engine = Engine::new(config)?;

    match cli.command {
        Commands::Inspect { triples } => {
            let abstraction = abstract_file(&engine, &triples)?;
            print!("{}", abstraction.info());

            println!("\nOriented edges:");
            for provenance in &abstraction.provenance {
                let label = provenance.ontology_id().unwrap_or("(no label source)");
                println!("  {}  [{}]", provenance.edge, label);
            }
            let ambiguous: Vec<_> = abstraction.ambiguous().collect();
            if !ambiguous.is_empty() {
                println!("\nAmbiguous pairs:");
                for ([first, second], reason) in ambiguous {
                    println!("  {first} -- {second}: {reason}");
                }
            }
            println!("\nPlaceholder patterns:");
            for triple in &abstraction.placeholders {
                println!("  {triple} .");
            }
        }

        Commands::Nets {
            triples,
            results,
            output,
            dot,
        } => {
            let abstraction = abstract_file(&engine, &triples)?;
            let results = QueryResults::from_path(&results)?;
            let population = engine.populate(&abstraction, &results)?;
            population.document.write_to(&output)?;
            if let Some(dot) = &dot {
                population.graph.write_dot(dot)?;
            }
            println!(
                "NETS graph: {} nodes, {} edges, {} component(s) -> {}",
                population.graph.node_count(),
                population.graph.edge_count(),
                population.graph.component_count(),
                output.display()
            );
        }

        Commands::Owl {
            triples,
            results,
            output,
            dot,
        } => {
            let abstraction = abstract_file(&engine, &triples)?;
            let results = QueryResults::from_path(&results)?;
            let owl = engine.owl_graph(&abstraction, &results);
            owl.to_document().write_to(&output)?;
            if let Some(dot) = &dot {
                owl.write_dot(dot)?;
            }
            println!(
                "OWL graph: {} nodes, {} edges, {} component(s) -> {}",
                owl.node_count(),
                owl.edge_count(),
                owl.component_count(),
                output.display()
            );
        }

        Commands::Load { file } => {
            let document = InterchangeDocument::read_from(&file)?;
            let graph = document.to_graph();
            println!(
                "{}: {} nodes, {} edges, {} edge type(s)",
                file.display(),
                graph.node_count(),
                graph.edge_count(),
                document.metadata.len()
            );
            for (key, triples) in &document.metadata {
                println!("  {key}: {} statement(s)", triples.len());
            }
        }
    }

    Ok(())
}

fn abstract_file(engine: &Engine, path: &Path) -> Result<Abstraction> {
    let text = std::fs::read_to_string(path).into_diagnostic()?;
    let triples = parse_triples(&text)?;
    Ok(engine.abstract_query(&triples)?)
}
