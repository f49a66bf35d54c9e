use anyhow::{bail, Context, Result};
use clap::{ArgGroup, Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use codegraph::analysis::{CycleEnumeration, CycleLimits};
use codegraph::config::Config;
use codegraph::export::{self, ExportData, ExportFormat};
use codegraph::model::{DependencyType, Language};
use codegraph::{logging, CodeDependencyGraph};

#[derive(Parser)]
#[command(name = "codegraph")]
#[command(version)]
#[command(about = "Typed dependency graph analysis for source files", long_about = None)]
struct Cli {
    /// Increase log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Report structural metrics of a graph document
    Metrics {
        /// Graph document to analyze
        graph: PathBuf,

        /// Report format: json, csv or markdown
        #[arg(short, long)]
        format: Option<ExportFormat>,

        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List circular dependencies
    Cycles {
        /// Graph document to analyze
        graph: PathBuf,

        /// Stop listing cycles of one component after this many
        #[arg(long)]
        max_cycles: Option<usize>,
    },
    /// Show the shortest dependency chain between two files
    Path {
        /// Graph document to analyze
        graph: PathBuf,
        /// Id of the depending file
        from: String,
        /// Id of the file depended upon
        to: String,
    },
    /// Show everything a file affects and everything it relies on
    Impact {
        /// Graph document to analyze
        graph: PathBuf,
        /// Id of the file
        id: String,
    },
    /// Group files into dependency layers
    Layers {
        /// Graph document to analyze
        graph: PathBuf,
    },
    /// Write a subgraph selected by language, link type or container
    #[command(group(
        ArgGroup::new("criterion")
            .required(true)
            .args(["language", "dependency_type", "container"])
    ))]
    Filter {
        /// Graph document to filter
        graph: PathBuf,

        #[arg(long)]
        language: Option<Language>,

        #[arg(long)]
        dependency_type: Option<DependencyType>,

        #[arg(long)]
        container: Option<String>,

        /// Write the filtered document to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Derive links from the statements declared on each file
    Resolve {
        /// Graph document to update
        graph: PathBuf,

        /// Write the updated document to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    run(cli, Path::new("."))
}

/// Runs one command. `.codegraph.toml` is read from `config_dir`, and only by
/// the commands that use it.
fn run(cli: Cli, config_dir: &Path) -> Result<()> {
    match cli.command {
        Some(Commands::Metrics {
            graph,
            format,
            output,
        }) => {
            let config = load_config(config_dir)?;
            let graph = load_graph(&graph)?;
            let format = format.unwrap_or(config.output.format);
            let data = ExportData::with_limits(&graph, config.analysis.cycle_limits);
            with_output(output.as_deref(), |mut writer| {
                Ok(export::export(format, &data, &mut writer)?)
            })?;
        }
        Some(Commands::Cycles { graph, max_cycles }) => {
            let config = load_config(config_dir)?;
            let graph = load_graph(&graph)?;
            let limits = CycleLimits {
                max_cycles: max_cycles.unwrap_or(config.analysis.cycle_limits.max_cycles),
                ..config.analysis.cycle_limits
            };
            print_cycles(&graph, limits);
        }
        Some(Commands::Path { graph, from, to }) => {
            let graph = load_graph(&graph)?;
            ensure_node(&graph, &from)?;
            ensure_node(&graph, &to)?;

            match graph.find_dependency_path(&from, &to) {
                Some(path) => {
                    println!("{}", path.display_path());
                    for link in &path.links {
                        println!("  {}", link);
                    }
                }
                None => println!("No dependency path from {} to {}", from, to),
            }
        }
        Some(Commands::Impact { graph, id }) => {
            let graph = load_graph(&graph)?;
            ensure_node(&graph, &id)?;

            let ancestors = graph.ancestors(&id);
            let descendants = graph.descendants(&id);
            println!("Files affected by {} ({}):", id, ancestors.len());
            for ancestor in &ancestors {
                println!("  {}", ancestor);
            }
            println!("Files {} relies on ({}):", id, descendants.len());
            for descendant in &descendants {
                println!("  {}", descendant);
            }
        }
        Some(Commands::Layers { graph }) => {
            let graph = load_graph(&graph)?;
            for (level, layer) in graph.dependency_layers().iter().enumerate() {
                println!("{}: {}", level, layer.join(", "));
            }
        }
        Some(Commands::Filter {
            graph,
            language,
            dependency_type,
            container,
            output,
        }) => {
            let graph = load_graph(&graph)?;
            let filtered = if let Some(language) = language {
                graph.filter_by_language(&language)
            } else if let Some(dependency_type) = dependency_type {
                graph.filter_by_dependency_type(&dependency_type)
            } else if let Some(container) = container {
                graph.filter_by_container(&container)
            } else {
                bail!("No filter criterion given");
            };
            write_document(&filtered, output.as_deref())?;
        }
        Some(Commands::Resolve { graph, output }) => {
            let mut graph = load_graph(&graph)?;
            for link in graph.resolve_links() {
                graph
                    .merge_link_distinct(link)
                    .context("Failed to apply resolved link")?;
            }
            write_document(&graph, output.as_deref())?;
        }
        Some(Commands::Version) => {
            println!("codegraph v{}", env!("CARGO_PKG_VERSION"));
        }
        None => {
            println!("codegraph - Typed dependency graph analysis");
            println!("Run 'codegraph metrics <graph.json>' to analyze a graph document");
            println!("Run 'codegraph --help' for more information");
        }
    }

    Ok(())
}

fn load_config(dir: &Path) -> Result<Config> {
    Config::load(dir).context("Failed to load .codegraph.toml")
}

fn load_graph(path: &Path) -> Result<CodeDependencyGraph> {
    CodeDependencyGraph::load_from_json(path)
        .with_context(|| format!("Failed to load graph from {}", path.display()))
}

fn ensure_node(graph: &CodeDependencyGraph, id: &str) -> Result<()> {
    if !graph.contains_node(id) {
        bail!("Unknown file id '{}' in graph '{}'", id, graph.name());
    }
    Ok(())
}

/// Runs `write` against the output file, or stdout when none is given.
fn with_output(
    output: Option<&Path>,
    write: impl FnOnce(&mut dyn Write) -> Result<()>,
) -> Result<()> {
    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            write(&mut writer)?;
            writer.flush()?;
        }
        None => {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            write(&mut lock)?;
        }
    }
    Ok(())
}

fn write_document(graph: &CodeDependencyGraph, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => graph
            .save_to_json(path)
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            println!("{}", graph.to_json_string()?);
            Ok(())
        }
    }
}

fn print_cycles(graph: &CodeDependencyGraph, limits: CycleLimits) {
    let report = graph.detect_cycles_with(limits);
    if report.is_empty() {
        println!("No circular dependencies found");
        return;
    }

    for (i, cycle) in report.components.iter().enumerate() {
        println!("{}. {}", i + 1, cycle.cycle_path());
        match &cycle.enumeration {
            CycleEnumeration::Complete { cycles } if cycles.len() > 1 => {
                for path in cycles {
                    println!("     {}", path.join(" -> "));
                }
            }
            CycleEnumeration::Complete { .. } => {}
            CycleEnumeration::CapExceeded { cap, .. } => {
                println!("     (more than {} cycles among {} files)", cap, cycle.len());
            }
        }
    }
    for id in &report.self_loops {
        println!("self-loop: {}", id);
    }
}
