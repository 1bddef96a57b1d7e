//! impactscope CLI - change impact analysis for multi-module builds.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use impactscope_analysis::{format_details, format_summary, ImpactAnalyzer, ModuleDependencyGraph};
use impactscope_core::{ChangeEntry, ImpactResult, ModulePath, ModuleSnapshot, TestInventory};
use impactscope_inventory::{FsInventory, InventorySource, JsonInventory, ModuleLocation};
use impactscope_rules::ImpactConfig;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "impactscope")]
#[command(about = "Select the tests affected by a change", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the tests and compile tasks affected by a change list
    Analyze {
        /// Module graph snapshot (JSON list of modules)
        #[arg(long)]
        graph: PathBuf,
        /// Configuration file (JSON); defaults apply when omitted
        #[arg(long)]
        config: Option<PathBuf>,
        /// Change list: `--name-status` text or a JSON list of entries
        #[arg(long)]
        changes: PathBuf,
        /// Repository root scanned for test sources
        #[arg(long, default_value = ".")]
        root: PathBuf,
        /// Precomputed inventory (JSON); skips the filesystem scan
        #[arg(long)]
        inventory: Option<PathBuf>,
        /// Write the result here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Scan test sources and print the inventory
    Inventory {
        /// Module graph snapshot (JSON list of modules)
        #[arg(long)]
        graph: PathBuf,
        /// Repository root
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },
    /// Print the modules affected by changes to the given modules
    Affected {
        /// Module graph snapshot (JSON list of modules)
        #[arg(long)]
        graph: PathBuf,
        /// Changed modules, e.g. `:core`
        #[arg(required = true)]
        modules: Vec<String>,
    },
    /// Print the module graph as Graphviz DOT
    Graph {
        /// Module graph snapshot (JSON list of modules)
        #[arg(long)]
        graph: PathBuf,
    },
    /// Summarize a stored result
    Report {
        /// Result file written by `analyze`
        #[arg(long)]
        result: PathBuf,
        /// Include per-type and per-module details
        #[arg(long)]
        details: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays machine readable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze { graph, config, changes, root, inventory, output } => {
            let graph = load_graph(&graph).await?;
            let config = match config {
                Some(path) => ImpactConfig::load(&path)
                    .with_context(|| format!("Failed to load config {}", path.display()))?,
                None => ImpactConfig::default(),
            };
            let changes = load_changes(&changes).await?;
            let inventory = load_inventory(&graph, &root, inventory.as_deref()).await?;

            let mut result = ImpactAnalyzer::new(&graph, &config, &inventory).analyze(&changes);
            result.generated_at = Some(chrono::Utc::now());

            let json = serde_json::to_string_pretty(&result)?;
            match output {
                Some(path) => {
                    tokio::fs::write(&path, json)
                        .await
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    info!("Wrote result to {}", path.display());
                }
                None => println!("{}", json),
            }

            for line in format_summary(&result.report) {
                info!("{}", line);
            }
        }
        Commands::Inventory { graph, root } => {
            let graph = load_graph(&graph).await?;
            let inventory = scan_inventory(&graph, &root).await?;
            println!("{}", serde_json::to_string_pretty(&inventory)?);
        }
        Commands::Affected { graph, modules } => {
            let graph = load_graph(&graph).await?;
            let seeds: BTreeSet<ModulePath> = modules.into_iter().map(ModulePath::new).collect();
            for module in &seeds {
                if !graph.contains(module) {
                    tracing::warn!("Module {} is not part of the graph", module);
                }
            }

            for module in graph.affected(&seeds) {
                println!("{}", module);
            }
        }
        Commands::Graph { graph } => {
            let graph = load_graph(&graph).await?;
            print!("{}", graph.to_dot());
        }
        Commands::Report { result, details } => {
            let text = tokio::fs::read_to_string(&result)
                .await
                .with_context(|| format!("Failed to read {}", result.display()))?;
            let result: ImpactResult = serde_json::from_str(&text).context("Invalid result file")?;

            for line in format_summary(&result.report) {
                println!("{}", line);
            }
            if details {
                for line in format_details(&result.report) {
                    println!("{}", line);
                }
            }
        }
    }

    Ok(())
}

async fn load_graph(path: &Path) -> Result<ModuleDependencyGraph> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read graph {}", path.display()))?;
    let snapshots: Vec<ModuleSnapshot> = serde_json::from_str(&text).context("Invalid graph snapshot")?;
    let graph = ModuleDependencyGraph::from_snapshots(snapshots)?;
    info!("Loaded {} modules", graph.len());
    Ok(graph)
}

async fn load_changes(path: &Path) -> Result<Vec<ChangeEntry>> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read changes {}", path.display()))?;
    parse_changes(&text)
}

/// A JSON list of entries, or `--name-status` text.
fn parse_changes(text: &str) -> Result<Vec<ChangeEntry>> {
    if text.trim_start().starts_with('[') {
        return serde_json::from_str(text).context("Invalid change list");
    }
    Ok(ChangeEntry::parse_name_status(text)?)
}

async fn load_inventory(
    graph: &ModuleDependencyGraph,
    root: &Path,
    precomputed: Option<&Path>,
) -> Result<TestInventory> {
    match precomputed {
        Some(path) => {
            let source = JsonInventory::load(path)
                .await
                .with_context(|| format!("Failed to load inventory {}", path.display()))?;
            Ok(source.scan_all(&locations(graph)).await?)
        }
        None => scan_inventory(graph, root).await,
    }
}

async fn scan_inventory(graph: &ModuleDependencyGraph, root: &Path) -> Result<TestInventory> {
    let scanner = FsInventory::new(root)?;
    Ok(scanner.scan_all(&locations(graph)).await?)
}

fn locations(graph: &ModuleDependencyGraph) -> Vec<ModuleLocation> {
    graph
        .testable_modules()
        .map(|m| ModuleLocation::new(m.path.clone(), m.directory.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use impactscope_core::ChangeKind;

    #[test]
    fn test_parse_name_status_changes() {
        let changes = parse_changes("M\tapp/src/main/App.kt\nR100\told.kt\tcore/src/New.kt\n").unwrap();
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[1].path, "core/src/New.kt");
        assert_eq!(changes[1].kind, ChangeKind::Renamed);
    }

    #[test]
    fn test_parse_json_changes() {
        let changes = parse_changes(r#"[{"path": "build.gradle", "kind": "modified"}]"#).unwrap();
        assert_eq!(changes, vec![ChangeEntry::new("build.gradle", ChangeKind::Modified)]);
    }

    #[test]
    fn test_parse_bad_status() {
        assert!(parse_changes("X\tREADME.md\n").is_err());
    }

    #[tokio::test]
    async fn test_load_graph_and_inventory() {
        let dir = tempfile::tempdir().unwrap();
        let graph_path = dir.path().join("graph.json");
        tokio::fs::write(
            &graph_path,
            r#"[
                {"path": ":", "directory": ""},
                {"path": ":app", "directory": "app", "dependencies": [":lib"], "test_tasks": ["test"]},
                {"path": ":lib", "directory": "lib", "test_tasks": ["test"]}
            ]"#,
        )
        .await
        .unwrap();
        tokio::fs::create_dir_all(dir.path().join("lib/src/test/kotlin")).await.unwrap();
        tokio::fs::write(dir.path().join("lib/src/test/kotlin/LibTest.kt"), "@Test\nfun a() {}\n")
            .await
            .unwrap();

        let graph = load_graph(&graph_path).await.unwrap();
        assert_eq!(graph.len(), 3);

        let inventory = load_inventory(&graph, dir.path(), None).await.unwrap();
        assert_eq!(inventory.len(), 2);
        assert_eq!(inventory.test_methods(&ModulePath::new(":lib")), 1);

        let changes = parse_changes("M\tlib/src/main/Lib.kt\n").unwrap();
        let config = ImpactConfig::default();
        let result = ImpactAnalyzer::new(&graph, &config, &inventory).analyze(&changes);
        assert_eq!(result.affected_modules.len(), 2);
    }
}
