//! Command line support: read CARP instances, build routes, write solutions.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Parser;
use tracing::{debug, error, info};

use u_arc_routing::constructive::solve;
use u_arc_routing::io::{load_instance, read_references, save_solution, ReadOptions, Reference};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Instance file, or a directory whose `.dat` files are all solved
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Directory receiving `sol-<instance>` files
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    output: PathBuf,

    /// Table of `instance value value` rows copied into each solution
    #[arg(long, value_name = "FILE")]
    reference: Option<PathBuf>,

    /// Reject malformed instance rows instead of skipping them
    #[arg(long)]
    strict: bool,

    /// Also write each solution as JSON
    #[arg(long)]
    json: bool,

    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let tracing_level = match cli.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .init();

    let references = match &cli.reference {
        Some(path) => read_references(path)
            .with_context(|| format!("failed to read references {}", path.display()))?,
        None => HashMap::new(),
    };
    debug!(count = references.len(), "loaded reference values");

    let instances = collect_instances(&cli.input)?;
    fs::create_dir_all(&cli.output)
        .with_context(|| format!("failed to create {}", cli.output.display()))?;

    let options = ReadOptions { strict: cli.strict };
    let mut failed = 0;
    for path in &instances {
        if let Err(err) = run(path, &cli, options, &references) {
            error!(instance = %path.display(), "{err:#}");
            failed += 1;
        }
    }

    info!(instances = instances.len(), failed, "done");
    if failed > 0 {
        bail!("{failed} of {} instances failed", instances.len());
    }
    Ok(())
}

fn collect_instances(input: &Path) -> anyhow::Result<Vec<PathBuf>> {
    if !input.is_dir() {
        return Ok(vec![input.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in
        fs::read_dir(input).with_context(|| format!("failed to list {}", input.display()))?
    {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "dat") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn run(
    path: &Path,
    cli: &Cli,
    options: ReadOptions,
    references: &HashMap<String, Reference>,
) -> anyhow::Result<()> {
    let graph = load_instance(path, options)
        .with_context(|| format!("failed to load {}", path.display()))?;
    info!(
        instance = graph.name().unwrap_or_default(),
        vertices = graph.num_vertices(),
        services = graph.num_services(),
        "instance loaded"
    );

    let solution = solve(&graph)?;

    let file_name = path
        .file_name()
        .with_context(|| format!("{} has no file name", path.display()))?
        .to_string_lossy();
    let reference = graph
        .name()
        .and_then(|name| references.get(name))
        .or_else(|| references.get(file_name.as_ref()))
        .or_else(|| {
            path.file_stem()
                .and_then(|stem| references.get(stem.to_string_lossy().as_ref()))
        })
        .copied();

    let out = cli.output.join(format!("sol-{file_name}"));
    save_solution(&out, &solution, graph.depot(), reference)
        .with_context(|| format!("failed to write {}", out.display()))?;

    if cli.json {
        let json_out = out.with_extension("json");
        let json = serde_json::to_string_pretty(&solution)?;
        fs::write(&json_out, json)
            .with_context(|| format!("failed to write {}", json_out.display()))?;
    }

    info!(
        routes = solution.num_routes(),
        cost = solution.total_cost(),
        out = %out.display(),
        "solution written"
    );
    Ok(())
}
