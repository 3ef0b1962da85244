// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Polyframe mesh CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use nalgebra::Point3;
use polyframe_mesh::geometry::analyze;
use polyframe_mesh::{io, BooleanOp, MeshConfig, OutputSettings, Primitive, StlFormat};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "polyframe-mesh")]
#[command(about = "Polyframe mesh topology engine - CSG booleans and mesh inspection", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML file with mesh tolerance settings
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Combine two STL solids
    Boolean {
        /// union, difference (subtract) or intersection (intersect)
        op: BooleanOp,

        a: PathBuf,

        b: PathBuf,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Write ASCII instead of binary STL
        #[arg(long)]
        ascii: bool,
    },

    /// Print statistics and topology diagnostics for an STL file
    Info {
        input: PathBuf,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Write an axis-aligned cube centred on the origin
    Cube {
        #[arg(short, long, default_value = "10")]
        size: f64,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Write ASCII instead of binary STL
        #[arg(long)]
        ascii: bool,
    },
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn output_settings(ascii: bool) -> OutputSettings {
    OutputSettings {
        format: if ascii { StlFormat::Ascii } else { StlFormat::Binary },
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => MeshConfig::from_file(path)?,
        None => MeshConfig::default(),
    };

    match cli.command {
        Commands::Boolean {
            op,
            a,
            b,
            output,
            ascii,
        } => boolean_command(op, &a, &b, &output, ascii, config),
        Commands::Info { input, json } => info_command(&input, json, config),
        Commands::Cube {
            size,
            output,
            ascii,
        } => {
            let mesh = Primitive::cube(size, Point3::origin()).to_mesh_with_config(config);
            io::save(&mesh, &output, &output_settings(ascii))?;
            println!("{} {}", "✓".green(), output.display());
            Ok(())
        }
    }
}

fn boolean_command(
    op: BooleanOp,
    a: &Path,
    b: &Path,
    output: &Path,
    ascii: bool,
    config: MeshConfig,
) -> Result<()> {
    let start = std::time::Instant::now();
    let mesh = polyframe_mesh::boolean_files(a, b, op, config)?;
    let elapsed = start.elapsed();

    io::save(&mesh, output, &output_settings(ascii))?;
    println!(
        "{} {} -> {} ({} faces, {} vertices, {:.2?})",
        "✓".green(),
        op.to_string().bold(),
        output.display(),
        mesh.face_count(),
        mesh.vertex_count(),
        elapsed
    );
    Ok(())
}

fn info_command(input: &Path, json: bool, config: MeshConfig) -> Result<()> {
    let mesh = io::load_with_config(input, config)?;
    let stats = analyze(&mesh);
    let issues = mesh.diagnose();

    if json {
        let report = serde_json::json!({
            "file": input.display().to_string(),
            "stats": stats,
            "issues": issues,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize report")?
        );
        return Ok(());
    }

    println!("{}", input.display().to_string().bold());
    stats.print();
    if issues.is_empty() {
        println!("{}", "Topology is consistent".green());
    } else {
        println!("{}", format!("{} topology issues", issues.len()).red().bold());
        for issue in &issues {
            println!("  {} {}", "✗".red(), issue);
        }
    }
    Ok(())
}
