// bimlib - Command-line client for the BIM model library

mod client;
mod display;
mod progress;
mod widget;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use colored::Colorize;

use client::{CatalogClient, DEFAULT_SERVER_URL};
use display::TerminalObserver;
use widget::{MetadataForm, SelectedFile, UploadWidget, WidgetError};

/// bimlib - Upload and browse 3D models in a BIM model library
#[derive(Parser)]
#[command(name = "bimlib")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Base URL of the catalog service
    #[arg(long, global = true, env = "BIMLIB_API_URL", default_value = DEFAULT_SERVER_URL)]
    server: String,

    /// Largest file accepted for upload, in MB
    #[arg(long, global = true, default_value_t = 50)]
    max_size_mb: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a model file with its metadata
    Upload {
        /// Model file (.glb, .obj or .fbx). Only the first path is uploaded.
        #[arg(required = true, value_name = "PATH")]
        paths: Vec<PathBuf>,

        /// Display name
        #[arg(short, long, default_value = "")]
        name: String,

        /// Catalog category, e.g. "Furniture"
        #[arg(short, long, default_value = "")]
        category: String,

        /// Free-form description
        #[arg(short, long, default_value = "")]
        description: String,

        /// Comma-separated materials, e.g. "oak, steel"
        #[arg(short, long, default_value = "")]
        materials: String,

        /// Comma-separated specifications
        #[arg(short, long, default_value = "")]
        specifications: String,

        /// Do not print the library after a successful upload
        #[arg(long)]
        no_browse: bool,
    },
    /// List every model, newest first
    List,
    /// Show one model
    Show {
        /// Model ID
        id: String,
    },
    /// Check that the catalog service is reachable
    Health,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Upload {
            paths,
            name,
            category,
            description,
            materials,
            specifications,
            no_browse,
        } => {
            let form = MetadataForm {
                name,
                category,
                description,
                materials,
                specifications,
            };
            handle_upload(&cli.server, cli.max_size_mb, &paths, form, no_browse)
        }
        Commands::List => handle_list(&cli.server),
        Commands::Show { id } => handle_show(&cli.server, &id),
        Commands::Health => handle_health(&cli.server),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", failure_line(&e));
            ExitCode::FAILURE
        }
    }
}

/// Final line printed on failure. Widget errors were already shown to the
/// user when they happened, so they only get a short closing line.
fn failure_line(err: &anyhow::Error) -> String {
    if err.downcast_ref::<WidgetError>().is_some() {
        "Upload did not complete.".red().to_string()
    } else {
        format!("{} {}", "Error:".red().bold(), err)
    }
}

/// Reads the first path as the upload candidate. The remaining paths are
/// only counted, never touched.
fn first_selection(paths: &[PathBuf]) -> anyhow::Result<(SelectedFile, usize)> {
    let Some(first) = paths.first() else {
        anyhow::bail!("No file given");
    };
    let file = SelectedFile::from_path(first)
        .map_err(|e| anyhow::anyhow!("Failed to read '{}': {}", first.display(), e))?;
    Ok((file, paths.len() - 1))
}

fn handle_upload(
    server: &str,
    max_size_mb: u64,
    paths: &[PathBuf],
    form: MetadataForm,
    no_browse: bool,
) -> anyhow::Result<()> {
    let client = CatalogClient::new(server)?;

    let (file, ignored) = first_selection(paths)?;
    if ignored > 0 {
        println!(
            "{}",
            format!("Only the first file is uploaded; ignoring {} more.", ignored).dimmed()
        );
    }

    let browse_client = if no_browse { None } else { Some(client.clone()) };
    let observer = Arc::new(TerminalObserver::new(browse_client));

    let mut upload = UploadWidget::new(client, observer)
        .with_max_size(max_size_mb.saturating_mul(1024 * 1024));
    if no_browse {
        upload = upload.with_browse_delay(Duration::ZERO);
    }

    upload.select_files(vec![file])?;
    *upload.form_mut() = form;

    let record = upload.submit()?;
    println!();
    println!("  ID:   {}", record.id);
    println!("  Name: {}", record.name);
    println!("  File: {}", record.file_path);
    Ok(())
}

fn handle_list(server: &str) -> anyhow::Result<()> {
    let client = CatalogClient::new(server)?;
    let models = client.list_models()?;
    display::print_models(&client, &models);
    Ok(())
}

fn handle_show(server: &str, id: &str) -> anyhow::Result<()> {
    let client = CatalogClient::new(server)?;
    let view = client.get_model(id)?;
    display::print_model(&client, &view);
    Ok(())
}

fn handle_health(server: &str) -> anyhow::Result<()> {
    let client = CatalogClient::new(server)?;
    let report = client.health()?;
    display::print_health(&client, &report);
    Ok(())
}
