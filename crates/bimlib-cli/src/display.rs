// Terminal rendering for the upload widget and catalog listings

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use bimlib_core::{FileStatus, HealthReport, ModelView};
use colored::Colorize;

use crate::client::CatalogClient;
use crate::widget::WidgetObserver;

const BAR_WIDTH: usize = 30;

/// Prints widget events to the terminal. With a client attached, browse
/// navigation fetches and prints the catalog.
pub struct TerminalObserver {
    client: Option<CatalogClient>,
    bar_open: AtomicBool,
}

impl TerminalObserver {
    pub fn new(client: Option<CatalogClient>) -> Self {
        Self {
            client,
            bar_open: AtomicBool::new(false),
        }
    }

    /// Ends an in-place progress line before printing anything else.
    fn close_bar(&self) {
        if self.bar_open.swap(false, Ordering::SeqCst) {
            eprintln!();
        }
    }
}

impl WidgetObserver for TerminalObserver {
    fn status(&self, text: &str) {
        self.close_bar();
        println!("{} {}", "→".cyan(), text);
    }

    fn progress(&self, fraction: f64) {
        // Nothing to draw until bytes start moving.
        if fraction <= 0.0 && !self.bar_open.load(Ordering::SeqCst) {
            return;
        }
        self.bar_open.store(true, Ordering::SeqCst);

        let mut stderr = io::stderr();
        let _ = write!(stderr, "\r{}", progress_bar(fraction));
        let _ = stderr.flush();

        if fraction >= 1.0 {
            self.close_bar();
        }
    }

    fn notify(&self, message: &str) {
        self.close_bar();
        println!("{}", message.bold());
    }

    fn browse(&self) {
        let Some(client) = &self.client else {
            return;
        };
        println!();
        match client.list_models() {
            Ok(models) => print_models(client, &models),
            Err(e) => eprintln!("{} Could not load the catalog: {}", "!".yellow().bold(), e),
        }
    }
}

/// `[#########---------]  50%`
pub fn progress_bar(fraction: f64) -> String {
    let fraction = fraction.clamp(0.0, 1.0);
    let filled = (fraction * BAR_WIDTH as f64).round() as usize;
    format!(
        "[{}{}] {:>3}%",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        (fraction * 100.0).round() as u32
    )
}

/// Human-readable byte count.
pub fn format_size(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = KIB * 1024.0;
    let b = bytes as f64;
    if b >= MIB {
        format!("{:.1} MB", b / MIB)
    } else if b >= KIB {
        format!("{:.1} KB", b / KIB)
    } else {
        format!("{} B", bytes)
    }
}

fn file_badge(view: &ModelView) -> String {
    match view.file_status {
        FileStatus::Available => "available".green().to_string(),
        FileStatus::Missing => "missing".red().to_string(),
    }
}

fn join_or_dash(items: &[String]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}

pub fn print_models(client: &CatalogClient, models: &[ModelView]) {
    if models.is_empty() {
        println!("No models in the library yet.");
        return;
    }

    println!("{} ({})", "Model library".bold(), models.len());
    for view in models {
        let record = &view.record;
        println!();
        println!("  {} [{}]", record.name.bold(), record.category.cyan());
        println!("    ID:       {}", record.id);
        println!(
            "    Uploaded: {}",
            record.upload_date.format("%Y-%m-%d %H:%M:%S UTC")
        );
        println!("    File:     {} ({})", client.file_url(&record.file_path), file_badge(view));
    }
}

pub fn print_model(client: &CatalogClient, view: &ModelView) {
    let record = &view.record;
    println!("{}", record.name.bold());
    println!();
    println!("  ID:             {}", record.id);
    println!("  Category:       {}", record.category);
    println!("  Description:    {}", record.description);
    println!("  Materials:      {}", join_or_dash(&record.materials));
    println!("  Specifications: {}", join_or_dash(&record.specifications));
    println!("  Uploaded:       {}", record.upload_date.to_rfc3339());
    if let Some(original) = &record.original_name {
        println!("  Original name:  {}", original);
    }
    if let Some(size) = record.file_size {
        println!("  Size:           {}", format_size(size));
    }
    println!("  File:           {} ({})", client.file_url(&record.file_path), file_badge(view));
    if view.file_status == FileStatus::Missing {
        println!(
            "  {}",
            "The file is no longer on the server. Please re-upload the model.".yellow()
        );
    }
}

pub fn print_health(client: &CatalogClient, report: &HealthReport) {
    let database = if report.database.connected {
        "connected".green()
    } else {
        "disconnected".red()
    };
    let uploads = if report.uploads.directory == "exists" {
        report.uploads.directory.green()
    } else {
        report.uploads.directory.red()
    };

    println!("{} {}", "✓".green().bold(), format!("Catalog at {} is up", client.base_url()).green());
    println!();
    println!("  Status:    {}", report.status);
    println!("  Timestamp: {}", report.timestamp.to_rfc3339());
    println!("  Database:  {}", database);
    println!("  Uploads:   {}", uploads);
}
