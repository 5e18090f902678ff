use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::fs;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};
use tracing::debug;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use payments_report::config::{config_dir, init_config, load_config, resolve_store_dir};
use payments_report::{
    load_payments, print_payments_report, AttachmentId, DirectoryStore, OfficeConverter, Result,
};

#[derive(Parser)]
#[command(name = "payments-report")]
#[command(version, about = "Grouped payment-order reports rendered to PDF", long_about = None)]
struct Cli {
    /// Path to config directory (default: ~/.payments-report or XDG config)
    #[arg(short = 'C', long, global = true)]
    config_dir: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "warn")]
    log_level: LevelFilter,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config directory with a template config.toml
    Init,

    /// Print the confirmed payments of a selection as a PDF report
    Print {
        /// Selected payments (TOML with [[payments]], or .json)
        #[arg(short, long)]
        payments: PathBuf,

        /// Also copy the PDF to this path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the download action as JSON
        #[arg(long)]
        json: bool,

        /// Open generated PDF with system default viewer
        #[arg(long)]
        open: bool,
    },

    /// List stored report attachments
    List {
        /// Number of attachments to show (default: all)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Write a stored attachment to a file
    Export {
        /// Attachment id from 'list'
        id: u64,

        #[arg(short, long)]
        output: PathBuf,
    },

    /// Show configuration and store status
    Status,
}

fn main() {
    let cli = Cli::parse();
    init_logger(cli.log_level);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_logger(level: LevelFilter) {
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    // Determine config directory
    let cfg_dir = match cli.config_dir {
        Some(p) => p,
        None => config_dir()?,
    };
    debug!("Config directory: {}", cfg_dir.display());

    match cli.command {
        Commands::Init => cmd_init(&cfg_dir),
        Commands::Print {
            payments,
            output,
            json,
            open,
        } => cmd_print(&cfg_dir, &payments, output, json, open),
        Commands::List { limit } => cmd_list(&cfg_dir, limit),
        Commands::Export { id, output } => cmd_export(&cfg_dir, id, &output),
        Commands::Status => cmd_status(&cfg_dir),
    }
}

/// Initialize config directory
fn cmd_init(cfg_dir: &Path) -> Result<()> {
    init_config(cfg_dir)?;

    println!("Initialized payments-report config at: {}", cfg_dir.display());
    println!();
    println!("Next steps:");
    println!(
        "  1. Check the converter and labels:  $EDITOR {}/config.toml",
        cfg_dir.display()
    );
    println!("  2. Print a report:                  payments-report print --payments <file>");

    Ok(())
}

fn open_store(cfg_dir: &Path) -> Result<DirectoryStore> {
    let config = load_config(cfg_dir)?;
    DirectoryStore::open(resolve_store_dir(&config.store, cfg_dir))
}

/// Run the report pipeline against the configured converter and store
fn cmd_print(
    cfg_dir: &Path,
    payments_path: &Path,
    output: Option<PathBuf>,
    json: bool,
    open: bool,
) -> Result<()> {
    let config = load_config(cfg_dir)?;
    let payments = load_payments(payments_path)?;
    let converter = OfficeConverter::from_settings(&config.converter);
    let mut store = DirectoryStore::open(resolve_store_dir(&config.store, cfg_dir))?;

    let printed = print_payments_report(&payments, &config.report, &converter, &mut store)?;
    let stored_path = store.path_of(printed.attachment)?;

    if let Some(path) = &output {
        fs::copy(&stored_path, path)?;
    }

    if json {
        let body = serde_json::to_string_pretty(&printed.action).map_err(std::io::Error::from)?;
        println!("{body}");
    } else {
        println!("Generated {}", printed.sheet.title);
        println!(
            "  Payments:   {} ({} partner(s))",
            printed.sheet.payment_count(),
            printed.sheet.sections.len()
        );
        println!("  Total:      {}", format_amount(printed.sheet.grand_total()));
        println!("  Attachment: {}", printed.attachment);
        println!("  Download:   {}", printed.action.url);
        if let Some(path) = &output {
            println!("  Saved:      {}", path.display());
        }
    }

    if open {
        open_path(output.as_deref().unwrap_or(stored_path.as_path()))?;
    }

    Ok(())
}

#[derive(Tabled)]
struct AttachmentRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "CREATED")]
    created: String,
    #[tabled(rename = "SIZE")]
    size: String,
}

/// List stored attachments, newest first
fn cmd_list(cfg_dir: &Path, limit: Option<usize>) -> Result<()> {
    let store = open_store(cfg_dir)?;
    let entries = store.list()?;

    if entries.is_empty() {
        println!("No reports stored yet.");
        return Ok(());
    }

    let rows: Vec<AttachmentRow> = entries
        .iter()
        .rev()
        .take(limit.unwrap_or(entries.len()))
        .map(|e| AttachmentRow {
            id: e.id,
            name: e.name.clone(),
            created: e.created.format("%Y-%m-%d %H:%M").to_string(),
            size: format!("{} B", format_grouped_int(e.size as i64)),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");
    println!();
    println!("Total: {} report(s)", entries.len());

    Ok(())
}

/// Write an attachment's payload to a file
fn cmd_export(cfg_dir: &Path, id: u64, output: &Path) -> Result<()> {
    let store = open_store(cfg_dir)?;
    let attachment = store.get(AttachmentId(id))?;
    fs::write(output, &attachment.data)?;

    println!("Exported {} ({})", attachment.name, attachment.mimetype);
    println!("  Saved: {}", output.display());
    Ok(())
}

/// Show configuration and store status
fn cmd_status(cfg_dir: &Path) -> Result<()> {
    let config = load_config(cfg_dir)?;
    let store = DirectoryStore::open(resolve_store_dir(&config.store, cfg_dir))?;
    let entries = store.list()?;

    println!("Payments Report Status");
    println!("{}", "-".repeat(50));
    println!("Config directory: {}", cfg_dir.display());
    println!("Converter:        {}", config.converter.program);
    println!("Store directory:  {}", store.dir().display());
    println!("Reports stored:   {}", entries.len());

    if let Some(last) = entries.last() {
        println!(
            "Last report:      #{} {} ({})",
            last.id,
            last.name,
            last.created.format("%Y-%m-%d %H:%M")
        );
    }

    Ok(())
}

fn open_path(pdf_path: &Path) -> Result<()> {
    // Open with system default viewer
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(pdf_path).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(pdf_path).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", ""])
            .arg(pdf_path)
            .spawn()?;
    }
    Ok(())
}

fn format_grouped_int(value: i64) -> String {
    let grouped = group_digits(&value.unsigned_abs().to_string());
    if value < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Insert thousands separators into a run of ASCII digits
fn group_digits(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Format an amount with two decimal places and thousands separators
fn format_amount(value: Decimal) -> String {
    let rounded = format!("{:.2}", value.round_dp(2));
    let (whole, frac) = rounded.split_once('.').unwrap_or((rounded.as_str(), "00"));

    match whole.strip_prefix('-') {
        Some(digits) => format!("-{}.{}", group_digits(digits), frac),
        None => format!("{}.{}", group_digits(whole), frac),
    }
}
