//! `travelplanner` CLI entry point.
//!
//! `plan` runs one planning cycle and prints the merged documents; `serve`
//! starts the HTTP API.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use travelplanner::api::AppState;
use travelplanner::config::PlannerConfig;
use travelplanner::delivery::{self, DeliveryReport};
use travelplanner::export::{self, ExportFormat, Exporter};
use travelplanner::models::{DateRange, Length, Place, Plan, Tone, TripRequest};
use travelplanner::{PlannerError, Planner, extract, logging, web};

/// AI travel planner with map links and chunked WhatsApp/e-mail delivery.
#[derive(Parser)]
#[command(name = "travelplanner", version, about)]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Plan a trip and print the itinerary documents
    Plan(PlanArgs),
    /// Start the HTTP API
    Serve {
        /// Port to listen on (overrides server.port)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[derive(clap::Args)]
struct PlanArgs {
    /// Destination city or region
    #[arg(short, long)]
    destination: String,

    /// First travel day (YYYY-MM-DD)
    #[arg(long)]
    start: NaiveDate,

    /// Last travel day (YYYY-MM-DD)
    #[arg(long)]
    end: NaiveDate,

    /// Number of travelers
    #[arg(short, long, default_value_t = 1)]
    members: u32,

    /// Free-text budget, e.g. "2,000 EUR"
    #[arg(short, long, default_value = "")]
    budget: String,

    /// Number of alternative drafts to generate
    #[arg(long, default_value_t = 1)]
    drafts: usize,

    #[arg(long, value_enum, default_value_t = Tone::default())]
    tone: Tone,

    #[arg(long, value_enum, default_value_t = Length::default())]
    length: Length,

    /// Merge an existing itinerary (.txt, .eml, .docx) instead of generating one
    #[arg(long)]
    from_file: Option<PathBuf>,

    /// Send every document over the configured delivery channel
    #[arg(long)]
    send: bool,

    /// Write each document to this directory
    #[arg(long)]
    export_dir: Option<PathBuf>,

    /// Export PDF instead of plain text
    #[arg(long, requires = "export_dir")]
    pdf: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = PlannerConfig::load_from_path(cli.config.clone())
        .context("failed to load configuration")?;
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    logging::init(&config.logging);

    match cli.command {
        Command::Plan(args) => handle_plan(&config, args).await,
        Command::Serve { port } => handle_serve(&config, port).await,
    }
}

async fn handle_plan(config: &PlannerConfig, args: PlanArgs) -> anyhow::Result<()> {
    let request = TripRequest {
        destination: args.destination,
        dates: DateRange {
            start: args.start,
            end: args.end,
        },
        members: args.members,
        budget: args.budget,
        draft_count: args.drafts,
        tone: args.tone,
        length: args.length,
    };

    let planner = Planner::from_config(config).context("failed to set up planner")?;
    let plan = match &args.from_file {
        Some(path) => {
            let bytes = tokio::fs::read(path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?;
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let text = extract::extract_text(&file_name, &bytes)?;
            planner.plan_from_text(&request, &text).await?
        }
        None => planner.run(&request).await?,
    };

    print_plan(&plan);

    if let Some(dir) = &args.export_dir {
        let format = if args.pdf { ExportFormat::Pdf } else { ExportFormat::Txt };
        export_plan(&plan, dir, format, Exporter::from_config(&config.export)).await?;
    }

    if args.send {
        send_plan(config, &plan, request.destination.trim()).await?;
    }

    Ok(())
}

fn print_plan(plan: &Plan) {
    fn print_places(title: &str, places: &[Place]) {
        println!("{title}:");
        for place in places {
            println!("  - {place}");
        }
    }

    print_places("Hotels", &plan.hotels);
    print_places("Restaurants", &plan.restaurants);
    print_places("Attractions", &plan.attractions);

    for document in &plan.documents {
        println!("\n===== Draft {} =====\n", document.draft_index);
        println!("{}", document.text);
    }
}

async fn export_plan(
    plan: &Plan,
    dir: &Path,
    format: ExportFormat,
    exporter: Exporter,
) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("failed to create {}", dir.display()))?;

    for document in &plan.documents {
        let (bytes, format) = match exporter.export(&document.text, format) {
            Ok(bytes) => (bytes, format),
            Err(PlannerError::CapabilityUnavailable { capability }) => {
                warn!("{} export unavailable, writing plain text", capability);
                (export::to_plain_bytes(&document.text), ExportFormat::Txt)
            }
            Err(e) => return Err(e.into()),
        };

        let path = dir.join(format!(
            "travel_plan_{}.{}",
            document.draft_index,
            format.extension()
        ));
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!("Exported {}", path.display());
    }
    Ok(())
}

async fn send_plan(config: &PlannerConfig, plan: &Plan, destination: &str) -> anyhow::Result<()> {
    let sender = delivery::sender_from_config(&config.delivery)
        .context("delivery channel is not configured")?;

    for document in &plan.documents {
        let message = delivery::compose_message(destination, &document.text);
        match delivery::deliver(sender.as_ref(), &message, config.delivery.max_chunk_len).await {
            DeliveryReport::Delivered { chunks } => {
                println!("Draft {} sent in {} messages", document.draft_index, chunks);
            }
            DeliveryReport::Failed { sent, total, error } => {
                anyhow::bail!(
                    "draft {} delivery failed after {sent}/{total} messages: {error}",
                    document.draft_index
                );
            }
        }
    }
    Ok(())
}

async fn handle_serve(config: &PlannerConfig, port: Option<u16>) -> anyhow::Result<()> {
    let state = AppState::from_config(config).context("failed to set up API state")?;
    web::run(state, port.unwrap_or(config.server.port)).await
}
