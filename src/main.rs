use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use clap::{Args, Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use hrview::api::{ApiClient, DEFAULT_API_URL};
use hrview::controller::Controller;
use hrview::domain::{HrConfig, HrError};
use hrview::loader;
use hrview::model::{Model, Status};
use hrview::ui::TableUI;
use hrview::upload::{FileCandidate, PreviewAction, SubmitOutcome, TempDirPreviewHost};
use hrview::{TableConfig, UploadConfig, UploadQueue};

/// Browse candidate tables and upload resumes.
#[derive(Debug, Parser)]
#[command(name = "hrview", version, about)]
struct Cli {
    /// Log filter, e.g. "debug" or "hrview=trace"
    #[arg(long, env = "HRVIEW_LOG", default_value = "info", global = true)]
    log: String,

    /// File receiving the log output
    #[arg(long, env = "HRVIEW_LOG_FILE", default_value = "hrview.log", global = true)]
    log_file: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Browse a CSV, Parquet or Arrow file in the terminal
    Table(TableArgs),
    /// Queue resumes and upload them as one batch
    Upload(UploadArgs),
}

#[derive(Debug, Args)]
struct TableArgs {
    /// Data file to open
    file: String,

    /// Rows per page
    #[arg(long, default_value_t = 15)]
    page_size: usize,

    /// Column to sort by initially
    #[arg(long)]
    sort: Option<String>,

    /// Initial search filter
    #[arg(long)]
    filter: Option<String>,
}

#[derive(Debug, Args)]
struct UploadArgs {
    /// Base URL of the resume service
    #[arg(long, env = "HRVIEW_API_URL", default_value = DEFAULT_API_URL)]
    api: String,

    /// Names already stored on the server. Fetched from the service when omitted.
    #[arg(long = "existing")]
    existing: Vec<String>,

    /// Queue page to list, starting at 1
    #[arg(long, default_value_t = 1)]
    page: usize,

    /// Validate and list the queue without uploading
    #[arg(long)]
    dry_run: bool,

    /// Resume files to queue
    #[arg(required = true)]
    files: Vec<String>,
}

fn expand_path(path: &str) -> Result<PathBuf, HrError> {
    shellexpand::full(path)
        .map(|p| PathBuf::from(p.as_ref()))
        .map_err(|e| HrError::InvalidPath {
            path: path.to_string(),
            message: e.to_string(),
        })
}

fn init_tracing(filter: &str, log_file: &str) -> Result<(), HrError> {
    let file = File::create(expand_path(log_file)?)?;
    let filter = EnvFilter::try_new(filter).map_err(|e| HrError::Logging(e.to_string()))?;
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(false),
        )
        .with(ErrorLayer::default())
        .try_init()
        .map_err(|e| HrError::Logging(e.to_string()))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = init_tracing(&cli.log, &cli.log_file) {
        eprintln!("Warning: {e}");
    }

    let result = match cli.command {
        Command::Table(args) => run_table(args),
        Command::Upload(args) => run_upload(args),
    };
    match result {
        Err(e) => {
            error!("{e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(()) => ExitCode::SUCCESS,
    }
}

fn run_table(args: TableArgs) -> Result<(), HrError> {
    let dataset = loader::load(expand_path(&args.file)?)?;
    let config = HrConfig::default();
    let mut model = Model::from_dataset(dataset, &TableConfig::default().page_size(args.page_size), config.clone());

    if let Some(column) = &args.sort {
        if model.engine().column(column).is_none() {
            warn!("Unknown sort column {column}");
        }
        model.engine_mut().toggle_sort(column);
    }
    if let Some(filter) = args.filter {
        model.engine_mut().set_global_filter(filter);
    }

    let ui = TableUI::new(&config);
    let controller = Controller::new(&config);

    let mut terminal = ratatui::init();
    let result = (|| -> Result<(), HrError> {
        while model.status != Status::Quitting {
            terminal.draw(|f| ui.draw(&model, f))?;
            if let Some(message) = controller.handle_event(&model)? {
                model.update(Some(message));
            }
        }
        Ok(())
    })();
    ratatui::restore();
    result
}

fn format_size(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    let bytes = bytes as f64;
    if bytes < KIB {
        format!("{bytes} B")
    } else if bytes < KIB * KIB {
        format!("{:.1} KB", bytes / KIB)
    } else {
        format!("{:.1} MB", bytes / KIB / KIB)
    }
}

fn run_upload(args: UploadArgs) -> Result<(), HrError> {
    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    runtime.block_on(upload(args))
}

async fn upload(args: UploadArgs) -> Result<(), HrError> {
    let client = ApiClient::new(&args.api)?;
    let existing = if args.existing.is_empty() {
        client.existing_file_names().await
    } else {
        args.existing.clone()
    };
    info!("{} resumes already stored", existing.len());

    let host = Arc::new(TempDirPreviewHost::new()?);
    let mut queue = UploadQueue::new(UploadConfig::default(), host).with_existing_names(existing);

    let mut candidates = Vec::with_capacity(args.files.len());
    for file in &args.files {
        let path = expand_path(file)?;
        match FileCandidate::from_path(&path) {
            Ok(candidate) => candidates.push(candidate),
            Err(e) => {
                warn!("Skipping {}: {e}", path.display());
                println!("skipped  {file}: {e}");
            }
        }
    }

    let report = queue.add_files(candidates);
    for name in &report.accepted {
        println!("queued   {name}");
    }
    for (name, rejection) in &report.rejected {
        println!("rejected {name}: {rejection}");
    }
    if let Some(message) = queue.last_error() {
        println!("\n{message}");
    }

    queue.set_page(args.page.saturating_sub(1));
    let snapshot = queue.snapshot();
    println!(
        "\n{} file(s) queued, page {}/{}",
        snapshot.total,
        snapshot.page_index + 1,
        snapshot.page_count
    );
    for entry in &snapshot.entries {
        let action = match queue.preview_entry(entry.index) {
            Some(PreviewAction::Inline { url }) => format!("view {url}"),
            Some(PreviewAction::Download { url, file_name }) => format!("save {file_name} from {url}"),
            None => String::new(),
        };
        println!(
            "  {:>2}. {} ({})  {action}",
            entry.index + 1,
            entry.name,
            format_size(entry.size_bytes)
        );
    }

    if args.dry_run {
        println!("\nDry run, nothing uploaded.");
        return Ok(());
    }

    match queue.submit(&client).await {
        SubmitOutcome::Uploaded { files } => {
            println!("\nUploaded {files} resume(s).");
            Ok(())
        }
        SubmitOutcome::Skipped(reason) => {
            println!("\nNothing uploaded: {reason}.");
            Ok(())
        }
        SubmitOutcome::Failed { message } => Err(HrError::Upload(message)),
    }
}
