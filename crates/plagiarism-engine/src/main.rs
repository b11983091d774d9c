use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::error;

use plagiarism_engine::config::{load_config, EngineConfig};
use plagiarism_engine::db::Database;
use plagiarism_engine::{
    logging, DocumentExtractor, GetPlagiarismReportRequest, HttpFileCatalog, PlagiarismService,
    SqliteReportStore, TaskAnalysisOrchestrator,
};

#[derive(Debug, Parser)]
#[command(name = "plagiarism-report")]
#[command(about = "Compute or fetch the cached plagiarism report of a task", long_about = None)]
struct Cli {
    /// Engine configuration file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Task to report on
    task_id: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match load_config(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config from {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => EngineConfig::default(),
    };

    logging::init_tracing(&config.logging);

    match run(&config, cli.task_id).await {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(
    config: &EngineConfig,
    task_id: String,
) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
    let base_url = config
        .catalog
        .base_url
        .as_deref()
        .ok_or("catalog.baseUrl must be configured")?;
    let db_path = config
        .database
        .resolved_path()
        .ok_or("could not determine database path")?;

    let db = Database::open(&db_path)?;
    let store = Arc::new(SqliteReportStore::new(db));
    let catalog = Arc::new(HttpFileCatalog::new(base_url, config.catalog.timeout())?);
    let extractor = Arc::new(DocumentExtractor::new(
        config.extractor.download_timeout(),
        config.extractor.max_document_bytes,
    )?);

    let orchestrator = TaskAnalysisOrchestrator::new(store, catalog, extractor, &config.analysis);
    let service = PlagiarismService::new(Arc::new(orchestrator));

    let response = service
        .get_plagiarism_report(GetPlagiarismReportRequest { task_id })
        .await?;

    Ok(serde_json::to_string_pretty(&response)?)
}
