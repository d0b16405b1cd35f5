use anyhow::Context;
use clap::Parser;
use corpus_ingest::{
    config, ingest::IngestService, ledger::ChecksumLedger, logging, store::HttpChunkStore,
};
use std::path::PathBuf;

/// Ingest a directory of PDF sources into the external chunk store.
#[derive(Parser, Debug)]
#[command(name = "corpus-ingest", version, about)]
struct Args {
    /// Directory containing PDF files (non-recursive).
    #[arg(long, default_value = "./pdfs")]
    pdf_dir: PathBuf,
    /// Reprocess files even when their checksum is unchanged.
    #[arg(long)]
    force: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    config::init_config();
    logging::init_tracing();

    let config = config::get_config();
    let store = HttpChunkStore::new().context("Failed to initialize store client")?;
    let ledger = ChecksumLedger::load(&config.ledger_path);
    let mut service = IngestService::new(Box::new(store), ledger, config.options.clone());

    let stats = service.run_batch(&args.pdf_dir, args.force).await;

    tracing::info!(
        processed = stats.files_processed,
        skipped = stats.files_skipped,
        chunks = stats.total_chunks,
        average = format!("{:.1}", stats.average_chunks_per_file()),
        "Ingestion summary"
    );
    for error in &stats.errors {
        tracing::error!(file = %error.file, message = %error.message, "File failed");
    }

    if !stats.errors.is_empty() {
        anyhow::bail!("{} file(s) failed during ingestion", stats.errors.len());
    }
    Ok(())
}
