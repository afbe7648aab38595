//! Offline index maintenance: rebuild the fingerprint indices from a corpus
//! directory, or drop a single document from them.
//!
//! ```text
//! codecheck-rebuild rebuild --corpus-dir ./corpus --index-path ./data/index
//! codecheck-rebuild delete --index-path ./data/index 42
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use codecheck::fs_source::FsDocumentSource;
use codecheck::{BackendConfig, Index, IndexBuilder, RebuildConfig};

#[derive(Parser)]
#[command(name = "codecheck-rebuild", about = "Rebuild or repair the duplicate-check index")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Index every `<id>.txt` document under `--corpus-dir` newer than the
    /// stored cursor (or `--from`, if given), up to `--upto`.
    Rebuild {
        #[arg(long)]
        corpus_dir: PathBuf,
        #[arg(long)]
        index_path: PathBuf,
        #[arg(long)]
        from: Option<u64>,
        #[arg(long)]
        upto: Option<u64>,
        #[arg(long, default_value_t = 100)]
        batch_size: usize,
        #[arg(long, default_value_t = 1200)]
        max_fps_per_doc: usize,
    },
    /// Remove a single document's fingerprints from the index.
    Delete {
        #[arg(long)]
        index_path: PathBuf,
        order_id: u64,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "codecheck-rebuild failed");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Rebuild { corpus_dir, index_path, from, upto, batch_size, max_fps_per_doc } => {
            let index = Index::open(&BackendConfig::redb(&index_path))?;
            let source = FsDocumentSource::new(&corpus_dir);
            let config = RebuildConfig { batch_size, max_fps_per_doc, upto, ..Default::default() };
            let builder = IndexBuilder::new(&index, &source, config);

            let stats = match from {
                Some(after_id) => builder.rebuild_from_cursor(after_id)?,
                None => builder.rebuild()?,
            };

            source.save_cursor(stats.last_doc_id)?;
            index.flush()?;

            tracing::info!(
                documents_processed = stats.documents_processed,
                documents_skipped_empty = stats.documents_skipped_empty,
                fingerprints_written = stats.fingerprints_written,
                last_doc_id = stats.last_doc_id,
                "rebuild complete"
            );
            Ok(())
        }
        Command::Delete { index_path, order_id } => {
            let index = Index::open(&BackendConfig::redb(&index_path))?;
            index.delete_document(order_id)?;
            index.flush()?;
            tracing::info!(order_id, "document removed from index");
            Ok(())
        }
    }
}
