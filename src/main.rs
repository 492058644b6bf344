mod cli;
mod error;
mod report;

use crate::cli::{Cli, Command};
use crate::error::{ErrorKind, Result};
use crate::report::Narrator;
use clap::Parser;
use exn::ResultExt;
use futures::StreamExt;
use photopress_catalog::{Database, Repository, Scope};
use photopress_config::Config;
use photopress_pipeline::{Context, RunEvent};
use photopress_storage::backend::S3Backend;
use photopress_storage::{BackendHandle, LocationMap};
use std::io;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return match err.kind() {
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        },
    };

    // Logs go to stderr so stdout carries only the report.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    match execute(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Fatal error: {err:?}");
            ExitCode::FAILURE
        },
    }
}

async fn execute(cli: Cli) -> Result<()> {
    let config = photopress_config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    debug!(?config, "configuration loaded");

    let db = Database::connect(&config.database_url).await.or_raise(|| ErrorKind::Catalog)?;
    let result = match cli.command {
        Command::Compress { scope, dry_run } => compress(&config, &db, scope.into(), dry_run).await,
        Command::Verify { project } => verify(&db, project.map_or(Scope::All, Scope::Project)).await,
    };
    // Released on every path, including a run aborted halfway.
    db.close().await;
    result
}

async fn compress(config: &Config, db: &Database, scope: Scope, dry_run: bool) -> Result<()> {
    let storage = &config.storage;
    let locations = match &storage.base_url {
        Some(url) => LocationMap::new(url.as_str()),
        None => LocationMap::for_s3_bucket(&storage.bucket),
    }
    .or_raise(|| ErrorKind::Storage)?;
    let backend: BackendHandle = Arc::new(S3Backend::new(
        "s3",
        &storage.bucket,
        &storage.region,
        storage.endpoint.as_deref(),
        &storage.key_id,
        &storage.key_secret,
    ));
    let ctx = Context::new(backend, Repository::new(db.pool().clone(), dry_run), locations);
    info!(?scope, dry_run, bucket = %storage.bucket, "starting compression run");

    let mut narrator = Narrator::new(io::stdout(), dry_run);
    narrator.banner().or_raise(|| ErrorKind::Output)?;
    let mut events = std::pin::pin!(photopress_pipeline::run(&ctx, &scope));
    while let Some(event) = events.next().await {
        let event = event.or_raise(|| ErrorKind::Run)?;
        if let RunEvent::Complete(stats) = &event {
            info!(
                processed = stats.processed,
                skipped = stats.skipped,
                failed = stats.failed,
                "compression run complete"
            );
        }
        narrator.event(&event).or_raise(|| ErrorKind::Output)?;
    }
    Ok(())
}

async fn verify(db: &Database, scope: Scope) -> Result<()> {
    let catalog = Repository::new(db.pool().clone(), true);
    let audit = photopress_pipeline::verify(&catalog, &scope).await.or_raise(|| ErrorKind::Verify)?;
    report::audit(&mut io::stdout(), &scope, &audit).or_raise(|| ErrorKind::Output)
}
