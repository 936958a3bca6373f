use std::path::PathBuf;

use anyhow::{anyhow, Result};
use tracing::{info, warn};

use quake_application::queries::{build_event_table, count_matching_events, ExportRequest};
use quake_application::{cancel_pair, CancelHandle};
use quake_infrastructure::{write_table_file, OutputFormat};

use crate::context::AppContext;

pub struct RunOptions {
    pub request: ExportRequest,
    pub output: Option<PathBuf>,
    pub format: Option<OutputFormat>,
    pub count_only: bool,
}

pub async fn run(options: RunOptions) -> Result<()> {
    let context = AppContext::new().await?;
    let state = context.state;

    let (handle, cancel) = cancel_pair();
    tokio::spawn(watch_shutdown(handle));

    if options.count_only {
        let count = count_matching_events(&state, options.request.params.clone(), &cancel).await?;
        info!("{count} events match the query");
        println!("{count}");
        return Ok(());
    }

    let output = options
        .output
        .ok_or_else(|| anyhow!("an output file is required unless --count is given"))?;

    let table = build_event_table(&state, &options.request, &cancel).await?;
    if table.is_empty() {
        info!("no events matched the query; nothing written");
        return Ok(());
    }

    write_table_file(&table, &output, options.format)?;
    info!(
        "wrote {} rows x {} columns to {}",
        table.row_count(),
        table.column_count(),
        output.display()
    );
    Ok(())
}

async fn watch_shutdown(handle: CancelHandle) {
    shutdown_signal().await;
    warn!("cancellation requested, aborting outstanding requests");
    handle.cancel();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).expect("sigterm handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
