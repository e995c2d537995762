//! `victus watch`: follow the live catalogs and report each sync-state
//! or size change until interrupted.

use serde::Serialize;
use victus_core::{CatalogSnapshot, CatalogStore, SyncState};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output;

/// One reported line: the state plus how much of each catalog is cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct WatchLine {
    state: SyncState,
    departments: usize,
    cities: usize,
    complexes: usize,
    administrators: usize,
}

impl From<&CatalogSnapshot> for WatchLine {
    fn from(snap: &CatalogSnapshot) -> Self {
        Self {
            state: snap.state,
            departments: snap.departments.len(),
            cities: snap.cities.len(),
            complexes: snap.complexes.len(),
            administrators: snap.administrators.len(),
        }
    }
}

fn render_line(line: &WatchLine, format: OutputFormat) -> Result<String, CliError> {
    match format {
        OutputFormat::Json | OutputFormat::JsonCompact => output::render_json(line, true),
        OutputFormat::Plain => Ok(line.state.to_string()),
        OutputFormat::Table | OutputFormat::Yaml => Ok(format!(
            "{:<10} departments={} cities={} complexes={} administrators={}",
            line.state, line.departments, line.cities, line.complexes, line.administrators
        )),
    }
}

pub async fn handle(
    store: &CatalogStore,
    args: WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let mut changes = store.subscribe();

    // A failed first hydration leaves the store degraded and retrying.
    let starter = store.clone();
    tokio::spawn(async move {
        if let Err(err) = starter.start().await {
            tracing::info!(error = %err, "initial hydration failed");
        }
    });

    let mut last = WatchLine::from(changes.current());
    output::print_output(&render_line(&last, global.output)?, global.quiet);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::debug!("interrupted");
                break;
            }
            next = changes.changed() => {
                let Some(snap) = next else { break };
                let line = WatchLine::from(&snap);
                if line != last {
                    output::print_output(&render_line(&line, global.output)?, global.quiet);
                    last = line;
                }
                if args.until_live && snap.state == SyncState::Live {
                    break;
                }
            }
        }
    }

    store.shutdown();
    Ok(())
}
