//! Scheduled sync cycles for `mpxsync watch`.
//!
//! One cycle runs at startup, then one per tick of the cron schedule. At most
//! one cycle is in flight; a tick that fires while a cycle is still running
//! is skipped.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use mpxsync_gateway::{MoneypexClient, TransferError};
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::cycle::{self, CycleOptions, ExportScope};

struct WatchState {
    client: MoneypexClient,
    updates_path: Option<PathBuf>,
    scope: ExportScope,
    in_flight: Mutex<()>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TriggerOutcome {
    Completed,
    Failed,
    Skipped,
}

/// Runs sync cycles on `schedule` until ctrl-c or SIGTERM.
///
/// # Errors
///
/// Returns an error if the schedule is not a valid cron expression or the
/// scheduler cannot be started or stopped. Cycle failures are logged, not
/// returned.
pub(crate) async fn run_watch(
    client: MoneypexClient,
    schedule: &str,
    updates_path: Option<PathBuf>,
    scope: ExportScope,
) -> anyhow::Result<()> {
    let state = Arc::new(WatchState {
        client,
        updates_path,
        scope,
        in_flight: Mutex::new(()),
    });

    let mut scheduler = JobScheduler::new()
        .await
        .context("failed to create scheduler")?;

    let job_state = Arc::clone(&state);
    let job = Job::new_async(schedule, move |_uuid, _lock| {
        let state = Arc::clone(&job_state);
        Box::pin(async move {
            trigger(&state, "schedule").await;
        })
    })
    .with_context(|| format!("invalid poll schedule {schedule:?}"))?;

    scheduler
        .add(job)
        .await
        .context("failed to register sync job")?;
    scheduler
        .start()
        .await
        .context("failed to start scheduler")?;
    tracing::info!(schedule, ?scope, "watching for inventory changes");

    let startup_state = Arc::clone(&state);
    let startup = tokio::spawn(async move {
        trigger(&startup_state, "startup").await;
    });

    shutdown_signal().await;
    startup.abort();
    scheduler
        .shutdown()
        .await
        .context("failed to stop scheduler")?;
    tracing::info!("watch stopped");
    Ok(())
}

async fn trigger(state: &WatchState, source: &'static str) -> TriggerOutcome {
    let Ok(_guard) = state.in_flight.try_lock() else {
        tracing::warn!(source, "previous sync cycle still running; skipping trigger");
        return TriggerOutcome::Skipped;
    };

    let updates = match cycle::load_updates(state.updates_path.as_deref()) {
        Ok(updates) => updates,
        Err(e) => {
            tracing::error!(source, error = %format!("{e:#}"), "failed to load local updates");
            return TriggerOutcome::Failed;
        }
    };

    let options = CycleOptions {
        scope: state.scope,
        output: None,
    };
    match cycle::run_cycle(&state.client, &updates, &options).await {
        Ok(report) => {
            tracing::info!(
                source,
                cycle_id = %report.cycle_id,
                rows = report.rows_exported,
                "scheduled sync cycle finished"
            );
            TriggerOutcome::Completed
        }
        Err(e) => {
            tracing::error!(source, error = %format!("{e:#}"), "sync cycle failed");
            if e
                .downcast_ref::<TransferError>()
                .is_some_and(TransferError::is_session_rejected)
            {
                tracing::warn!("Moneypex rejected the session; refresh MONEYPEX_SESSION_COOKIE");
            }
            TriggerOutcome::Failed
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, stopping watch");
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn state(server: &MockServer, updates_path: Option<PathBuf>) -> WatchState {
        let client = MoneypexClient::new(&server.uri(), "session=test", 5, 5, "mpxsync-test/0.1")
            .expect("client construction should not fail");
        WatchState {
            client,
            updates_path,
            scope: ExportScope::Catalog,
            in_flight: Mutex::new(()),
        }
    }

    #[tokio::test]
    async fn trigger_skips_while_cycle_in_flight() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/Product/ExportProducts"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let state = state(&server, None);
        let _held = state.in_flight.lock().await;
        assert_eq!(trigger(&state, "test").await, TriggerOutcome::Skipped);
    }

    #[tokio::test]
    async fn failed_cycle_is_reported_and_releases_guard() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/Product/ExportProducts"))
            .respond_with(ResponseTemplate::new(503))
            .expect(2)
            .mount(&server)
            .await;

        let state = state(&server, None);
        assert_eq!(trigger(&state, "test").await, TriggerOutcome::Failed);
        assert_eq!(trigger(&state, "test").await, TriggerOutcome::Failed);
    }

    #[tokio::test]
    async fn unreadable_updates_file_fails_before_fetch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/Product/ExportProducts"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let missing = std::env::temp_dir().join(format!(
            "mpxsync-watch-missing-{}.json",
            uuid::Uuid::new_v4()
        ));
        let state = state(&server, Some(missing));
        assert_eq!(trigger(&state, "test").await, TriggerOutcome::Failed);
    }
}
