//! End-to-end run orchestration.
//!
//! One call per accepted request: build the file set, publish it into the
//! working copy, sync the per-task remote, notify the evaluator. Runs on a
//! spawned task after the HTTP acknowledgment; concurrent runs for the same
//! task name race on the shared working directory with no mutual exclusion.

use std::sync::Arc;

use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::registry::RunState;
use crate::server::AppState;
use crate::types::{NotifyPayload, TaskRequest};
use crate::{content, git_sync, notifier, publish};

/// Run the full pipeline for one task request.
///
/// Never returns an error to the spawner: filesystem and other unexpected
/// failures are logged and recorded on the run. The requester already
/// received the 200 acknowledgment and is not informed.
pub async fn run_task(state: Arc<AppState>, run_id: Uuid, task: TaskRequest) {
    let slug = AppConfig::repo_slug(&task.task);
    info!("--- starting task {} (round {}) ---", slug, task.round);

    if let Err(e) = execute(&state, run_id, &task, &slug).await {
        error!("task {} run {} failed: {:#}", slug, run_id, e);
        state.registry.fail(run_id, format!("{e:#}"));
        return;
    }
    info!("--- task {} done ---", slug);
}

async fn execute(
    state: &AppState,
    run_id: Uuid,
    task: &TaskRequest,
    slug: &str,
) -> anyhow::Result<()> {
    let config = &state.config;
    let registry = &state.registry;

    let files = content::build_files(task);
    registry.advance(run_id, RunState::FilesBuilt);

    let prep = git_sync::prepare_workdir(config, slug).await;
    publish::publish_files(&files, &config.task_dir(slug))?;
    registry.advance(run_id, RunState::PublishedLocal);

    let report = git_sync::commit_and_push(config, slug, task.round).await;
    let failed = prep.iter().filter(|s| !s.ok).count() + report.failed_steps().len();
    if failed > 0 {
        warn!("task {}: {} sync steps reported failure", slug, failed);
    }
    registry.advance(run_id, RunState::SyncedRemote);

    let payload = NotifyPayload {
        email: task.email.clone(),
        task: task.task.clone(),
        round: task.round,
        nonce: task.nonce.clone(),
        repo_url: config.repo_url(slug),
        commit_sha: report.commit_sha,
        pages_url: config.pages_url(slug),
    };
    if notifier::notify_evaluator(&state.client, &task.evaluation_url, &payload).await {
        registry.advance(run_id, RunState::Notified);
    }
    registry.advance(run_id, RunState::Done);

    Ok(())
}
