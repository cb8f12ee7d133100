//! Repository synchronizer.
//!
//! Drives the `git` binary to make the per-task remote mirror the current
//! file set: clone or init the working copy, stage, commit, rename the
//! primary branch, force-push. Every step is recorded as a [`StepOutcome`];
//! a non-zero exit is logged and tolerated under the configured
//! [`StepPolicy`], so a failed commit still ends in a push attempt.

use std::path::Path;

use tokio::process::Command;
use tracing::warn;

use crate::config::{AppConfig, PRIMARY_BRANCH};

/// What to do when an individual git step fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepPolicy {
    /// Log the failure and run the remaining steps anyway.
    ContinueOnFailure,
    /// Stop the protocol at the first failing step.
    AbortOnFailure,
}

impl StepPolicy {
    fn continues(self) -> bool {
        matches!(self, StepPolicy::ContinueOnFailure)
    }
}

/// Policy applied to the sync protocol. Partial failures (an empty commit,
/// a missing remote) are tolerated and the force-push is still attempted.
pub const STEP_POLICY: StepPolicy = StepPolicy::ContinueOnFailure;

/// Result of one external git invocation.
#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub step: String,
    pub ok: bool,
    /// Stderr (or spawn error) when the step failed.
    pub detail: String,
}

/// Outcomes of the commit-and-push phase plus the resulting commit id.
#[derive(Debug, Default)]
pub struct SyncReport {
    pub steps: Vec<StepOutcome>,
    /// `git rev-parse HEAD` after the push; empty when nothing was committed.
    pub commit_sha: String,
}

impl SyncReport {
    pub fn failed_steps(&self) -> Vec<&StepOutcome> {
        self.steps.iter().filter(|s| !s.ok).collect()
    }
}

/// Run one git command in `cwd`, capturing output.
///
/// `step` is a short label used for logs and outcome records; argument
/// lists can embed the authenticated remote URL, which must not be echoed.
pub async fn run_git(step: &str, args: &[&str], cwd: &Path) -> StepOutcome {
    let output = Command::new("git")
        .args(args)
        .env("GIT_TERMINAL_PROMPT", "0")
        .current_dir(cwd)
        .output()
        .await;

    match output {
        Ok(out) if out.status.success() => StepOutcome {
            step: step.to_string(),
            ok: true,
            detail: String::new(),
        },
        Ok(out) => {
            let stderr = String::from_utf8_lossy(&out.stderr).trim().to_string();
            warn!("git {} failed: {}", step, stderr);
            StepOutcome {
                step: step.to_string(),
                ok: false,
                detail: stderr,
            }
        }
        Err(e) => {
            warn!("git {} could not run: {}", step, e);
            StepOutcome {
                step: step.to_string(),
                ok: false,
                detail: e.to_string(),
            }
        }
    }
}

/// Prepare the working copy for a task: drop any stale copy, then clone the
/// remote. When the clone fails (typically because the remote does not
/// exist yet) fall back to a fresh `git init` in the working directory with
/// `origin` pointed at the remote so the later push has a target.
pub async fn prepare_workdir(config: &AppConfig, slug: &str) -> Vec<StepOutcome> {
    let dir = config.task_dir(slug);
    let remote = config.remote_url(slug);
    let mut steps = Vec::new();

    if dir.exists() {
        let outcome = match std::fs::remove_dir_all(&dir) {
            Ok(()) => StepOutcome {
                step: "clean".to_string(),
                ok: true,
                detail: String::new(),
            },
            Err(e) => {
                warn!("removing stale working copy {} failed: {}", dir.display(), e);
                StepOutcome {
                    step: "clean".to_string(),
                    ok: false,
                    detail: e.to_string(),
                }
            }
        };
        steps.push(outcome);
    }

    let dir_arg = dir.display().to_string();
    let clone = run_git("clone", &["clone", &remote, &dir_arg], &config.tasks_root).await;
    let cloned = clone.ok;
    steps.push(clone);

    if !cloned {
        if let Err(e) = std::fs::create_dir_all(&dir) {
            warn!("creating {} failed: {}", dir.display(), e);
            steps.push(StepOutcome {
                step: "init".to_string(),
                ok: false,
                detail: e.to_string(),
            });
            return steps;
        }
        steps.push(run_git("init", &["init"], &dir).await);
        steps.push(run_git("remote-add", &["remote", "add", "origin", &remote], &dir).await);
    }

    steps
}

/// Stage the working copy, commit with the round message, rename the
/// primary branch, and force-push, then read back the commit id for the
/// evaluator payload.
pub async fn commit_and_push(config: &AppConfig, slug: &str, round: i64) -> SyncReport {
    let dir = config.task_dir(slug);
    let message = format!("Round {} update", round);
    let mut report = SyncReport::default();

    let steps: [(&str, Vec<&str>); 4] = [
        ("add", vec!["add", "."]),
        ("commit", vec!["commit", "-m", message.as_str()]),
        ("branch", vec!["branch", "-M", PRIMARY_BRANCH]),
        ("push", vec!["push", "-u", "origin", PRIMARY_BRANCH, "--force"]),
    ];

    for (step, args) in steps {
        let outcome = run_git(step, &args, &dir).await;
        let ok = outcome.ok;
        report.steps.push(outcome);
        if !ok && !STEP_POLICY.continues() {
            break;
        }
    }

    report.commit_sha = head_sha(&dir).await.unwrap_or_default();
    report
}

/// Current commit id of the working copy, if any.
pub async fn head_sha(dir: &Path) -> Option<String> {
    let out = Command::new("git")
        .args(["rev-parse", "HEAD"])
        .current_dir(dir)
        .output()
        .await
        .ok()?;
    if !out.status.success() {
        return None;
    }
    Some(String::from_utf8_lossy(&out.stdout).trim().to_string())
}
