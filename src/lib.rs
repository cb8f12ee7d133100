//! Webhook-triggered task publisher.
//!
//! On an authenticated `POST /ready` the server schedules a background
//! pipeline that materializes a fixed set of deliverable files, force-pushes
//! them to a per-task repository, and reports the artifact locations to the
//! caller's evaluator URL.
//!
//! ## Module structure
//!
//! - `config`: explicit runtime configuration
//! - `types`: wire types for intake and callback
//! - `content`: deliverable file set construction
//! - `publish`: working-copy materialization
//! - `git_sync`: clone/init, commit, force-push protocol
//! - `notifier`: evaluator callback with bounded retries
//! - `registry`: in-memory run state
//! - `pipeline`: end-to-end run orchestration
//! - `server`: axum HTTP surface

pub mod config;
pub mod content;
pub mod git_sync;
pub mod notifier;
pub mod pipeline;
pub mod publish;
pub mod registry;
pub mod server;
pub mod types;

pub use config::AppConfig;
pub use registry::{RunRecord, RunRegistry, RunState};
pub use server::{build_router, run_server, AppState};
pub use types::{Attachment, NotifyPayload, ReadyResponse, TaskRequest};
