//! Wire types for task intake and the evaluator callback.

use serde::{Deserialize, Serialize};

/// Named input value supplied with a task request.
///
/// The `url` field may carry a data URI whose base64 body the content
/// builder decodes (see [`crate::content`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    pub url: String,
}

/// Inbound body of `POST /ready`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRequest {
    pub email: String,
    pub secret: String,
    pub task: String,
    pub round: i64,
    pub nonce: String,
    pub brief: String,
    pub evaluation_url: String,
    #[serde(default)]
    pub checks: Vec<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

/// Response body for `POST /ready`, both acceptance and rejection.
#[derive(Debug, Serialize, Deserialize)]
pub struct ReadyResponse {
    pub status: String,
    pub message: String,
}

/// Completion payload delivered to the evaluator once a run finishes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyPayload {
    pub email: String,
    pub task: String,
    pub round: i64,
    pub nonce: String,
    pub repo_url: String,
    pub commit_sha: String,
    pub pages_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_request_defaults_optional_lists() {
        let req: TaskRequest = serde_json::from_value(serde_json::json!({
            "email": "student@example.com",
            "secret": "s3cret",
            "task": "markdown to html",
            "round": 1,
            "nonce": "abc123",
            "brief": "Convert the attached file",
            "evaluation_url": "https://evaluator.example.com/notify"
        }))
        .unwrap();

        assert!(req.checks.is_empty());
        assert!(req.attachments.is_empty());
        assert_eq!(req.round, 1);
    }

    #[test]
    fn notify_payload_serializes_all_fields() {
        let payload = NotifyPayload {
            email: "student@example.com".into(),
            task: "markdown to html".into(),
            round: 2,
            nonce: "abc123".into(),
            repo_url: "https://github.com/acct/markdown-to-html".into(),
            commit_sha: "deadbeef".into(),
            pages_url: "https://acct.github.io/markdown-to-html/".into(),
        };

        let value = serde_json::to_value(&payload).unwrap();
        for key in [
            "email",
            "task",
            "round",
            "nonce",
            "repo_url",
            "commit_sha",
            "pages_url",
        ] {
            assert!(value.get(key).is_some(), "missing key {}", key);
        }
    }
}
