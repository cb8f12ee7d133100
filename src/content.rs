//! Deliverable file set construction.
//!
//! Builds the fixed catalogue of files published for every task. The only
//! input-dependent file is `uid.txt`, taken from a base64 attachment; all
//! other content is identical across requests.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use indexmap::IndexMap;
use serde_json::json;

use crate::types::TaskRequest;

/// Content of `uid.txt` when no uid attachment was supplied.
pub const UID_NOT_PROVIDED: &str = "UID_NOT_PROVIDED";

/// Content of `uid.txt` when the attachment could not be decoded.
pub const UID_ERROR: &str = "UID_ERROR";

/// Case-insensitive attachment name prefix denoting the uid.
const UID_PREFIX: &str = "uid";

/// Files linked from the generated index page, in display order.
const INDEX_LINKS: [&str; 7] = [
    "ashravan.txt",
    "dilemma.json",
    "about.md",
    "pelican.svg",
    "restaurant.json",
    "prediction.json",
    "uid.txt",
];

/// Extract the uid from the request attachments.
///
/// The value is expected to be a data URI; the segment after the first
/// comma is base64-decoded to UTF-8. A malformed value degrades to
/// [`UID_ERROR`] rather than failing the run. When several attachments
/// match, the last one wins.
fn decode_uid(task: &TaskRequest) -> String {
    let mut uid = String::new();
    for attachment in &task.attachments {
        if !attachment.name.to_lowercase().starts_with(UID_PREFIX) {
            continue;
        }
        uid = match attachment.url.split(',').nth(1) {
            Some(body) => BASE64
                .decode(body)
                .ok()
                .and_then(|bytes| String::from_utf8(bytes).ok())
                .unwrap_or_else(|| UID_ERROR.to_string()),
            None => UID_ERROR.to_string(),
        };
    }
    if uid.is_empty() {
        UID_NOT_PROVIDED.to_string()
    } else {
        uid
    }
}

fn pretty(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).expect("static json value")
}

/// Build the complete file set for a task request.
///
/// Pure function: no filesystem or network access. Filenames are identical
/// for every request; only the `uid.txt` content depends on the input.
pub fn build_files(task: &TaskRequest) -> IndexMap<String, String> {
    let mut files = IndexMap::new();

    files.insert("about.md".to_string(), "Curious Focused Resilient".to_string());
    files.insert("uid.txt".to_string(), decode_uid(task));
    files.insert(
        "LICENSE".to_string(),
        "MIT License\n\nCopyright (c) 2025".to_string(),
    );
    files.insert(
        "ashravan.txt".to_string(),
        "Ashravan woke to a new dawn, aware of every choice reborn...".to_string(),
    );
    files.insert(
        "dilemma.json".to_string(),
        pretty(&json!({
            "people": 2,
            "case_1": {"swerve": true, "reason": "minimize loss"},
            "case_2": {"swerve": false, "reason": "protect child"},
        })),
    );
    files.insert(
        "restaurant.json".to_string(),
        pretty(&json!({
            "city": "Bangalore",
            "lat": 12.97,
            "long": 77.59,
            "name": "Truffles",
            "what_to_eat": "Burgers",
        })),
    );
    files.insert(
        "prediction.json".to_string(),
        pretty(&json!({"rate": 0.045, "reason": "likely Fed path"})),
    );
    files.insert(
        "pelican.svg".to_string(),
        "<svg xmlns='http://www.w3.org/2000/svg'><text x='10' y='20'>Pelican</text></svg>"
            .to_string(),
    );

    let links: String = INDEX_LINKS
        .iter()
        .map(|f| format!("<li><a href='{f}'>{f}</a></li>"))
        .collect();
    files.insert(
        "index.html".to_string(),
        format!("<html><body><h1>Generated Files</h1><ul>{links}</ul></body></html>"),
    );

    files
}
