//! Records exchanged with the mailbox REST backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Summary row returned by `GET /mailbox/{name}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageHeader {
    #[serde(default)]
    pub mailbox: String,
    pub id: String,
    pub from: String,
    #[serde(default)]
    pub to: Vec<String>,
    pub subject: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub size: u64,
    pub seen: bool,
}

/// Full message returned by `GET /message/{mailbox}/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub mailbox: String,
    pub id: String,
    pub from: String,
    #[serde(default)]
    pub to: Vec<String>,
    pub subject: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub size: u64,
    pub seen: bool,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub html: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

/// Attachment metadata; the content is served from a static `/serve/...` link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: String,
    pub filename: String,
    #[serde(rename = "content-type")]
    pub content_type: String,
}
