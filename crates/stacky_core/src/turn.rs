use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry of in-memory chat history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatTurn {
    Request {
        #[serde(skip_serializing_if = "Option::is_none")]
        command: Option<String>,
        prompt: String,
        timestamp: DateTime<Utc>,
    },
    Response {
        markdown: String,
        timestamp: DateTime<Utc>,
    },
}

impl ChatTurn {
    pub fn request(command: Option<String>, prompt: impl Into<String>) -> Self {
        ChatTurn::Request {
            command,
            prompt: prompt.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn response(markdown: impl Into<String>) -> Self {
        ChatTurn::Response {
            markdown: markdown.into(),
            timestamp: Utc::now(),
        }
    }
}
