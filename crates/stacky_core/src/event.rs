use serde::{Deserialize, Serialize};

/// Events a turn emits to whatever renders the answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TurnEvent {
    Progress { message: String },

    /// User-visible notice that is not a failure (no session, no model, usage help).
    Notice { message: String },

    Markdown { text: String },

    Done,

    Error { error: String },
}

impl TurnEvent {
    pub fn progress(message: impl Into<String>) -> Self {
        TurnEvent::Progress {
            message: message.into(),
        }
    }

    pub fn notice(message: impl Into<String>) -> Self {
        TurnEvent::Notice {
            message: message.into(),
        }
    }

    pub fn markdown(text: impl Into<String>) -> Self {
        TurnEvent::Markdown { text: text.into() }
    }

    pub fn done() -> Self {
        TurnEvent::Done
    }

    pub fn error(error: impl Into<String>) -> Self {
        TurnEvent::Error {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let json = serde_json::to_value(TurnEvent::markdown("hi")).unwrap();
        assert_eq!(json["type"], "markdown");
        assert_eq!(json["text"], "hi");

        let json = serde_json::to_value(TurnEvent::done()).unwrap();
        assert_eq!(json["type"], "done");
    }
}
