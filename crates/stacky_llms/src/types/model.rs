use serde::{Deserialize, Serialize};

/// What a provider knows about a model's limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    /// Total tokens shared by prompt and completion, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_window: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

impl ModelInfo {
    pub fn unknown(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            context_window: None,
            max_output_tokens: None,
        }
    }
}

// (prefix, context window, output). Longest matching prefix wins.
const KNOWN_MODELS: &[(&str, u32, u32)] = &[
    ("gpt-4o-mini", 128_000, 16_384),
    ("gpt-4o", 128_000, 16_384),
    ("gpt-4.1", 1_047_576, 32_768),
    ("gpt-4-turbo", 128_000, 4_096),
    ("gpt-4", 8_192, 8_192),
    ("gpt-3.5-turbo", 16_385, 4_096),
    ("o1", 200_000, 100_000),
    ("o3", 200_000, 100_000),
    ("o4-mini", 200_000, 100_000),
];

/// Look up a model by id (dated snapshots such as `gpt-4o-2024-08-06` match
/// their family).
pub fn known_model(id: &str) -> ModelInfo {
    KNOWN_MODELS
        .iter()
        .filter(|(prefix, _, _)| id.starts_with(prefix))
        .max_by_key(|(prefix, _, _)| prefix.len())
        .map(|(_, window, output)| ModelInfo {
            id: id.to_string(),
            context_window: Some(*window),
            max_output_tokens: Some(*output),
        })
        .unwrap_or_else(|| ModelInfo::unknown(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_model_longest_prefix() {
        assert_eq!(known_model("gpt-4o-mini").context_window, Some(128_000));
        assert_eq!(known_model("gpt-4").context_window, Some(8_192));
        assert_eq!(
            known_model("gpt-4o-2024-08-06").context_window,
            Some(128_000)
        );
    }

    #[test]
    fn test_unknown_model() {
        let info = known_model("llama3:8b");
        assert_eq!(info.id, "llama3:8b");
        assert_eq!(info.context_window, None);
    }
}
