//! Runtime configuration for stacky

use std::path::PathBuf;

use stacky_constant::defaults;

#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
    /// Chat model id sent to the provider
    pub model: String,
    /// OpenAI-compatible endpoint
    pub base_url: String,
    /// Frames rendered into the debug context
    pub max_stacks: usize,
    /// Variables listed for the active frame
    pub max_vars: usize,
    /// Overrides the model-reported input budget
    pub max_input_tokens: Option<u32>,
    /// Response token cap
    pub max_tokens: u32,
    /// Paths under this root are shown relative to it
    pub workspace_root: PathBuf,
}

impl RuntimeConfig {
    pub fn new(workspace_root: PathBuf) -> Self {
        Self {
            model: defaults::DEFAULT_MODEL.to_string(),
            base_url: defaults::DEFAULT_BASE_URL.to_string(),
            max_stacks: defaults::MAX_STACKS,
            max_vars: defaults::MAX_VARS,
            max_input_tokens: None,
            max_tokens: defaults::DEFAULT_MAX_TOKENS,
            workspace_root,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// `0` keeps the current value.
    pub fn with_max_stacks(mut self, max_stacks: usize) -> Self {
        if max_stacks > 0 {
            self.max_stacks = max_stacks;
        }
        self
    }

    /// `0` keeps the current value.
    pub fn with_max_vars(mut self, max_vars: usize) -> Self {
        if max_vars > 0 {
            self.max_vars = max_vars;
        }
        self
    }

    pub fn with_max_input_tokens(mut self, tokens: u32) -> Self {
        self.max_input_tokens = Some(tokens);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Load configuration from environment variables
    pub fn from_env(workspace_root: PathBuf) -> Self {
        Self::from_lookup(workspace_root, |key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable source.
    pub fn from_lookup<F>(workspace_root: PathBuf, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let workspace_root = lookup("STACKY_WORKSPACE")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(workspace_root);
        let mut config = Self::new(workspace_root);

        if let Some(model) = lookup("STACKY_MODEL").filter(|s| !s.trim().is_empty()) {
            config.model = model.trim().to_string();
        }

        if let Some(url) = lookup("STACKY_BASE_URL").filter(|s| !s.trim().is_empty()) {
            config.base_url = url.trim().to_string();
        }

        if let Some(val) = positive(lookup("STACKY_DEBUG_CONTEXT_MAX_STACKS")) {
            config.max_stacks = val;
        }

        if let Some(val) = positive(lookup("STACKY_DEBUG_CONTEXT_MAX_VARS")) {
            config.max_vars = val;
        }

        if let Some(val) = positive(lookup("STACKY_MAX_INPUT_TOKENS")) {
            config.max_input_tokens = u32::try_from(val).ok();
        }

        if let Some(val) = positive(lookup("STACKY_MAX_TOKENS")) {
            if let Ok(val) = u32::try_from(val) {
                config.max_tokens = val;
            }
        }

        config
    }
}

/// Parse a strictly positive integer. Zero, negatives and garbage are ignored.
fn positive(value: Option<String>) -> Option<usize> {
    value?.trim().parse::<usize>().ok().filter(|v| *v > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_map(vars: &[(&str, &str)]) -> RuntimeConfig {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        RuntimeConfig::from_lookup(PathBuf::from("/repo"), |k| map.get(k).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = from_map(&[]);
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.base_url, "https://api.openai.com/v1");
        assert_eq!(config.max_stacks, 5);
        assert_eq!(config.max_vars, 10);
        assert_eq!(config.max_input_tokens, None);
        assert_eq!(config.max_tokens, 2048);
        assert_eq!(config.workspace_root, PathBuf::from("/repo"));
    }

    #[test]
    fn test_env_overrides() {
        let config = from_map(&[
            ("STACKY_MODEL", "gpt-4o-mini"),
            ("STACKY_DEBUG_CONTEXT_MAX_STACKS", "3"),
            ("STACKY_DEBUG_CONTEXT_MAX_VARS", " 20 "),
            ("STACKY_MAX_INPUT_TOKENS", "8000"),
            ("STACKY_WORKSPACE", "/work"),
        ]);
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.max_stacks, 3);
        assert_eq!(config.max_vars, 20);
        assert_eq!(config.max_input_tokens, Some(8000));
        assert_eq!(config.workspace_root, PathBuf::from("/work"));
    }

    #[test]
    fn test_zero_and_garbage_fall_back() {
        let config = from_map(&[
            ("STACKY_DEBUG_CONTEXT_MAX_STACKS", "0"),
            ("STACKY_DEBUG_CONTEXT_MAX_VARS", "lots"),
            ("STACKY_MAX_INPUT_TOKENS", "-1"),
        ]);
        assert_eq!(config.max_stacks, 5);
        assert_eq!(config.max_vars, 10);
        assert_eq!(config.max_input_tokens, None);
    }

    #[test]
    fn test_builder_ignores_zero() {
        let config = RuntimeConfig::new(PathBuf::from("."))
            .with_max_stacks(0)
            .with_max_vars(2)
            .with_max_input_tokens(1000);
        assert_eq!(config.max_stacks, 5);
        assert_eq!(config.max_vars, 2);
        assert_eq!(config.max_input_tokens, Some(1000));
    }
}
