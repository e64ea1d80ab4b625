use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptRole {
    System,
    User,
    Assistant,
}

/// One prioritized unit of model input.
///
/// Higher `priority` survives longer when the budget is exceeded. Blocks with
/// `truncatable` set may be cut at a whitespace boundary instead of dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptBlock {
    pub role: PromptRole,
    pub priority: u32,
    pub text: String,
    #[serde(default)]
    pub truncatable: bool,
    /// Leading bytes (a label) that a shortened block must extend past.
    #[serde(default)]
    pub keep: usize,
}

impl PromptBlock {
    pub fn new(role: PromptRole, priority: u32, text: impl Into<String>) -> Self {
        Self {
            role,
            priority,
            text: text.into(),
            truncatable: false,
            keep: 0,
        }
    }

    pub fn user(priority: u32, text: impl Into<String>) -> Self {
        Self::new(PromptRole::User, priority, text)
    }

    /// Allow this block to be shortened at word boundaries.
    pub fn breakable(mut self) -> Self {
        self.truncatable = true;
        self
    }

    /// Like [`breakable`](Self::breakable), but a cut must leave something
    /// after the first `keep` bytes.
    pub fn breakable_after(self, keep: usize) -> Self {
        Self {
            keep: keep.min(self.text.len()),
            ..self.breakable()
        }
    }
}
