//! Request-scoped rendering units of the debug context.

use serde::{Deserialize, Serialize};

use crate::debug::Variable;

/// A clipped, line-numbered excerpt of one source file.
///
/// `start_line`/`end_line` are 1-based and always inside `[1, line_count]`.
/// A window whose target lies past the end of the file is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeWindow {
    pub start_line: usize,
    pub end_line: usize,
    pub rendered_text: String,
}

impl CodeWindow {
    pub fn is_empty(&self) -> bool {
        self.rendered_text.is_empty()
    }

    pub fn line_count(&self) -> usize {
        if self.end_line < self.start_line {
            0
        } else {
            self.end_line - self.start_line + 1
        }
    }
}

/// Per-frame rendering unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameContext {
    /// 1-based position in the rendered stack.
    pub index: usize,
    pub frame_id: i64,
    pub function_name: String,
    pub file_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_window: Option<CodeWindow>,
    /// Present only on the active frame.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<Vec<Variable>>,
}

/// Ordered frames of one turn, capped at `max_stacks`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugContext {
    pub frames: Vec<FrameContext>,
}

impl DebugContext {
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// The frame carrying the variable listing, if any.
    pub fn active_frame(&self) -> Option<&FrameContext> {
        self.frames.iter().find(|f| f.variables.is_some())
    }
}
