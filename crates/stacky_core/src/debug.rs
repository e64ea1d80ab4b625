//! Debug Adapter Protocol entities consumed by the context pipeline.
//!
//! Only the fields the pipeline reads are modelled; everything else the
//! adapter sends is ignored on deserialization.

use serde::{Deserialize, Serialize};

/// Where a frame's code lives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_reference: Option<i64>,
}

/// One activation record. Frames arrive innermost-first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackFrame {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
    #[serde(default)]
    pub line: u32,
    #[serde(default)]
    pub column: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_column: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presentation_hint: Option<String>,
}

impl StackFrame {
    pub fn new(id: i64, name: impl Into<String>, line: u32) -> Self {
        Self {
            id,
            name: name.into(),
            source: None,
            line,
            column: 1,
            end_line: None,
            end_column: None,
            presentation_hint: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        let source = self.source.get_or_insert_with(Source::default);
        source.path = Some(path.into());
        self
    }

    /// Filesystem path of the frame's source, when the adapter provided one.
    pub fn source_path(&self) -> Option<&str> {
        self.source.as_ref().and_then(|s| s.path.as_deref())
    }
}

/// A named variable container attached to a frame (locals, globals, registers…).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scope {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presentation_hint: Option<String>,
    pub variables_reference: i64,
    #[serde(default)]
    pub expensive: bool,
}

impl Scope {
    pub fn new(name: impl Into<String>, variables_reference: i64) -> Self {
        Self {
            name: name.into(),
            presentation_hint: None,
            variables_reference,
            expensive: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
    pub name: String,
    pub value: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
    #[serde(default)]
    pub variables_reference: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluate_name: Option<String>,
}

impl Variable {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            type_: None,
            variables_reference: 0,
            evaluate_name: None,
        }
    }
}
