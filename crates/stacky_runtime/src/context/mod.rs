//! Debug context assembly: code windows, variables, and the rendered block.

mod assembler;
mod code_window;
mod source;
mod variables;

pub use assembler::{
    AssembleOptions, assemble_debug_context, build_debug_context, context_size,
    render_debug_context,
};
pub use code_window::{extract_code_window, split_lines};
pub use source::{FsSourceReader, SourceReader, is_binary};
pub use variables::{ResolvedVariables, ScopeKind, resolve_variables, select_scopes};
