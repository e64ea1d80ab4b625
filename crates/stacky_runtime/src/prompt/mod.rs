//! Prompt construction: prioritized blocks rendered under a token budget.

mod composer;
mod history;

pub use composer::{
    CharEstimate, PromptInputs, RenderedPrompt, TokenCounter, compose_blocks, render_prompt,
};
pub use history::export_history;
