//! Prioritized prompt blocks and budget-aware rendering.
//!
//! Over budget, the lowest-priority surviving block goes first (the later
//! one on ties). Truncatable blocks are shortened to the last whitespace
//! boundary that fits before being dropped outright.

use stacky_core::{PromptBlock, PromptRole};
use stacky_llms::{Message, Role};

use crate::error::{Result, RuntimeError};

const IDENTITY: &str = "You are Stacky, an AI debugging assistant. Based on the context you are provided answer the user question. Respond in a clear, concise manner suitable for display in an IDE.";

const ANALYSIS: &str = "Analyze the provided debug context. Focus on the current stack frame, variables, and code snippet to identify potential issues.";

const STRUCTURE: &str = "Structure your response as follows:
1. Brief summary of the identified issue (1-2 sentences)
2. Detailed explanation (2-3 bullet points)
3. Suggested fix or next debugging steps (1-2 sentences)
If you don't have enough information provide advice on what additional information you need.
You can also suggest other breakpoints to get more information.
Use markdown formatting for code snippets or important terms.";

const PRIORITY_IDENTITY: u32 = 400;
const PRIORITY_USER_PROMPT: u32 = 300;
const PRIORITY_INSTRUCTIONS: u32 = 250;
const PRIORITY_DEBUG_CONTEXT: u32 = 200;
const PRIORITY_HISTORY: u32 = 100;

/// Counts tokens the way the target model would, or close to it.
pub trait TokenCounter: Send + Sync {
    fn count(&self, text: &str) -> u32;

    /// Fixed cost of wrapping text in a chat message.
    fn message_overhead(&self) -> u32 {
        3
    }
}

/// About four characters per token, rounded up.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharEstimate;

impl TokenCounter for CharEstimate {
    fn count(&self, text: &str) -> u32 {
        text.chars().count().div_ceil(4) as u32
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PromptInputs<'a> {
    pub user_prompt: &'a str,
    pub debug_context: Option<&'a str>,
    pub history: Option<&'a str>,
}

/// Build the blocks for one turn in document order. Empty inputs add nothing.
pub fn compose_blocks(inputs: &PromptInputs<'_>) -> Vec<PromptBlock> {
    let mut blocks = vec![PromptBlock::user(PRIORITY_IDENTITY, IDENTITY)];

    let prompt = inputs.user_prompt.trim();
    if !prompt.is_empty() {
        blocks.push(labeled(PRIORITY_USER_PROMPT, "User Prompt: ", prompt));
    }

    if let Some(ctx) = inputs.debug_context.filter(|c| !c.trim().is_empty()) {
        blocks.push(PromptBlock::user(PRIORITY_INSTRUCTIONS, ANALYSIS));
        blocks.push(labeled(PRIORITY_DEBUG_CONTEXT, "Debug Context: ", ctx));
        blocks.push(PromptBlock::user(PRIORITY_INSTRUCTIONS, STRUCTURE));
    }

    if let Some(history) = inputs.history.filter(|h| !h.trim().is_empty()) {
        blocks.push(labeled(PRIORITY_HISTORY, "History: ", history));
    }

    blocks
}

fn labeled(priority: u32, label: &str, body: &str) -> PromptBlock {
    PromptBlock::user(priority, format!("{label}{body}")).breakable_after(label.trim_end().len())
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPrompt {
    pub messages: Vec<Message>,
    /// Estimated prompt size including per-message overhead
    pub token_count: u32,
    /// Blocks removed entirely
    pub dropped: usize,
    /// Blocks shortened at a word boundary
    pub truncated: usize,
}

/// Fit `blocks` into `budget` tokens.
///
/// Fails with [`RuntimeError::ContextOverflow`] only when the last surviving
/// block cannot fit on its own.
pub fn render_prompt(
    blocks: &[PromptBlock],
    budget: u32,
    counter: &dyn TokenCounter,
) -> Result<RenderedPrompt> {
    let overhead = counter.message_overhead();
    let cost = |text: &str| counter.count(text) + overhead;

    let mut texts: Vec<Option<String>> = blocks.iter().map(|b| Some(b.text.clone())).collect();
    let mut total: u32 = texts.iter().flatten().map(|t| cost(t)).sum();
    let mut dropped = 0;
    let mut truncated = 0;

    while total > budget {
        let Some(victim) = lowest_priority(blocks, &texts) else {
            break;
        };
        let survivors = texts.iter().flatten().count();
        let Some(text) = texts[victim].take() else {
            break;
        };
        let others = total - cost(&text);

        let shortened = if blocks[victim].truncatable {
            budget
                .checked_sub(others)
                .and_then(|room| room.checked_sub(overhead))
                .and_then(|allowance| {
                    truncate_at_word(&text, blocks[victim].keep, allowance, counter)
                })
        } else {
            None
        };

        match shortened {
            Some(short) => {
                total = others + cost(&short);
                texts[victim] = Some(short);
                truncated += 1;
            }
            None if survivors == 1 => return Err(RuntimeError::ContextOverflow { budget }),
            None => {
                total = others;
                dropped += 1;
            }
        }
    }

    let messages = blocks
        .iter()
        .zip(texts)
        .filter_map(|(block, text)| text.map(|t| Message::new(role_of(block.role), t)))
        .collect();

    Ok(RenderedPrompt {
        messages,
        token_count: total,
        dropped,
        truncated,
    })
}

fn lowest_priority(blocks: &[PromptBlock], texts: &[Option<String>]) -> Option<usize> {
    let mut lowest: Option<usize> = None;
    for (i, block) in blocks.iter().enumerate() {
        if texts[i].is_none() {
            continue;
        }
        match lowest {
            Some(j) if blocks[j].priority < block.priority => {}
            _ => lowest = Some(i),
        }
    }
    lowest
}

/// Longest whitespace-bounded prefix of `text` within `allowance` tokens
/// that still reaches past the first `keep` bytes.
fn truncate_at_word(
    text: &str,
    keep: usize,
    allowance: u32,
    counter: &dyn TokenCounter,
) -> Option<String> {
    let cuts: Vec<usize> = text
        .char_indices()
        .filter(|(_, c)| c.is_whitespace())
        .map(|(i, _)| i)
        .collect();
    let fits = cuts.partition_point(|&cut| counter.count(&text[..cut]) <= allowance);
    let end = *cuts.get(fits.checked_sub(1)?)?;
    let prefix = text[..end].trim_end();
    (!prefix.is_empty() && prefix.len() > keep).then(|| prefix.to_string())
}

fn role_of(role: PromptRole) -> Role {
    match role {
        PromptRole::System => Role::System,
        PromptRole::User => Role::User,
        PromptRole::Assistant => Role::Assistant,
    }
}
