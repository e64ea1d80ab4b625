//! User-facing text emitted by the assistant.

pub const THINKING: &str = "Thinking...";

pub const NO_ACTIVE_SESSION: &str = "No active debugging session";

pub const NO_MODEL: &str =
    "No language model is available. Set OPENAI_API_KEY (and optionally STACKY_MODEL / STACKY_BASE_URL).";

pub const OFF_TOPIC: &str = "I'm sorry, I can't help with that.";

pub const INVALID_COMMAND: &str = "Invalid command. Please use one of the following:
-  `/c`: Use debug context only
- `/h`: Use chat history only
- `/ch` or `/hc`: Use both debug context and chat history

Followed by your question or prompt.";

pub const EMPTY_PROMPT: &str = "Please provide a prompt after the command. For example:
- \"`/c` What's causing the null pointer exception?\"
- \"`/h` Can you explain the previous solution again?\"
- \"`/ch` Why is my loop not terminating?\"";
