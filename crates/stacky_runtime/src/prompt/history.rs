use stacky_core::ChatTurn;

/// Flatten chat history into prompt text, newest turn first.
pub fn export_history(turns: &[ChatTurn]) -> String {
    let mut out = String::new();
    for turn in turns.iter().rev() {
        match turn {
            ChatTurn::Response { markdown, .. } => {
                out.push_str(&format!("Stacky: {}\n", markdown));
            }
            ChatTurn::Request {
                command, prompt, ..
            } => {
                let command = command
                    .as_deref()
                    .map(|c| format!("/{}", c.trim_start_matches('/')))
                    .unwrap_or_default();
                out.push_str(&format!("User: {} {}\n", command, prompt));
            }
        }
    }
    out
}
