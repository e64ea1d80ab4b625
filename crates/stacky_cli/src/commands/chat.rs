//! `stacky chat` - interactive session with in-memory history.

use anyhow::Result;
use stacky_core::ChatTurn;
use stacky_runtime::TurnRequest;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::connect::{DebugConnection, build_assistant, runtime_config};
use super::turn::run_turn;
use crate::cli::ConnectArgs;
use crate::output;

const EXIT_COMMANDS: [&str; 3] = ["/exit", "/quit", "/q"];

pub async fn handle(connect: ConnectArgs, model: Option<String>) -> Result<()> {
    let assistant = build_assistant(runtime_config(connect.workdir.as_deref(), model)?);
    let connection = DebugConnection::open(&connect).await?;

    output::header("stacky chat");
    output::dim("Start each message with /c, /h or /ch. /exit to quit.");

    let result = repl(&assistant, connection.as_ref()).await;

    if let Some(connection) = connection {
        connection.close().await;
    }
    result
}

async fn repl(
    assistant: &stacky_runtime::Assistant,
    connection: Option<&DebugConnection>,
) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut history: Vec<ChatTurn> = Vec::new();

    loop {
        output::prompt("›");
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            break;
        };

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if EXIT_COMMANDS.contains(&input) {
            break;
        }

        let request = TurnRequest::parse(input);
        match run_turn(assistant, connection, &request, &history).await {
            Ok(Some(answer)) => {
                history.push(request.to_history_turn());
                if !answer.is_empty() {
                    history.push(ChatTurn::response(answer));
                }
            }
            Ok(None) => {}
            Err(e) => output::error(&e.to_string()),
        }
    }
    Ok(())
}
