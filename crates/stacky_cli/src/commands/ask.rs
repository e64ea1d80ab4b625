//! `stacky ask` - one question, answered from the current debug session.

use anyhow::Result;
use stacky_runtime::TurnRequest;

use super::connect::{DebugConnection, build_assistant, runtime_config};
use super::turn::run_turn;
use crate::cli::ConnectArgs;

pub async fn handle(connect: ConnectArgs, model: Option<String>, input: String) -> Result<()> {
    let assistant = build_assistant(runtime_config(connect.workdir.as_deref(), model)?);
    let connection = DebugConnection::open(&connect).await?;

    let request = TurnRequest::parse(&input);
    let result = run_turn(&assistant, connection.as_ref(), &request, &[]).await;

    if let Some(connection) = connection {
        connection.close().await;
    }
    result.map(|_| ())
}
