//! `stacky context` - print (and optionally copy) the debug context.

use anyhow::{Result, anyhow};
use stacky_constant::messages;

use super::connect::{DebugConnection, build_assistant, runtime_config, session_of};
use crate::cli::ConnectArgs;
use crate::output;

pub async fn handle(connect: ConnectArgs, no_vars: bool, copy: bool) -> Result<()> {
    let assistant = build_assistant(runtime_config(connect.workdir.as_deref(), None)?);
    let connection = DebugConnection::open(&connect).await?;

    let result = async {
        let session = session_of(connection.as_ref()).await?;
        Ok::<_, anyhow::Error>(assistant.debug_context(session.as_ref(), !no_vars).await?)
    }
    .await;

    if let Some(connection) = connection {
        connection.close().await;
    }

    let text = result?;
    if text.is_empty() {
        output::warning(messages::NO_ACTIVE_SESSION);
        return Ok(());
    }

    output::context_block(&text);
    if copy {
        cli_clipboard::set_contents(text)
            .map_err(|e| anyhow!("Failed to copy to clipboard: {}", e))?;
        output::success("Debug context copied to clipboard");
    }
    Ok(())
}
