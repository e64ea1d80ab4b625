//! Run one assistant turn against the terminal.

use anyhow::Result;
use indicatif::ProgressBar;
use stacky_core::{ChatTurn, TurnEvent};
use stacky_runtime::{Assistant, RuntimeError, TurnRequest};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::connect::{DebugConnection, session_of};
use crate::output;

/// Stream one turn to stdout. Ctrl-C cancels it.
///
/// Returns the answer markdown, or `None` when the turn was cancelled.
pub async fn run_turn(
    assistant: &Assistant,
    connection: Option<&DebugConnection>,
    request: &TurnRequest,
    history: &[ChatTurn],
) -> Result<Option<String>> {
    let session = session_of(connection).await?;
    let (tx, rx) = mpsc::channel(64);
    let cancel = CancellationToken::new();

    let renderer = tokio::spawn(render_events(rx));
    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };

    let result = assistant
        .handle_turn(request, history, session.as_ref(), &tx, cancel)
        .await;
    interrupt.abort();
    drop(tx);
    let _ = renderer.await;

    match result {
        Ok(answer) => Ok(Some(answer)),
        Err(RuntimeError::Cancelled) => {
            output::warning("Cancelled");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

async fn render_events(mut rx: mpsc::Receiver<TurnEvent>) {
    let mut spinner: Option<ProgressBar> = None;
    let mut streaming = false;

    while let Some(event) = rx.recv().await {
        match event {
            TurnEvent::Progress { message } => {
                clear(&mut spinner);
                spinner = Some(output::spinner(&message));
            }
            TurnEvent::Notice { message } => {
                clear(&mut spinner);
                output::warning(&message);
            }
            TurnEvent::Markdown { text } => {
                clear(&mut spinner);
                output::fragment(&text);
                streaming = true;
            }
            TurnEvent::Done => {
                clear(&mut spinner);
                if std::mem::take(&mut streaming) {
                    output::end_fragments();
                }
            }
            // Reported by the caller.
            TurnEvent::Error { .. } => clear(&mut spinner),
        }
    }

    clear(&mut spinner);
    if streaming {
        output::end_fragments();
    }
}

fn clear(spinner: &mut Option<ProgressBar>) {
    if let Some(spinner) = spinner.take() {
        spinner.finish_and_clear();
    }
}
