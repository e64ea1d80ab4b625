//! Command dispatch.

pub mod ask;
pub mod chat;
pub mod connect;
pub mod context;
pub mod providers;
pub mod turn;

use anyhow::Result;

use crate::cli::{Cli, Command};

pub async fn handle(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Context {
            connect,
            no_vars,
            copy,
        } => context::handle(connect, no_vars, copy).await,
        Command::Ask {
            connect,
            model,
            input,
        } => ask::handle(connect, model, input.join(" ")).await,
        Command::Chat { connect, model } => chat::handle(connect, model).await,
        Command::Providers { action } => providers::handle(action).await,
    }
}
