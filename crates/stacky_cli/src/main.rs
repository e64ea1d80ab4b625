//! CLI entry point for stacky.

mod cli;
mod commands;
mod output;

use std::path::Path;

use clap::Parser;
use stacky_constant::app;
use stacky_observability::ObservabilityConfig;

use crate::cli::Cli;

/// Walk up from `start` and return the first existing `relative` path.
fn find_upwards(start: &Path, relative: &Path) -> Option<std::path::PathBuf> {
    start
        .ancestors()
        .take(32)
        .map(|dir| dir.join(relative))
        .find(|candidate| candidate.exists())
}

/// Load env files; variables already set are never overridden.
/// Order: 1) process env  2) ~/.stacky/env  3) nearest .stacky/env  4) nearest .env
fn load_stacky_config() {
    let data_env = Path::new(app::DATA_DIR).join(app::ENV_FILE);

    if let Some(home) = dirs::home_dir() {
        let global = home.join(&data_env);
        if global.exists() {
            let _ = dotenvy::from_path(&global);
        }
    }

    let Ok(cwd) = std::env::current_dir() else {
        return;
    };
    if let Some(project) = find_upwards(&cwd, &data_env) {
        let _ = dotenvy::from_path(&project);
    }
    if let Some(env_file) = find_upwards(&cwd, Path::new(".env")) {
        let _ = dotenvy::from_path(&env_file);
    }
}

fn init_logging(verbose: bool) {
    let mut config = ObservabilityConfig::from_env();
    if verbose {
        config = config.with_log_level("debug");
    }
    if let Err(e) = stacky_observability::init(config) {
        output::warning(&format!("Logging disabled: {}", e));
    }
}

#[tokio::main]
async fn main() {
    load_stacky_config();
    let cli = Cli::parse();
    output::init(cli.output);
    init_logging(cli.verbose);

    let result = commands::handle(cli).await;
    stacky_observability::shutdown();

    if let Err(e) = result {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}
