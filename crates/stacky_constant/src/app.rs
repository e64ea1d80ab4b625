//! Application metadata constants

pub const NAME: &str = "stacky";
pub const DISPLAY_NAME: &str = "Stacky";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const DESCRIPTION: &str = "AI debugging assistant for Debug Adapter Protocol sessions";

/// Directory name for stacky config within a repo or home dir
pub const DATA_DIR: &str = ".stacky";
/// Env file inside DATA_DIR
pub const ENV_FILE: &str = "env";
