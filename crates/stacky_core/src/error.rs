use thiserror::Error;

#[derive(Error, Debug)]
pub enum StackyError {
    #[error("invalid command: {0}")]
    InvalidCommand(String),

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StackyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_command_error() {
        let err = StackyError::InvalidCommand("x".to_string());
        assert_eq!(err.to_string(), "invalid command: x");
    }

    #[test]
    fn test_config_error() {
        let err = StackyError::Config("max_stacks must be positive".to_string());
        assert_eq!(err.to_string(), "config error: max_stacks must be positive");
    }

    #[test]
    fn test_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = StackyError::from(io_err);
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json");
        let err = StackyError::from(json_err.unwrap_err());
        assert!(err.to_string().contains("expected value"));
    }
}
