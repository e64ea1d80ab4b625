pub mod command;
pub mod context;
pub mod debug;
pub mod error;
pub mod event;
pub mod prompt;
pub mod turn;

pub use command::ChatCommand;
pub use context::{CodeWindow, DebugContext, FrameContext};
pub use debug::{Scope, Source, StackFrame, Variable};
pub use error::{Result, StackyError};
pub use event::TurnEvent;
pub use prompt::{PromptBlock, PromptRole};
pub use turn::ChatTurn;
