pub mod app;
pub mod defaults;
pub mod messages;
