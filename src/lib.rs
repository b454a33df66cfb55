pub mod app;
pub mod chat;
pub mod error;
pub mod event;
pub mod ui;
pub mod util;
pub mod view;

pub use app::App;
pub use error::{AssistantError, Result};
pub use util::config::Config;
