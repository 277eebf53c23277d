pub mod commands;
pub mod config;
pub mod editor;
pub mod error;
pub mod input;
pub mod logging;
pub mod syntax;
pub mod terminal;

pub use config::{load_config, Settings};
pub use editor::{Buffer, Cursor, Editor, Mode};
pub use error::{Error, Result};
pub use terminal::{handle_key, Terminal};
