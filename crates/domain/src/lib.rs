pub mod action;
pub mod config;
pub mod error;
pub mod map_state;
pub mod tool;

pub use action::{Action, ActionKind};
pub use error::{Error, Result};
pub use map_state::MapState;
