//! Marks you away on every connected IRC network while your screen is locked.

mod autoaway;
pub mod command;
pub mod config;
pub mod consts;
mod error;
pub mod presence;
pub mod prober;
pub mod session;
pub mod settings;
pub mod state;
pub mod tracing;

pub use autoaway::AutoAway;
pub use config::Config;
pub use error::Error;
pub use state::PluginState;
