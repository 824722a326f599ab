//! Squad package management
//!
//! Facade over [`squad_core`]: it re-exports the component library and adds
//! the pieces an embedding tool needs at startup, namely logging setup
//! ([`init_logging`]) and a [`SquadContext`] that builds every component from
//! one [`SquadSettings`] value.
//!
//! # Example
//!
//! ```no_run
//! use squad::{SquadContext, SquadSettings, init_logging};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let settings = SquadSettings::load()?;
//! init_logging(&settings.logging)?;
//! let ctx = SquadContext::from_settings(settings);
//! for squad in ctx.loader.list_local().await? {
//!     println!("{}", squad.name);
//! }
//! # Ok(())
//! # }
//! ```

mod context;
mod logging;

pub use context::SquadContext;
pub use logging::init_logging;

pub use squad_core::*;
