//! Component host for reactive UI state.
//!
//! A [`Host`] owns mounted components, their positional state slots, and a
//! queue of pending state updates. Components read state through
//! [`Scope::use_state`] while rendering and mutate it through the returned
//! [`Setter`]. Setters only enqueue; [`Host::flush`] applies the queue in call
//! order and re-renders every component whose state actually changed.

/// Host configuration and TOML loading.
pub mod config;
/// Error types for host operations.
pub mod error;
/// Identifier types for mounted components.
pub mod ids;
/// Host runtime: mount, flush, render.
pub mod runtime;
/// Per-render hook scope.
pub mod scope;
/// State setters handed out by [`Scope::use_state`].
pub mod setter;
/// Queued state updates.
pub mod update;

pub use config::{HostConfig, UpdateMode};
pub use error::{HostError, Result};
pub use ids::ComponentId;
pub use runtime::{Component, FlushReport, Host};
pub use scope::Scope;
pub use setter::Setter;
pub use update::Update;
