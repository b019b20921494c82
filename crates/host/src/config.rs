use serde::Deserialize;

use crate::error::{HostError, Result};

/// Render passes allowed per component within one flush.
pub const DEFAULT_MAX_RENDER_PASSES: usize = 50;

/// When dispatched updates are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UpdateMode {
	/// Updates wait in the queue until [`Host::flush`](crate::Host::flush).
	#[default]
	Batched,
	/// Every dispatch outside a render flushes the queue synchronously.
	Immediate,
}

/// Host configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct HostConfig {
	/// Update scheduling mode.
	pub update_mode: UpdateMode,
	/// Renders allowed per component in a single flush before it is treated
	/// as a render loop.
	pub max_render_passes: usize,
}

impl Default for HostConfig {
	fn default() -> Self {
		Self {
			update_mode: UpdateMode::Batched,
			max_render_passes: DEFAULT_MAX_RENDER_PASSES,
		}
	}
}

impl HostConfig {
	/// Default configuration with [`UpdateMode::Immediate`].
	pub fn immediate() -> Self {
		Self {
			update_mode: UpdateMode::Immediate,
			..Self::default()
		}
	}

	/// Parses and validates a TOML configuration document.
	pub fn from_toml(src: &str) -> Result<Self> {
		let config: Self = toml::from_str(src)?;
		config.validate()?;
		Ok(config)
	}

	/// Checks value ranges that serde cannot express.
	pub fn validate(&self) -> Result<()> {
		if self.max_render_passes == 0 {
			return Err(HostError::ZeroRenderPasses);
		}
		Ok(())
	}
}
