//! Error types for host operations.

use thiserror::Error;

use crate::ids::ComponentId;

/// Errors reported by the component host.
#[derive(Debug, Error)]
pub enum HostError {
	/// The component was never mounted or has been unmounted.
	#[error("{0} is not mounted")]
	NotMounted(ComponentId),

	/// A render was requested while the host was already rendering.
	#[error("cannot render {0} while the host is rendering")]
	Reentrant(ComponentId),

	/// A component kept changing its own state on every render.
	#[error("{component} kept scheduling updates after {passes} render passes")]
	RenderLoop {
		/// Component that exceeded the pass limit.
		component: ComponentId,
		/// Number of renders performed in the aborted flush.
		passes: usize,
	},

	/// A render asked a state slot for a different type than it was created with.
	#[error("{component} changed hook order: slot {slot} holds `{expected}`, render asked for `{found}`")]
	HookOrder {
		/// Offending component.
		component: ComponentId,
		/// Slot position.
		slot: usize,
		/// Type the slot was created with.
		expected: &'static str,
		/// Type requested by the render.
		found: &'static str,
	},

	/// A render used a different number of state slots than the previous one.
	#[error("{component} rendered {found} state slots, previous render had {expected}")]
	SlotCount {
		/// Offending component.
		component: ComponentId,
		/// Slot count established by earlier renders.
		expected: usize,
		/// Slot count used by this render.
		found: usize,
	},

	/// `max-render-passes` was configured as zero.
	#[error("max-render-passes must be at least 1")]
	ZeroRenderPasses,

	/// Host configuration could not be parsed.
	#[error("invalid host configuration: {0}")]
	Config(#[from] toml::de::Error),
}

/// Result type for host operations.
pub type Result<T> = std::result::Result<T, HostError>;
