//! Boolean toggle state for [`flip_host`] components.
//!
//! [`use_toggle`] registers a boolean state slot on the rendering component
//! and returns the current value together with two handles: [`Toggle`] flips
//! the value, [`SetToggle`] replaces it. Both only enqueue updates; the value
//! seen by the component changes on its next render.
//!
//! ```ignore
//! host.mount(|cx: &mut Scope<'_>| {
//! 	let (visible, toggle, set_visible) = use_toggle(cx);
//! 	// wire `toggle` to a button, `set_visible.set(false)` to "hide".
//! })?;
//! ```

use flip_host::{ComponentId, Scope, Setter};

#[cfg(test)]
mod tests;

/// Registers a toggle that starts as `false`.
pub fn use_toggle(cx: &mut Scope<'_>) -> (bool, Toggle, SetToggle) {
	use_toggle_with(cx, false)
}

/// Registers a toggle starting at `initial`.
///
/// `initial` only matters on the component's first render; later renders
/// return the stored value.
pub fn use_toggle_with(cx: &mut Scope<'_>, initial: bool) -> (bool, Toggle, SetToggle) {
	let (value, setter) = cx.use_state(|| initial);
	(value, Toggle(setter.clone()), SetToggle(setter))
}

/// Flips a toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toggle(Setter<bool>);

impl Toggle {
	/// Enqueues a negation of whatever value is current when the update is
	/// applied, so several toggles queued before a flush compose.
	pub fn toggle(&self) {
		tracing::trace!(component = %self.0.component(), slot = self.0.slot(), "toggle.flip");
		self.0.update(|value| !value);
	}

	/// Returns the owning component.
	pub fn component(&self) -> ComponentId {
		self.0.component()
	}
}

/// Sets a toggle directly.
///
/// Only `bool` values are accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetToggle(Setter<bool>);

impl SetToggle {
	/// Enqueues an unconditional replacement.
	pub fn set(&self, value: bool) {
		tracing::trace!(component = %self.0.component(), slot = self.0.slot(), value, "toggle.set");
		self.0.set(value);
	}

	/// Enqueues a functional update of the latest value.
	pub fn update(&self, f: impl FnOnce(bool) -> bool + Send + 'static) {
		self.0.update(move |value| f(*value));
	}

	/// Returns the owning component.
	pub fn component(&self) -> ComponentId {
		self.0.component()
	}
}

impl From<SetToggle> for Setter<bool> {
	fn from(set: SetToggle) -> Self {
		set.0
	}
}
