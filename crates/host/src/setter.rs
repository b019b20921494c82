use std::fmt;
use std::marker::PhantomData;
use std::sync::Weak;

use crate::config::UpdateMode;
use crate::ids::ComponentId;
use crate::runtime::HostInner;
use crate::update::{Pending, Update};

/// Schedules updates to one state slot of one component.
///
/// Setters hold a weak reference to their host, so components may store them
/// without creating a cycle. A setter outliving its component or host is
/// inert. Setters for the same slot compare equal across renders.
pub struct Setter<T> {
	host: Weak<HostInner>,
	component: ComponentId,
	slot: usize,
	_marker: PhantomData<fn(T)>,
}

impl<T> Setter<T> {
	pub(crate) fn new(host: Weak<HostInner>, component: ComponentId, slot: usize) -> Self {
		Self {
			host,
			component,
			slot,
			_marker: PhantomData,
		}
	}

	/// Returns the component owning the slot.
	pub fn component(&self) -> ComponentId {
		self.component
	}

	/// Returns the slot position within the component.
	pub fn slot(&self) -> usize {
		self.slot
	}
}

impl<T: PartialEq + Send + 'static> Setter<T> {
	/// Enqueues an unconditional replacement.
	pub fn set(&self, value: T) {
		self.dispatch(Update::Replace(value));
	}

	/// Enqueues a functional update evaluated against the latest value.
	pub fn update(&self, f: impl FnOnce(&T) -> T + Send + 'static) {
		self.dispatch(Update::apply(f));
	}

	/// Enqueues an update and, in immediate mode, flushes.
	pub fn dispatch(&self, update: Update<T>) {
		let Some(host) = self.host.upgrade() else {
			tracing::trace!(component = %self.component, slot = self.slot, "setter.host_dropped");
			return;
		};
		host.enqueue(Pending::new(self.component, self.slot, update));
		if host.config.update_mode == UpdateMode::Immediate
			&& let Err(e) = host.flush()
		{
			tracing::warn!(component = %self.component, error = %e, "immediate flush failed");
		}
	}
}

impl<T> Clone for Setter<T> {
	fn clone(&self) -> Self {
		Self {
			host: Weak::clone(&self.host),
			component: self.component,
			slot: self.slot,
			_marker: PhantomData,
		}
	}
}

impl<T> PartialEq for Setter<T> {
	fn eq(&self, other: &Self) -> bool {
		self.component == other.component && self.slot == other.slot && Weak::ptr_eq(&self.host, &other.host)
	}
}

impl<T> Eq for Setter<T> {}

impl<T> fmt::Debug for Setter<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Setter")
			.field("component", &self.component)
			.field("slot", &self.slot)
			.field("live", &(self.host.strong_count() > 0))
			.finish()
	}
}

