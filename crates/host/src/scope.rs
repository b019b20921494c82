use std::any::type_name;
use std::sync::Weak;

use crate::error::{HostError, Result};
use crate::ids::ComponentId;
use crate::runtime::{HostInner, Slot};
use crate::setter::Setter;

/// Hook context passed to [`Component::render`](crate::Component::render).
///
/// State slots are addressed by call order: the `n`-th `use_state` call of a
/// render always maps to slot `n`. Renders must therefore call `use_state` the
/// same number of times, with the same types, in the same order.
pub struct Scope<'a> {
	component: ComponentId,
	host: Weak<HostInner>,
	slots: &'a mut Vec<Slot>,
	cursor: usize,
	first_render: bool,
	error: Option<HostError>,
}

impl<'a> Scope<'a> {
	pub(crate) fn new(component: ComponentId, host: Weak<HostInner>, slots: &'a mut Vec<Slot>, first_render: bool) -> Self {
		Self {
			component,
			host,
			slots,
			cursor: 0,
			first_render,
			error: None,
		}
	}

	/// Returns the component being rendered.
	pub fn component(&self) -> ComponentId {
		self.component
	}

	/// Returns true during the component's first render.
	pub fn is_first_render(&self) -> bool {
		self.first_render
	}

	/// Registers (first render) or reads (later renders) the next state slot.
	///
	/// `init` runs only when the slot is created. The returned value is a
	/// snapshot; updates sent through the setter become visible on the next
	/// render.
	pub fn use_state<T>(&mut self, init: impl FnOnce() -> T) -> (T, Setter<T>)
	where
		T: Clone + PartialEq + Send + 'static,
	{
		let index = self.cursor;
		self.cursor += 1;
		let setter = Setter::new(Weak::clone(&self.host), self.component, index);

		let Some(slot) = self.slots.get(index) else {
			let value = init();
			self.slots.push(Slot::new(value.clone()));
			return (value, setter);
		};

		match slot.value.downcast_ref::<T>() {
			Some(value) => (value.clone(), setter),
			None => {
				let expected = slot.type_name;
				self.fail(HostError::HookOrder {
					component: self.component,
					slot: index,
					expected,
					found: type_name::<T>(),
				});
				(init(), setter)
			}
		}
	}

	fn fail(&mut self, error: HostError) {
		if self.error.is_none() {
			self.error = Some(error);
		}
	}

	/// Checks slot usage once the render returns.
	pub(crate) fn finish(mut self, previous_slots: usize) -> Result<()> {
		if !self.first_render && self.cursor != previous_slots {
			self.fail(HostError::SlotCount {
				component: self.component,
				expected: previous_slots,
				found: self.cursor,
			});
		}
		match self.error {
			Some(error) => Err(error),
			None => Ok(()),
		}
	}
}
