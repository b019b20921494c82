use std::fmt;

use crate::ids::ComponentId;
use crate::runtime::Slot;

/// A state update waiting in the host queue.
pub enum Update<T> {
	/// Replace the value unconditionally.
	Replace(T),
	/// Compute the next value from the value current at apply time.
	Apply(Box<dyn FnOnce(&T) -> T + Send>),
}

impl<T> Update<T> {
	/// Wraps a functional update.
	pub fn apply(f: impl FnOnce(&T) -> T + Send + 'static) -> Self {
		Self::Apply(Box::new(f))
	}

	/// Resolves the update against the latest value.
	pub fn resolve(self, prev: &T) -> T {
		match self {
			Self::Replace(next) => next,
			Self::Apply(f) => f(prev),
		}
	}
}

impl<T> From<T> for Update<T> {
	fn from(value: T) -> Self {
		Self::Replace(value)
	}
}

impl<T: fmt::Debug> fmt::Debug for Update<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Replace(value) => f.debug_tuple("Replace").field(value).finish(),
			Self::Apply(_) => f.write_str("Apply(..)"),
		}
	}
}

/// What applying a queued update did to its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SlotOutcome {
	Changed,
	Unchanged,
	TypeMismatch,
}

type ApplyFn = Box<dyn FnOnce(&mut Slot) -> SlotOutcome + Send>;

/// Type-erased update addressed to one slot of one component.
pub(crate) struct Pending {
	pub(crate) component: ComponentId,
	pub(crate) slot: usize,
	apply: ApplyFn,
}

impl Pending {
	pub(crate) fn new<T>(component: ComponentId, slot: usize, update: Update<T>) -> Self
	where
		T: PartialEq + Send + 'static,
	{
		let apply: ApplyFn = Box::new(move |slot: &mut Slot| {
			let Some(current) = slot.value.downcast_mut::<T>() else {
				return SlotOutcome::TypeMismatch;
			};
			let next = update.resolve(current);
			if next == *current {
				return SlotOutcome::Unchanged;
			}
			*current = next;
			SlotOutcome::Changed
		});
		Self { component, slot, apply }
	}

	pub(crate) fn apply(self, slot: &mut Slot) -> SlotOutcome {
		(self.apply)(slot)
	}
}
