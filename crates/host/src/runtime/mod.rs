//! Host runtime: component table, update queue, and the flush loop.
//!
//! # Scheduling model
//!
//! Setters never touch component state directly. They push a type-erased
//! update onto a single FIFO queue. [`Host::flush`] drains the queue in call
//! order, applies each update to the latest slot value, and re-renders every
//! component that changed. Updates enqueued by those renders are drained in a
//! further batch of the same flush, until the queue stays empty.
//!
//! Only one flush or render runs at a time. Dispatches during a render only
//! enqueue; the surrounding flush picks them up.

use std::any::{Any, type_name};
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::config::{HostConfig, UpdateMode};
use crate::error::{HostError, Result};
use crate::ids::ComponentId;
use crate::scope::Scope;
use crate::update::{Pending, SlotOutcome};


/// High-water mark for queued updates before warning.
const QUEUE_HIGH_WATER: usize = 1024;

/// A renderable unit owning positional state slots.
pub trait Component: Send + 'static {
	/// Renders the component, registering its state through `cx`.
	fn render(&mut self, cx: &mut Scope<'_>);
}

impl<F> Component for F
where
	F: FnMut(&mut Scope<'_>) + Send + 'static,
{
	fn render(&mut self, cx: &mut Scope<'_>) {
		self(cx)
	}
}

/// Type-erased state slot.
pub(crate) struct Slot {
	pub(crate) value: Box<dyn Any + Send>,
	pub(crate) type_name: &'static str,
}

impl Slot {
	pub(crate) fn new<T: Send + 'static>(value: T) -> Self {
		Self {
			value: Box::new(value),
			type_name: type_name::<T>(),
		}
	}
}

struct Mounted {
	component: Box<dyn Component>,
	slots: Vec<Slot>,
}

/// Component table entry. The render counter sits outside the mutex so it
/// stays readable while the component renders.
struct Entry {
	renders: AtomicU64,
	mounted: Mutex<Mounted>,
}

/// Counters from a single [`Host::flush`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FlushReport {
	/// Updates that changed a slot value.
	pub applied: usize,
	/// Updates whose result equalled the current value.
	pub unchanged: usize,
	/// Updates addressed to unmounted components, missing slots, or
	/// mismatched slot types.
	pub discarded: usize,
	/// Component renders triggered by the flush.
	pub renders: usize,
	/// Queue drains performed.
	pub batches: usize,
}

impl FlushReport {
	/// Returns true if the flush did nothing.
	pub fn is_empty(&self) -> bool {
		*self == Self::default()
	}

	fn absorb(&mut self, other: Self) {
		self.applied += other.applied;
		self.unchanged += other.unchanged;
		self.discarded += other.discarded;
		self.renders += other.renders;
		self.batches += other.batches;
	}
}

/// Clears the busy flag on drop, if this guard set it.
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
	fn acquire(flag: &'a AtomicBool) -> Option<Self> {
		// Lazily built: a guard constructed on failure would clear the flag on drop.
		(!flag.swap(true, Ordering::AcqRel)).then(|| Self(flag))
	}
}

impl Drop for BusyGuard<'_> {
	fn drop(&mut self) {
		self.0.store(false, Ordering::Release);
	}
}

pub(crate) struct HostInner {
	pub(crate) config: HostConfig,
	queue: Mutex<VecDeque<Pending>>,
	components: Mutex<FxHashMap<ComponentId, Arc<Entry>>>,
	next_id: AtomicU64,
	busy: AtomicBool,
}

impl HostInner {
	pub(crate) fn enqueue(&self, pending: Pending) {
		let mut queue = self.queue.lock();
		queue.push_back(pending);
		if queue.len() == QUEUE_HIGH_WATER {
			tracing::warn!(pending = queue.len(), "host.queue_high_water");
		}
	}

	fn lookup(&self, id: ComponentId) -> Option<Arc<Entry>> {
		self.components.lock().get(&id).cloned()
	}

	/// Drains the queue until no render schedules further updates.
	///
	/// Returns an empty report if another flush or render is in progress;
	/// the queued updates are left for it.
	pub(crate) fn flush(self: &Arc<Self>) -> Result<FlushReport> {
		let mut total = FlushReport::default();
		loop {
			let Some(busy) = BusyGuard::acquire(&self.busy) else {
				return Ok(total);
			};
			let drained = self.drain();
			drop(busy);
			total.absorb(drained?);

			// A dispatch that lost the busy flag to this flush after its last
			// empty batch relies on this recheck.
			if self.queue.lock().is_empty() {
				return Ok(total);
			}
		}
	}

	/// Applies queued updates and renders changed components. Callers must
	/// hold the busy flag.
	///
	/// A failing render does not stop the batch: every other changed
	/// component is still rendered and the first error is returned at the end.
	fn drain(self: &Arc<Self>) -> Result<FlushReport> {
		let mut report = FlushReport::default();
		let mut first_error: Option<HostError> = None;
		let mut passes: FxHashMap<ComponentId, usize> = FxHashMap::default();

		loop {
			let batch = std::mem::take(&mut *self.queue.lock());
			if batch.is_empty() {
				break;
			}
			report.batches += 1;

			let mut dirty: Vec<ComponentId> = Vec::new();
			for pending in batch {
				let id = pending.component;
				let slot = pending.slot;
				let Some(entry) = self.lookup(id) else {
					tracing::trace!(component = %id, slot, "update.discard_unmounted");
					report.discarded += 1;
					continue;
				};
				let mut mounted = entry.mounted.lock();
				let Some(target) = mounted.slots.get_mut(slot) else {
					tracing::warn!(component = %id, slot, "update.discard_missing_slot");
					report.discarded += 1;
					continue;
				};
				match pending.apply(target) {
					SlotOutcome::Changed => {
						report.applied += 1;
						if !dirty.contains(&id) {
							dirty.push(id);
						}
					}
					SlotOutcome::Unchanged => report.unchanged += 1,
					SlotOutcome::TypeMismatch => {
						tracing::warn!(
							component = %id,
							slot,
							expected = target.type_name,
							"update.discard_type_mismatch"
						);
						report.discarded += 1;
					}
				}
			}

			for id in dirty {
				let count = passes.entry(id).or_default();
				*count += 1;
				if *count > self.config.max_render_passes {
					let passes = *count - 1;
					self.queue.lock().retain(|p| p.component != id);
					tracing::warn!(component = %id, passes, "host.render_loop");
					first_error.get_or_insert(HostError::RenderLoop { component: id, passes });
					continue;
				}
				match self.render(id) {
					Ok(()) => report.renders += 1,
					// Unmounted by an earlier render in this batch.
					Err(HostError::NotMounted(_)) => {}
					Err(e) => {
						tracing::warn!(component = %id, error = %e, "component.render_failed");
						first_error.get_or_insert(e);
					}
				}
			}
		}

		if !report.is_empty() {
			tracing::debug!(
				applied = report.applied,
				unchanged = report.unchanged,
				discarded = report.discarded,
				renders = report.renders,
				batches = report.batches,
				"host.flush"
			);
		}
		match first_error {
			Some(error) => Err(error),
			None => Ok(report),
		}
	}

	/// Renders one component. Callers must hold the busy flag.
	fn render(self: &Arc<Self>, id: ComponentId) -> Result<()> {
		let entry = self.lookup(id).ok_or(HostError::NotMounted(id))?;
		let mut mounted = entry.mounted.lock();
		let Mounted { component, slots } = &mut *mounted;

		let first_render = entry.renders.load(Ordering::Acquire) == 0;
		let previous_slots = slots.len();
		let mut scope = Scope::new(id, Arc::downgrade(self), slots, first_render);
		component.render(&mut scope);
		let outcome = scope.finish(previous_slots);
		if !first_render && slots.len() > previous_slots {
			slots.truncate(previous_slots);
		}
		let renders = entry.renders.fetch_add(1, Ordering::AcqRel) + 1;

		tracing::trace!(component = %id, renders, slots = slots.len(), "component.render");
		outcome
	}
}

/// Owner of mounted components and their pending state updates.
///
/// `Host` is a cheap handle; clones share the same components and queue.
#[derive(Clone)]
pub struct Host {
	inner: Arc<HostInner>,
}

impl Default for Host {
	fn default() -> Self {
		Self::new(HostConfig::default())
	}
}

impl Host {
	/// Creates an empty host.
	pub fn new(config: HostConfig) -> Self {
		Self {
			inner: Arc::new(HostInner {
				config,
				queue: Mutex::new(VecDeque::new()),
				components: Mutex::new(FxHashMap::default()),
				next_id: AtomicU64::new(0),
				busy: AtomicBool::new(false),
			}),
		}
	}

	/// Returns the host configuration.
	pub fn config(&self) -> &HostConfig {
		&self.inner.config
	}

	/// Mounts a component and runs its first render.
	///
	/// If the first render fails the component is removed again.
	pub fn mount(&self, component: impl Component) -> Result<ComponentId> {
		let id = ComponentId(self.inner.next_id.fetch_add(1, Ordering::AcqRel).wrapping_add(1));
		let entry = Entry {
			renders: AtomicU64::new(0),
			mounted: Mutex::new(Mounted {
				component: Box::new(component),
				slots: Vec::new(),
			}),
		};
		self.inner.components.lock().insert(id, Arc::new(entry));
		tracing::debug!(component = %id, "component.mount");

		// A fresh id cannot be locked by an in-progress render, so mounting
		// from inside a render is allowed.
		let busy = BusyGuard::acquire(&self.inner.busy);
		if let Err(e) = self.inner.render(id) {
			self.inner.components.lock().remove(&id);
			self.inner.queue.lock().retain(|p| p.component != id);
			return Err(e);
		}
		drop(busy);

		if self.inner.config.update_mode == UpdateMode::Immediate
			&& let Err(e) = self.inner.flush()
		{
			tracing::warn!(component = %id, error = %e, "immediate flush after mount failed");
		}
		Ok(id)
	}

	/// Unmounts a component, dropping its state and any queued updates.
	pub fn unmount(&self, id: ComponentId) -> Result<()> {
		if self.inner.components.lock().remove(&id).is_none() {
			return Err(HostError::NotMounted(id));
		}
		let mut queue = self.inner.queue.lock();
		let before = queue.len();
		queue.retain(|p| p.component != id);
		tracing::debug!(component = %id, dropped = before - queue.len(), "component.unmount");
		Ok(())
	}

	/// Forces a render of a mounted component.
	pub fn rerender(&self, id: ComponentId) -> Result<()> {
		if !self.is_mounted(id) {
			return Err(HostError::NotMounted(id));
		}
		let Some(busy) = BusyGuard::acquire(&self.inner.busy) else {
			return Err(HostError::Reentrant(id));
		};
		self.inner.render(id)?;
		drop(busy);

		if self.inner.config.update_mode == UpdateMode::Immediate {
			self.inner.flush()?;
		}
		Ok(())
	}

	/// Applies queued updates and re-renders changed components.
	pub fn flush(&self) -> Result<FlushReport> {
		self.inner.flush()
	}

	/// Returns true if `id` is currently mounted.
	pub fn is_mounted(&self, id: ComponentId) -> bool {
		self.inner.components.lock().contains_key(&id)
	}

	/// Returns how many times `id` has rendered.
	///
	/// Safe to call from any render, including one of `id`; a render in
	/// progress is not yet counted.
	pub fn render_count(&self, id: ComponentId) -> Option<u64> {
		self.inner.lookup(id).map(|entry| entry.renders.load(Ordering::Acquire))
	}

	/// Returns the number of queued updates.
	pub fn pending_updates(&self) -> usize {
		self.inner.queue.lock().len()
	}

	/// Reads the committed value of a state slot.
	///
	/// Returns `None` for unknown components, missing slots, or a type that
	/// does not match the slot. Must not be called from a render of `id`.
	pub fn read_slot<T: Clone + 'static>(&self, id: ComponentId, slot: usize) -> Option<T> {
		let entry = self.inner.lookup(id)?;
		let mounted = entry.mounted.lock();
		mounted.slots.get(slot)?.value.downcast_ref::<T>().cloned()
	}
}
