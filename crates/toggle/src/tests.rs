use std::sync::Arc;

use flip_host::{ComponentId, Host, HostConfig, Scope, Setter};
use parking_lot::Mutex;
use proptest::prelude::*;
use rstest::rstest;

use super::*;

/// A mounted component holding one toggle.
struct Harness {
	host: Host,
	id: ComponentId,
	seen: Arc<Mutex<Vec<bool>>>,
	handles: Arc<Mutex<Option<(Toggle, SetToggle)>>>,
}

impl Harness {
	fn mount(host: &Host, initial: Option<bool>) -> Self {
		let seen = Arc::new(Mutex::new(Vec::new()));
		let handles = Arc::new(Mutex::new(None));
		let (seen_in, handles_in) = (Arc::clone(&seen), Arc::clone(&handles));
		let id = host
			.mount(move |cx: &mut Scope<'_>| {
				let (value, toggle, set) = match initial {
					Some(initial) => use_toggle_with(cx, initial),
					None => use_toggle(cx),
				};
				seen_in.lock().push(value);
				*handles_in.lock() = Some((toggle, set));
			})
			.unwrap();
		Self {
			host: host.clone(),
			id,
			seen,
			handles,
		}
	}

	fn new(initial: bool) -> Self {
		Self::mount(&Host::default(), Some(initial))
	}

	fn toggle(&self) -> Toggle {
		self.handles.lock().as_ref().unwrap().0.clone()
	}

	fn setter(&self) -> SetToggle {
		self.handles.lock().as_ref().unwrap().1.clone()
	}

	/// Value observed by the most recent render.
	fn value(&self) -> bool {
		*self.seen.lock().last().unwrap()
	}

	fn renders(&self) -> usize {
		self.seen.lock().len()
	}

	fn flush(&self) {
		self.host.flush().unwrap();
	}
}

#[test]
fn test_default_is_false() {
	let harness = Harness::mount(&Host::default(), None);
	assert!(!harness.value());
}

#[rstest]
fn test_initial_value(#[values(true, false)] initial: bool) {
	assert_eq!(Harness::new(initial).value(), initial);
}

#[rstest]
fn test_single_toggle_negates(#[values(true, false)] initial: bool) {
	let harness = Harness::new(initial);
	harness.toggle().toggle();
	harness.flush();
	assert_eq!(harness.value(), !initial);
}

#[rstest]
fn test_double_toggle_restores(#[values(true, false)] initial: bool) {
	let harness = Harness::new(initial);
	let toggle = harness.toggle();

	toggle.toggle();
	harness.flush();
	toggle.toggle();
	harness.flush();

	assert_eq!(harness.value(), initial);
	assert_eq!(*harness.seen.lock(), vec![initial, !initial, initial]);
}

#[test]
fn test_toggle_from_true() {
	let harness = Harness::new(true);
	harness.toggle().toggle();
	harness.flush();
	assert!(!harness.value());
}

#[test]
fn test_set_then_toggle() {
	let harness = Harness::new(false);
	harness.setter().set(true);
	harness.toggle().toggle();
	harness.flush();
	assert!(!harness.value());
}

#[test]
fn test_repeated_set_is_idempotent() {
	let harness = Harness::new(false);
	let set = harness.setter();

	set.set(true);
	harness.flush();
	let renders = harness.renders();

	set.set(true);
	let report = harness.host.flush().unwrap();

	assert!(harness.value());
	assert_eq!(report.unchanged, 1);
	assert_eq!(harness.renders(), renders);
}

#[test]
fn test_queued_toggles_apply_to_latest_value() {
	let harness = Harness::new(false);
	let toggle = harness.toggle();

	toggle.toggle();
	toggle.toggle();
	toggle.toggle();
	harness.flush();

	assert!(harness.value());
	assert_eq!(harness.renders(), 2);
}

#[test]
fn test_functional_set() {
	let harness = Harness::new(true);
	let set = harness.setter();
	set.update(|value| !value);
	harness.flush();
	assert!(!harness.value());

	harness.toggle().toggle();
	set.update(|value| value);
	harness.flush();
	assert!(harness.value());
}

#[test]
fn test_cells_are_independent() {
	let host = Host::default();
	let a = Harness::mount(&host, Some(false));
	let b = Harness::mount(&host, Some(false));

	a.toggle().toggle();
	host.flush().unwrap();

	assert!(a.value());
	assert!(!b.value());
	assert_eq!(b.renders(), 1);
}

#[test]
fn test_two_toggles_in_one_component_are_independent() {
	let host = Host::default();
	let seen = Arc::new(Mutex::new((false, false)));
	let first = Arc::new(Mutex::new(None));
	let (seen_in, first_in) = (Arc::clone(&seen), Arc::clone(&first));
	let id = host
		.mount(move |cx: &mut Scope<'_>| {
			let (a, toggle_a, _) = use_toggle(cx);
			let (b, _, _) = use_toggle_with(cx, true);
			*seen_in.lock() = (a, b);
			*first_in.lock() = Some(toggle_a);
		})
		.unwrap();

	first.lock().as_ref().unwrap().toggle();
	host.flush().unwrap();

	assert_eq!(*seen.lock(), (true, true));
	assert_eq!(host.read_slot::<bool>(id, 0), Some(true));
	assert_eq!(host.read_slot::<bool>(id, 1), Some(true));
}

#[test]
fn test_handles_are_stable_across_renders() {
	let harness = Harness::new(false);
	let before = (harness.toggle(), harness.setter());

	harness.toggle().toggle();
	harness.flush();

	assert_eq!(harness.toggle(), before.0);
	assert_eq!(harness.setter(), before.1);
	assert_eq!(before.0.component(), harness.id);
	assert_eq!(Setter::from(before.1).component(), harness.id);
}

#[test]
fn test_toggle_after_unmount_is_ignored() {
	let harness = Harness::new(false);
	let toggle = harness.toggle();
	harness.host.unmount(harness.id).unwrap();

	toggle.toggle();
	let report = harness.host.flush().unwrap();

	assert_eq!(report.discarded, 1);
	assert_eq!(harness.renders(), 1);
}

#[test]
fn test_immediate_mode_toggles_synchronously() {
	let harness = Harness::mount(&Host::new(HostConfig::immediate()), Some(false));
	harness.toggle().toggle();
	assert!(harness.value());
	harness.toggle().toggle();
	assert!(!harness.value());
}

#[test]
fn test_toggle_renders_when_sibling_render_fails() {
	let host = Host::default();
	let broken = Arc::new(Mutex::new(None));
	let broken_in = Arc::clone(&broken);
	host.mount(move |cx: &mut Scope<'_>| {
		let (on, _, set) = use_toggle(cx);
		if on {
			use_toggle(cx);
		}
		*broken_in.lock() = Some(set);
	})
	.unwrap();
	let harness = Harness::mount(&host, Some(false));

	broken.lock().as_ref().unwrap().set(true);
	harness.toggle().toggle();
	assert!(host.flush().is_err());

	assert!(harness.value());
	assert_eq!(harness.renders(), 2);
	assert!(host.flush().unwrap().is_empty());
}

#[derive(Debug, Clone, Copy)]
enum Op {
	Toggle,
	Set(bool),
	Flush,
}

fn op() -> impl Strategy<Value = Op> {
	prop_oneof![Just(Op::Toggle), any::<bool>().prop_map(Op::Set), Just(Op::Flush)]
}

proptest! {
	#[test]
	fn prop_toggle_parity(initial in any::<bool>(), count in 0usize..16) {
		let harness = Harness::new(initial);
		let toggle = harness.toggle();
		for _ in 0..count {
			toggle.toggle();
		}
		harness.flush();
		prop_assert_eq!(harness.value(), initial ^ (count % 2 == 1));
	}

	#[test]
	fn prop_matches_model(initial in any::<bool>(), ops in prop::collection::vec(op(), 0..32)) {
		let harness = Harness::new(initial);
		let (toggle, set) = (harness.toggle(), harness.setter());
		let mut committed = initial;
		let mut pending = initial;
		for op in ops {
			match op {
				Op::Toggle => {
					toggle.toggle();
					pending = !pending;
				}
				Op::Set(value) => {
					set.set(value);
					pending = value;
				}
				Op::Flush => {
					harness.flush();
					committed = pending;
				}
			}
			prop_assert_eq!(harness.value(), committed);
		}
		harness.flush();
		prop_assert_eq!(harness.value(), pending);
	}
}
