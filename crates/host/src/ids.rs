use std::fmt;

/// Identifier of a mounted component instance.
///
/// Ids are allocated monotonically per [`Host`](crate::Host) and never reused,
/// so a stale id cannot alias a later mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(pub(crate) u64);

impl ComponentId {
	/// Returns the raw id value.
	pub const fn get(self) -> u64 {
		self.0
	}
}

impl fmt::Display for ComponentId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "component#{}", self.0)
	}
}
