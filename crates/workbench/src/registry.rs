//! Ordered set of known policy identifiers and the current selection.

use std::collections::HashSet;
use std::fmt;

/// Opaque identifier of a policy held by the service.
///
/// Identifiers are unique within the registry and display in discovery
/// order: the order the service first reported them, then creation order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PolicyId(String);

impl PolicyId {
	/// Wrap an identifier string.
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	/// The identifier as a string slice.
	#[must_use]
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for PolicyId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for PolicyId {
	fn from(id: &str) -> Self {
		Self::new(id)
	}
}

/// Discovery-ordered policy identifiers plus the current selection.
///
/// The selection, when present, is always a member of the sequence as long
/// as [`select`](Self::select) is only called with identifiers the registry
/// reported; membership is deliberately not checked there, because the
/// service is the source of truth and a bad identifier surfaces as a failed
/// content load downstream.
#[derive(Debug, Default)]
pub struct PolicyRegistry {
	ids: Vec<PolicyId>,
	selected: Option<PolicyId>,
}

impl PolicyRegistry {
	/// Create an empty registry with no selection.
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// All known identifiers in display order.
	#[must_use]
	pub fn ids(&self) -> &[PolicyId] {
		&self.ids
	}

	/// The currently selected identifier, if any.
	#[must_use]
	pub fn selected(&self) -> Option<&PolicyId> {
		self.selected.as_ref()
	}

	/// Whether `id` is a known identifier.
	#[must_use]
	pub fn contains(&self, id: &PolicyId) -> bool {
		self.ids.contains(id)
	}

	/// Number of known identifiers.
	#[must_use]
	pub fn len(&self) -> usize {
		self.ids.len()
	}

	/// Whether the registry holds no identifiers.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.ids.is_empty()
	}

	/// Replace the identifier sequence with a freshly fetched one.
	///
	/// Duplicates are dropped, keeping first-occurrence order. If nothing
	/// was selected and the new sequence is non-empty, the first identifier
	/// becomes selected; a previously selected identifier that is no longer
	/// present falls back the same way.
	pub fn replace_all(&mut self, ids: Vec<PolicyId>) {
		let mut seen = HashSet::new();
		self.ids = ids.into_iter().filter(|id| seen.insert(id.clone())).collect();
		let selection_valid = self
			.selected
			.as_ref()
			.is_some_and(|id| self.ids.contains(id));
		if !selection_valid {
			self.selected = self.ids.first().cloned();
		}
	}

	/// Set the selection without membership validation.
	pub fn select(&mut self, id: PolicyId) {
		self.selected = Some(id);
	}

	/// Record an identifier returned by a successful create or update and
	/// select it.
	///
	/// A new identifier is appended at the end; existing identifiers are
	/// never removed or reordered. An identifier that is already known is
	/// selected without growing the sequence.
	pub fn append(&mut self, id: PolicyId) {
		if !self.ids.contains(&id) {
			self.ids.push(id.clone());
		}
		self.selected = Some(id);
	}
}
