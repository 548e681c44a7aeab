//! The locally held, user-editable text for the selected policy.

use crate::registry::PolicyId;

/// Owned text record backing the editor surface.
///
/// The rendering layer displays this text and reports keystrokes back as
/// whole-text edits; it never owns policy state itself. Selection change
/// replaces the content wholesale and discards unsaved edits — destructive
/// by design, there is no draft preservation across identifiers.
#[derive(Debug, Default)]
pub struct EditableBuffer {
	text: String,
	loaded_for: Option<PolicyId>,
	dirty: bool,
}

impl EditableBuffer {
	/// Create an empty buffer associated with no policy.
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Current buffer content.
	#[must_use]
	pub fn text(&self) -> &str {
		&self.text
	}

	/// The policy the current content was loaded for, if any.
	#[must_use]
	pub fn loaded_for(&self) -> Option<&PolicyId> {
		self.loaded_for.as_ref()
	}

	/// Whether the content has been edited since it was loaded.
	#[must_use]
	pub fn is_dirty(&self) -> bool {
		self.dirty
	}

	/// Replace the whole buffer with server content for `id`.
	pub fn load(&mut self, id: PolicyId, text: String) {
		self.text = text;
		self.loaded_for = Some(id);
		self.dirty = false;
	}

	/// Record a user edit as the new current content.
	pub fn edit(&mut self, text: String) {
		self.text = text;
		self.dirty = true;
	}
}
