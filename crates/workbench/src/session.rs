//! Session wiring for the editing and validation loop.
//!
//! A [`Session`] owns the registry, the buffer, and the validation
//! synchronizer, and is the only place that mutates them. All operations
//! run on the caller's (single) driver context: registry refresh, selection
//! loads, create and save suspend only the calling operation. Validation
//! runs as spawned tasks — one per edit, arbitrarily many in flight — whose
//! completions come back over an mpsc channel and are applied by
//! [`drain_events`](Session::drain_events), where the ticket rule decides
//! which completion is still relevant.
//!
//! Failure handling is uniformly "log, keep prior state": a failed refresh
//! keeps the current registry, a failed content load keeps the previous
//! buffer visible, a failed create or save changes nothing and waits for
//! the user to try again. Nothing here is fatal.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};
use vellum_client::{NewPolicyDraft, PolicyService, Verdict};

use crate::buffer::EditableBuffer;
use crate::registry::{PolicyId, PolicyRegistry};
use crate::validate::{Ticket, ValidationStatus, ValidationSynchronizer};
use crate::{Error, Result};

/// Completion of a background round trip, applied by the session driver.
#[derive(Debug)]
pub enum SessionEvent {
	/// A validation round trip finished, successfully or not.
	ValidationFinished {
		/// Ticket taken when the request was submitted.
		ticket: Ticket,
		/// Service verdict, or the transport error that prevented one.
		outcome: vellum_client::Result<Verdict>,
	},
}

/// Immutable view of session state for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
	/// Known policy identifiers in display order.
	pub policy_ids: Vec<PolicyId>,
	/// Currently selected identifier.
	pub selected: Option<PolicyId>,
	/// Current buffer text.
	pub buffer: String,
	/// Authoritative validity of the buffer text.
	pub status: ValidationStatus,
	/// Whether the save action should be offered.
	pub can_save: bool,
}

/// The policy editing and validation synchronization loop.
pub struct Session {
	service: Arc<dyn PolicyService>,
	registry: PolicyRegistry,
	buffer: EditableBuffer,
	validation: ValidationSynchronizer,
	events: mpsc::UnboundedSender<SessionEvent>,
	inbox: mpsc::UnboundedReceiver<SessionEvent>,
}

impl Session {
	/// Create a session over the given service with empty state.
	#[must_use]
	pub fn new(service: Arc<dyn PolicyService>) -> Self {
		let (events, inbox) = mpsc::unbounded_channel();
		Self {
			service,
			registry: PolicyRegistry::new(),
			buffer: EditableBuffer::new(),
			validation: ValidationSynchronizer::new(),
			events,
			inbox,
		}
	}

	/// The registry of known identifiers.
	#[must_use]
	pub fn registry(&self) -> &PolicyRegistry {
		&self.registry
	}

	/// The editable buffer.
	#[must_use]
	pub fn buffer(&self) -> &EditableBuffer {
		&self.buffer
	}

	/// The authoritative validity state.
	#[must_use]
	pub fn validation_status(&self) -> &ValidationStatus {
		self.validation.status()
	}

	/// Snapshot the observable state for the rendering layer.
	#[must_use]
	pub fn snapshot(&self) -> SessionSnapshot {
		SessionSnapshot {
			policy_ids: self.registry.ids().to_vec(),
			selected: self.registry.selected().cloned(),
			buffer: self.buffer.text().to_owned(),
			status: self.validation.status().clone(),
			can_save: self.validation.status().is_valid(),
		}
	}

	/// Fetch the known identifiers and reconcile the registry.
	///
	/// An absent (`null`) identifier list is "no change", never an
	/// empty-state reset. When the refresh establishes a selection whose
	/// content is not what the buffer holds, the content is loaded.
	pub async fn refresh_policies(&mut self) -> Result<()> {
		let fetched = match self.service.list_policy_ids().await {
			Ok(fetched) => fetched,
			Err(err) => {
				warn!(error = %err, "policy list refresh failed; keeping current registry");
				return Err(err.into());
			}
		};
		let Some(ids) = fetched else {
			debug!("policy list absent; keeping current registry");
			return Ok(());
		};

		self.registry
			.replace_all(ids.into_iter().map(PolicyId::new).collect());

		if let Some(id) = self.registry.selected().cloned()
			&& self.buffer.loaded_for() != Some(&id)
		{
			// Load failure keeps the previous buffer visible; already logged.
			let _ = self.load_content(id).await;
		}
		Ok(())
	}

	/// Select a policy and load its content into the buffer.
	///
	/// Selection change is destructive: unsaved edits are discarded without
	/// confirmation once the content arrives. Membership is not validated
	/// here; an unknown identifier surfaces as a failed content load.
	pub async fn select(&mut self, id: PolicyId) -> Result<()> {
		self.registry.select(id.clone());
		self.load_content(id).await
	}

	/// Record a user edit and submit it for validation.
	///
	/// Fire-and-forget from the input surface's point of view: the request
	/// runs in the background and its completion is applied by
	/// [`drain_events`](Self::drain_events).
	pub fn note_edit(&mut self, text: String) {
		self.buffer.edit(text);
		self.submit_validation();
	}

	/// Create a policy from draft attributes.
	///
	/// On success the returned identifier joins the registry, becomes
	/// selected, and its content is loaded. On failure the caller keeps the
	/// draft (the creation form stays open) and nothing changes here.
	pub async fn create_policy(&mut self, draft: &NewPolicyDraft) -> Result<PolicyId> {
		match self.service.create_policy(draft).await {
			Ok(id) => {
				let id = PolicyId::new(id);
				self.adopt(id.clone()).await;
				Ok(id)
			}
			Err(err) => {
				warn!(name = %draft.name, error = %err, "policy creation failed");
				Err(err.into())
			}
		}
	}

	/// Persist the current buffer text.
	///
	/// The rendering layer gates this on [`ValidationStatus::Valid`]; the
	/// gate is not re-checked here. The service may store the text under
	/// the identifier already selected or under a new version identifier —
	/// both are adopted identically.
	pub async fn save(&mut self) -> Result<PolicyId> {
		let text = self.buffer.text().to_owned();
		match self.service.update_policy(&text).await {
			Ok(id) => {
				let id = PolicyId::new(id);
				self.adopt(id.clone()).await;
				Ok(id)
			}
			Err(err) => {
				warn!(error = %err, "policy save failed");
				Err(err.into())
			}
		}
	}

	/// Apply all background completions that have arrived so far.
	///
	/// Returns how many of them changed observable state.
	pub fn drain_events(&mut self) -> usize {
		let mut applied = 0;
		while let Ok(event) = self.inbox.try_recv() {
			if self.handle_event(event) {
				applied += 1;
			}
		}
		applied
	}

	/// Wait for the next background completion and apply it.
	///
	/// Returns whether it changed observable state.
	pub async fn pump_one(&mut self) -> bool {
		match self.inbox.recv().await {
			Some(event) => self.handle_event(event),
			None => false,
		}
	}

	fn handle_event(&mut self, event: SessionEvent) -> bool {
		match event {
			SessionEvent::ValidationFinished { ticket, outcome } => match outcome {
				Ok(verdict) => self.validation.apply(&ticket, verdict),
				Err(err) => {
					// Transport failure, not a rejection: the status keeps
					// reflecting the last completed relevant check.
					warn!(serial = ticket.serial(), error = %err, "validation round trip failed");
					false
				}
			},
		}
	}

	/// Adopt an identifier returned by a successful create or update:
	/// append, select, and cascade a content load.
	async fn adopt(&mut self, id: PolicyId) {
		self.registry.append(id.clone());
		// Load failure keeps the previous buffer visible; already logged.
		let _ = self.load_content(id).await;
	}

	async fn load_content(&mut self, id: PolicyId) -> Result<()> {
		match self.service.fetch_policy(id.as_str()).await {
			Ok(text) => {
				self.buffer.load(id, text);
				// Freshly loaded content goes through validation too, so
				// the displayed status always tracks the displayed text.
				self.submit_validation();
				Ok(())
			}
			Err(err) => {
				warn!(policy = %id, error = %err, "content load failed; keeping previous buffer");
				Err(Error::Service(err))
			}
		}
	}

	fn submit_validation(&mut self) {
		let ticket = self.validation.submit();
		let text = self.buffer.text().to_owned();
		let service = Arc::clone(&self.service);
		let events = self.events.clone();
		tokio::spawn(async move {
			let outcome = service.validate_policy(&text).await;
			// The session may be gone by the time the round trip ends.
			let _ = events.send(SessionEvent::ValidationFinished { ticket, outcome });
		});
	}
}

impl std::fmt::Debug for Session {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Session")
			.field("registry", &self.registry)
			.field("buffer", &self.buffer)
			.field("validation", &self.validation)
			.finish_non_exhaustive()
	}
}
