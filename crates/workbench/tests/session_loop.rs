//! Integration tests for the session loop against a scripted in-memory
//! service.
//!
//! The fake service returns canned registry data and lets each test gate
//! individual validation round trips, so completion order is fully under
//! test control — that is what exercises the staleness rule.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::oneshot;
use vellum_client::{Error, NewPolicyDraft, PolicyKind, PolicyService, Verdict};
use vellum_workbench::{PolicyId, Session, ValidationStatus};

type GatedOutcome = oneshot::Receiver<vellum_client::Result<Verdict>>;

/// Scripted policy service.
///
/// Validation: a gated text blocks until the test releases its channel; a
/// text listed in `rejections` rejects immediately; everything else is
/// accepted immediately.
#[derive(Default)]
struct ScriptedService {
	policy_ids: Option<Vec<String>>,
	contents: HashMap<String, String>,
	rejections: HashMap<String, String>,
	gates: Mutex<HashMap<String, GatedOutcome>>,
	stored_id: Option<String>,
}

impl ScriptedService {
	fn new() -> Self {
		Self::default()
	}

	fn with_ids(mut self, ids: &[&str]) -> Self {
		self.policy_ids = Some(ids.iter().map(ToString::to_string).collect());
		self
	}

	fn with_content(mut self, id: &str, text: &str) -> Self {
		self.contents.insert(id.to_string(), text.to_string());
		self
	}

	fn with_rejection(mut self, text: &str, detail: &str) -> Self {
		self.rejections.insert(text.to_string(), detail.to_string());
		self
	}

	fn with_gate(mut self, text: &str) -> (Self, oneshot::Sender<vellum_client::Result<Verdict>>) {
		let (release, gate) = oneshot::channel();
		self.gates
			.get_mut()
			.expect("gates lock")
			.insert(text.to_string(), gate);
		(self, release)
	}

	fn with_stored_id(mut self, id: &str) -> Self {
		self.stored_id = Some(id.to_string());
		self
	}
}

#[async_trait]
impl PolicyService for ScriptedService {
	async fn list_policy_ids(&self) -> vellum_client::Result<Option<Vec<String>>> {
		Ok(self.policy_ids.clone())
	}

	async fn fetch_policy(&self, id: &str) -> vellum_client::Result<String> {
		self.contents.get(id).cloned().ok_or_else(|| Error::Status {
			status: 500,
			body: format!("no policy {id}"),
		})
	}

	async fn create_policy(&self, _draft: &NewPolicyDraft) -> vellum_client::Result<String> {
		self.stored_id.clone().ok_or_else(|| Error::Status {
			status: 500,
			body: "create failed".into(),
		})
	}

	async fn update_policy(&self, _text: &str) -> vellum_client::Result<String> {
		self.stored_id.clone().ok_or_else(|| Error::Status {
			status: 500,
			body: "update failed".into(),
		})
	}

	async fn validate_policy(&self, text: &str) -> vellum_client::Result<Verdict> {
		let gate = self.gates.lock().expect("gates lock").remove(text);
		if let Some(gate) = gate {
			return gate.await.expect("test released the gate");
		}
		if let Some(detail) = self.rejections.get(text) {
			return Ok(Verdict::Rejected {
				detail: detail.clone(),
			});
		}
		Ok(Verdict::Accepted)
	}
}

fn session_over(service: ScriptedService) -> Session {
	Session::new(Arc::new(service))
}

#[tokio::test]
async fn test_initial_refresh_selects_first_policy_and_loads_it() {
	let service = ScriptedService::new()
		.with_ids(&["p1", "p2"])
		.with_content("p1", "text one");
	let mut session = session_over(service);

	session.refresh_policies().await.expect("refresh");

	assert_eq!(
		session.registry().ids(),
		&[PolicyId::from("p1"), PolicyId::from("p2")]
	);
	assert_eq!(session.registry().selected(), Some(&PolicyId::from("p1")));
	assert_eq!(session.buffer().text(), "text one");
}

#[tokio::test]
async fn test_null_id_list_leaves_registry_untouched() {
	let service = ScriptedService::new().with_content("p1", "one");
	let mut session = session_over(service);

	session.refresh_policies().await.expect("refresh");

	assert!(session.registry().is_empty());
	assert_eq!(session.registry().selected(), None);
	assert_eq!(session.buffer().text(), "");
}

#[tokio::test]
async fn test_rejected_validation_disables_save() {
	let service = ScriptedService::new()
		.with_rejection("kind: resource\nname: bad", "missing apiVersion");
	let mut session = session_over(service);

	session.note_edit("kind: resource\nname: bad".into());
	assert!(session.pump_one().await, "verdict applies");

	assert_eq!(
		session.validation_status(),
		&ValidationStatus::Invalid {
			detail: "missing apiVersion".into()
		}
	);
	assert!(!session.snapshot().can_save);
}

#[tokio::test]
async fn test_superseded_validation_result_is_discarded() {
	let (service, release_old) = ScriptedService::new().with_gate("text a");
	let (service, release_new) = service.with_gate("text b");
	let mut session = session_over(service);

	session.note_edit("text a".into());
	session.note_edit("text b".into());

	// The newer request completes first and wins.
	release_new.send(Ok(Verdict::Accepted)).expect("release");
	assert!(session.pump_one().await);
	assert!(session.validation_status().is_valid());
	assert!(session.snapshot().can_save);

	// The failure for the old text arrives afterwards and must be
	// discarded entirely: no status change, no error detail.
	release_old
		.send(Ok(Verdict::Rejected {
			detail: "stale failure".into(),
		}))
		.expect("release");
	assert!(!session.pump_one().await);
	assert!(session.validation_status().is_valid());
	assert!(session.snapshot().can_save);
}

#[tokio::test]
async fn test_validation_transport_failure_keeps_status() {
	let (service, release) = ScriptedService::new().with_gate("text");
	let mut session = session_over(service);

	session.note_edit("text".into());
	release
		.send(Err(Error::Network("connection refused".into())))
		.expect("release");

	assert!(!session.pump_one().await);
	assert!(session.validation_status().is_valid());
}

#[tokio::test]
async fn test_create_appends_selects_and_loads() {
	let service = ScriptedService::new()
		.with_ids(&["p1"])
		.with_content("p1", "one")
		.with_content("n.v1", "created content")
		.with_stored_id("n.v1");
	let mut session = session_over(service);
	session.refresh_policies().await.expect("refresh");

	let draft = NewPolicyDraft {
		policy_kind: PolicyKind::Resource,
		name: "n".into(),
		version: "v1".into(),
		scope: "s".into(),
	};
	let id = session.create_policy(&draft).await.expect("create");

	assert_eq!(id, PolicyId::from("n.v1"));
	assert_eq!(
		session.registry().ids(),
		&[PolicyId::from("p1"), PolicyId::from("n.v1")]
	);
	assert_eq!(session.registry().selected(), Some(&PolicyId::from("n.v1")));
	assert_eq!(session.buffer().text(), "created content");
}

#[tokio::test]
async fn test_failed_create_changes_nothing_and_keeps_draft() {
	let service = ScriptedService::new()
		.with_ids(&["p1"])
		.with_content("p1", "one");
	let mut session = session_over(service);
	session.refresh_policies().await.expect("refresh");

	let draft = NewPolicyDraft {
		policy_kind: PolicyKind::Principal,
		name: "n".into(),
		version: String::new(),
		scope: String::new(),
	};
	let result = session.create_policy(&draft).await;

	assert!(result.is_err());
	assert_eq!(session.registry().ids(), &[PolicyId::from("p1")]);
	assert_eq!(session.registry().selected(), Some(&PolicyId::from("p1")));
	// The borrowed draft is still in the caller's hands for another try.
	assert_eq!(draft.name, "n");
}

#[tokio::test]
async fn test_save_adopts_returned_id_like_create() {
	let service = ScriptedService::new()
		.with_ids(&["p1"])
		.with_content("p1", "one")
		.with_content("p1.v2", "versioned")
		.with_stored_id("p1.v2");
	let mut session = session_over(service);
	session.refresh_policies().await.expect("refresh");

	session.note_edit("one, improved".into());
	let id = session.save().await.expect("save");

	assert_eq!(id, PolicyId::from("p1.v2"));
	assert_eq!(
		session.registry().ids(),
		&[PolicyId::from("p1"), PolicyId::from("p1.v2")]
	);
	assert_eq!(session.registry().selected(), Some(&PolicyId::from("p1.v2")));
	assert_eq!(session.buffer().text(), "versioned");
}

#[tokio::test]
async fn test_save_returning_known_id_does_not_duplicate() {
	let service = ScriptedService::new()
		.with_ids(&["p1"])
		.with_content("p1", "one")
		.with_stored_id("p1");
	let mut session = session_over(service);
	session.refresh_policies().await.expect("refresh");

	session.note_edit("one, improved".into());
	let id = session.save().await.expect("save");

	assert_eq!(id, PolicyId::from("p1"));
	assert_eq!(session.registry().ids(), &[PolicyId::from("p1")]);
	assert_eq!(session.buffer().text(), "one");
}

#[tokio::test]
async fn test_selection_change_discards_unsaved_edits() {
	let service = ScriptedService::new()
		.with_ids(&["p1", "p2"])
		.with_content("p1", "one")
		.with_content("p2", "two");
	let mut session = session_over(service);
	session.refresh_policies().await.expect("refresh");

	session.note_edit("one, locally changed".into());
	assert!(session.buffer().is_dirty());

	session.select(PolicyId::from("p2")).await.expect("select");

	assert_eq!(session.buffer().text(), "two");
	assert!(!session.buffer().is_dirty());
}

#[tokio::test]
async fn test_failed_content_load_keeps_previous_buffer() {
	let service = ScriptedService::new()
		.with_ids(&["p1", "ghost"])
		.with_content("p1", "one");
	let mut session = session_over(service);
	session.refresh_policies().await.expect("refresh");

	let result = session.select(PolicyId::from("ghost")).await;

	assert!(result.is_err());
	// Stale but visible beats a blank editor.
	assert_eq!(session.buffer().text(), "one");
	assert_eq!(session.registry().selected(), Some(&PolicyId::from("ghost")));
}

#[tokio::test]
async fn test_drain_applies_pending_completions() {
	let service = ScriptedService::new().with_rejection("bad", "nope");
	let mut session = session_over(service);

	session.note_edit("bad".into());
	// Let the spawned round trip finish before draining.
	tokio::task::yield_now().await;
	while session.drain_events() == 0 {
		tokio::task::yield_now().await;
	}

	assert_eq!(
		session.validation_status(),
		&ValidationStatus::Invalid {
			detail: "nope".into()
		}
	);
}
