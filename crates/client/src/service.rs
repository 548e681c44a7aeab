//! The collaborator seam for the policy service.

use async_trait::async_trait;

use crate::Result;
use crate::protocol::NewPolicyDraft;

/// Outcome of submitting text to the validation endpoint.
///
/// A rejection is a normal outcome, not an error: the service examined the
/// text and found it wanting. Transport failures surface as [`crate::Error`]
/// instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
	/// The service accepted the text as a well-formed policy.
	Accepted,
	/// The service rejected the text.
	Rejected {
		/// Verbatim human-readable explanation from the service.
		detail: String,
	},
}

/// Operations the policy service offers to the editing loop.
///
/// Object-safe so sessions can hold `Arc<dyn PolicyService>` and tests can
/// substitute scripted fakes.
#[async_trait]
pub trait PolicyService: Send + Sync {
	/// Fetch all known policy identifiers.
	///
	/// `Ok(None)` reflects a `null` identifier list from the service and
	/// means "no change", not "empty registry".
	async fn list_policy_ids(&self) -> Result<Option<Vec<String>>>;

	/// Fetch the content of one policy as opaque text.
	async fn fetch_policy(&self, id: &str) -> Result<String>;

	/// Create a policy from draft attributes, returning its identifier.
	async fn create_policy(&self, draft: &NewPolicyDraft) -> Result<String>;

	/// Store policy text, returning the identifier it was stored under.
	///
	/// The service derives the identifier from the content, so this may be
	/// the identifier already selected or a new version identifier.
	async fn update_policy(&self, text: &str) -> Result<String>;

	/// Ask the service whether `text` is a well-formed policy.
	async fn validate_policy(&self, text: &str) -> Result<Verdict>;
}
