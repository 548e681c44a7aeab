//! Wire types for the policy service HTTP contract.

use serde::{Deserialize, Serialize};

/// Kind of policy document understood by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PolicyKind {
	/// Access rules for a resource type.
	Resource,
	/// Overrides scoped to a single principal.
	Principal,
	/// Reusable role definitions derived from conditions.
	DerivedRole,
}

/// Attributes for a policy that does not exist yet.
///
/// Composed by the creation form and consumed on submit. The service fills
/// in defaults for empty fields (an empty `version` becomes `"default"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPolicyDraft {
	/// Kind of policy to create.
	pub policy_kind: PolicyKind,
	/// Policy name.
	pub name: String,
	/// Policy version, may be empty.
	pub version: String,
	/// Policy scope, may be empty.
	pub scope: String,
}

/// Response of `GET /policies`.
///
/// A `null` identifier list is meaningful: it signals "nothing to report",
/// which callers must treat as no change rather than an empty registry.
#[derive(Debug, Deserialize)]
pub(crate) struct ListPolicyIdsResponse {
	#[serde(rename = "policyIds", default)]
	pub policy_ids: Option<Vec<String>>,
}

/// Response of `GET /policy?id=<id>`.
#[derive(Debug, Deserialize)]
pub(crate) struct GetPoliciesResponse {
	pub policies: Vec<String>,
}

/// Response of `POST /policy` and `PATCH /policy`.
#[derive(Debug, Deserialize)]
pub(crate) struct PolicyKeyResponse {
	pub id: String,
}

/// Request body of `PATCH /policy` and `PATCH /validate`.
#[derive(Debug, Serialize)]
pub(crate) struct PolicyBody<'a> {
	pub policy: &'a str,
}
