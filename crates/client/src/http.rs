//! `reqwest`-backed implementation of the service contract.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::protocol::{
	GetPoliciesResponse, ListPolicyIdsResponse, NewPolicyDraft, PolicyBody, PolicyKeyResponse,
};
use crate::service::{PolicyService, Verdict};
use crate::{Error, Result};

/// Defensive per-request timeout; the contract itself imposes none.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for a policy service instance.
///
/// Endpoint paths are joined onto the base URL, so a base with a path
/// component should end with `/`.
#[derive(Debug, Clone)]
pub struct HttpPolicyService {
	base: Url,
	client: Client,
}

impl HttpPolicyService {
	/// Create a client for the service at `base`.
	#[must_use]
	pub fn new(base: Url) -> Self {
		Self {
			base,
			client: Client::new(),
		}
	}

	fn endpoint(&self, path: &str) -> Result<Url> {
		Ok(self.base.join(path)?)
	}

	/// Fetch the most recent access log entries as plain text.
	///
	/// Diagnostic extra outside the editing loop, hence not part of
	/// [`PolicyService`].
	pub async fn fetch_audit_log(&self) -> Result<String> {
		let response = self
			.client
			.get(self.endpoint("auditlog")?)
			.timeout(REQUEST_TIMEOUT)
			.send()
			.await
			.map_err(|e| Error::Network(e.to_string()))?;
		let response = check_status(response).await?;
		response
			.text()
			.await
			.map_err(|e| Error::Malformed(e.to_string()))
	}
}

/// Turn a non-success response into [`Error::Status`], keeping the body text.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
	let status = response.status();
	if status.is_success() {
		return Ok(response);
	}
	let body = response.text().await.unwrap_or_default();
	Err(Error::Status {
		status: status.as_u16(),
		body: body.trim_end().to_string(),
	})
}

#[async_trait]
impl PolicyService for HttpPolicyService {
	async fn list_policy_ids(&self) -> Result<Option<Vec<String>>> {
		let response = self
			.client
			.get(self.endpoint("policies")?)
			.timeout(REQUEST_TIMEOUT)
			.send()
			.await
			.map_err(|e| Error::Network(e.to_string()))?;
		let response = check_status(response).await?;
		let parsed: ListPolicyIdsResponse = response
			.json()
			.await
			.map_err(|e| Error::Malformed(e.to_string()))?;
		Ok(parsed.policy_ids)
	}

	async fn fetch_policy(&self, id: &str) -> Result<String> {
		let response = self
			.client
			.get(self.endpoint("policy")?)
			.query(&[("id", id)])
			.timeout(REQUEST_TIMEOUT)
			.send()
			.await
			.map_err(|e| Error::Network(e.to_string()))?;
		let response = check_status(response).await?;
		let parsed: GetPoliciesResponse = response
			.json()
			.await
			.map_err(|e| Error::Malformed(e.to_string()))?;
		parsed
			.policies
			.into_iter()
			.next()
			.ok_or_else(|| Error::Malformed("empty policies array".into()))
	}

	async fn create_policy(&self, draft: &NewPolicyDraft) -> Result<String> {
		let response = self
			.client
			.post(self.endpoint("policy")?)
			.json(draft)
			.timeout(REQUEST_TIMEOUT)
			.send()
			.await
			.map_err(|e| Error::Network(e.to_string()))?;
		let response = check_status(response).await?;
		let parsed: PolicyKeyResponse = response
			.json()
			.await
			.map_err(|e| Error::Malformed(e.to_string()))?;
		Ok(parsed.id)
	}

	async fn update_policy(&self, text: &str) -> Result<String> {
		let response = self
			.client
			.patch(self.endpoint("policy")?)
			.json(&PolicyBody { policy: text })
			.timeout(REQUEST_TIMEOUT)
			.send()
			.await
			.map_err(|e| Error::Network(e.to_string()))?;
		let response = check_status(response).await?;
		let parsed: PolicyKeyResponse = response
			.json()
			.await
			.map_err(|e| Error::Malformed(e.to_string()))?;
		Ok(parsed.id)
	}

	async fn validate_policy(&self, text: &str) -> Result<Verdict> {
		let response = self
			.client
			.patch(self.endpoint("validate")?)
			.json(&PolicyBody { policy: text })
			.timeout(REQUEST_TIMEOUT)
			.send()
			.await
			.map_err(|e| Error::Network(e.to_string()))?;

		let status = response.status();
		if status.is_success() {
			return Ok(Verdict::Accepted);
		}

		// A rejection carries the explanation as the response body. A
		// non-success status with an empty body is a transport failure.
		let body = response.text().await.unwrap_or_default();
		let detail = body.trim_end().to_string();
		if detail.is_empty() {
			return Err(Error::Status {
				status: status.as_u16(),
				body: detail,
			});
		}
		debug!(status = status.as_u16(), "validation rejected");
		Ok(Verdict::Rejected { detail })
	}
}
