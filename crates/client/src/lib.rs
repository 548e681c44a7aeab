//! Typed HTTP client for the remote policy service.
//!
//! The service stores named, versioned policy documents and validates
//! candidate policy text. Policy content is opaque to this crate: it travels
//! as plain text through JSON envelopes and is never parsed here.
//!
//! The [`PolicyService`] trait is the seam consumers program against;
//! [`HttpPolicyService`] is the production implementation. Tests substitute
//! in-memory fakes behind the same trait.

mod http;
mod protocol;
mod service;

pub use http::HttpPolicyService;
pub use protocol::{NewPolicyDraft, PolicyKind};
pub use service::{PolicyService, Verdict};

/// A convenient type alias for `Result` with `E` = [`enum@crate::Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Possible errors when talking to the policy service.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
	/// The request never produced a usable response.
	#[error("network error: {0}")]
	Network(String),
	/// The service answered with a non-success status.
	#[error("service returned {status}: {body}")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Response body text, possibly empty.
		body: String,
	},
	/// The response arrived but could not be interpreted.
	#[error("malformed response: {0}")]
	Malformed(String),
	/// The configured base URL cannot be combined with an endpoint path.
	#[error("invalid endpoint url: {0}")]
	Endpoint(#[from] url::ParseError),
}
