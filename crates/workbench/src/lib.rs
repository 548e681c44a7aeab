//! Client-side policy editing and validation synchronization loop.
//!
//! This crate keeps three pieces of state mutually consistent under
//! continuous, asynchronous user edits:
//!
//! - the ordered set of known policy identifiers and the current selection
//!   ([`registry`]),
//! - the locally edited text buffer ([`buffer`]),
//! - the server-confirmed validity of that text ([`validate`]).
//!
//! [`session`] wires them to a [`vellum_client::PolicyService`]:
//!
//! ```text
//! ┌───────────┐  edits   ┌─────────┐  submit   ┌────────────────┐
//! │ Frontend  │─────────▶│ Session │──────────▶│ Policy Service │
//! │ (glue)    │◀─────────│         │◀──────────│    (remote)    │
//! └───────────┘ snapshot └─────────┘  events   └────────────────┘
//! ```
//!
//! The frontend is a pure consumer/producer of events against the session;
//! it owns no policy state of its own.

pub mod buffer;
pub mod registry;
pub mod session;
pub mod validate;

pub use buffer::EditableBuffer;
pub use registry::{PolicyId, PolicyRegistry};
pub use session::{Session, SessionEvent, SessionSnapshot};
pub use validate::{Ticket, ValidationStatus, ValidationSynchronizer};

/// A convenient type alias for `Result` with `E` = [`enum@crate::Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Possible errors from session operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
	/// The policy service call failed; local state is unchanged.
	#[error(transparent)]
	Service(#[from] vellum_client::Error),
}
