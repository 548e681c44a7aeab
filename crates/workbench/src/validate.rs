//! Latest-submission arbitration for asynchronous validation results.
//!
//! Edits arrive faster than validation round trips complete, so completions
//! can arrive in any order. Every submission takes a monotonically
//! increasing ticket; a completion is applied only if its ticket is still
//! the latest one handed out. Everything older is discarded without
//! touching the displayed status, so a stale confirmation can never flicker
//! the validity away from what a more recent in-flight request will
//! determine.
//!
//! This is debounce-by-relevance rather than debounce-by-time: every edit
//! submits, only the newest submission may win. Superseded requests are not
//! cancelled; discarding their completions is sufficient.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;
use vellum_client::Verdict;

/// Server-confirmed validity of the buffer text.
///
/// Always reflects the most recently completed validation whose submitted
/// text is the most recently sent text. Starts out [`Valid`](Self::Valid),
/// matching an empty buffer with nothing to complain about yet.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ValidationStatus {
	/// The service accepted the text.
	#[default]
	Valid,
	/// The service rejected the text.
	Invalid {
		/// Verbatim error detail from the service, displayed as-is.
		detail: String,
	},
}

impl ValidationStatus {
	/// Whether the save action may be offered.
	#[must_use]
	pub fn is_valid(&self) -> bool {
		matches!(self, Self::Valid)
	}
}

/// Identifies one validation submission.
///
/// Carried alongside the request and compared against the shared latest
/// serial when the response comes back.
#[derive(Debug, Clone)]
pub struct Ticket {
	serial: u64,
	latest: Arc<AtomicU64>,
}

impl Ticket {
	/// Whether this submission is still the most recent one.
	#[must_use]
	pub fn is_current(&self) -> bool {
		self.serial == self.latest.load(Ordering::Acquire)
	}

	/// The submission serial, for diagnostics.
	#[must_use]
	pub fn serial(&self) -> u64 {
		self.serial
	}
}

/// Arbitrates overlapping validation round trips.
#[derive(Debug, Default)]
pub struct ValidationSynchronizer {
	latest: Arc<AtomicU64>,
	status: ValidationStatus,
}

impl ValidationSynchronizer {
	/// Create a synchronizer with no submissions and a [`Valid`] status.
	///
	/// [`Valid`]: ValidationStatus::Valid
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// The authoritative validity state.
	#[must_use]
	pub fn status(&self) -> &ValidationStatus {
		&self.status
	}

	/// Register a new submission, superseding all earlier ones.
	pub fn submit(&self) -> Ticket {
		let serial = self.latest.fetch_add(1, Ordering::AcqRel) + 1;
		Ticket {
			serial,
			latest: Arc::clone(&self.latest),
		}
	}

	/// Apply a completed round trip.
	///
	/// Returns `true` if the verdict became the authoritative status, or
	/// `false` if the ticket was superseded and the completion discarded
	/// in full — neither status nor detail is taken from a stale response.
	pub fn apply(&mut self, ticket: &Ticket, verdict: Verdict) -> bool {
		if !ticket.is_current() {
			debug!(serial = ticket.serial, "discarding superseded validation result");
			return false;
		}
		self.status = match verdict {
			Verdict::Accepted => ValidationStatus::Valid,
			Verdict::Rejected { detail } => ValidationStatus::Invalid { detail },
		};
		true
	}
}
