use std::sync::atomic::{AtomicBool, Ordering};

/// Once-only log gates shared by every invoker and search of one process.
#[derive(Debug, Default)]
pub struct Diagnostics {
	dry_run: AtomicBool,
	first_success: AtomicBool,
	fallback: AtomicBool,
}
impl Diagnostics {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns true exactly once.
	pub fn claim_dry_run(&self) -> bool {
		!self.dry_run.swap(true, Ordering::AcqRel)
	}

	/// Returns true exactly once.
	pub fn claim_first_success(&self) -> bool {
		!self.first_success.swap(true, Ordering::AcqRel)
	}

	/// Returns true exactly once.
	pub fn claim_fallback(&self) -> bool {
		!self.fallback.swap(true, Ordering::AcqRel)
	}
}
