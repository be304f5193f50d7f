use std::{
	sync::{
		Arc,
		atomic::{AtomicBool, Ordering},
	},
	time::{Duration, Instant},
};

use crate::{
	Diagnostics, MatchRequest, Result,
	matching::{self, parse_api_error, rejects_temperature},
	transport::{HttpTransport, RawResponse, Transport},
};
use curio_config::MatchingProviderConfig;

/// What the retry loop does after one attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttemptOutcome {
	/// 2xx. The ids may be empty when the content was unreadable.
	Success(Vec<u32>),
	/// Wait, then try again if attempts remain.
	RetryAfter(Duration),
	/// The request shape was adjusted; try again without waiting.
	RetryNow,
	/// Credentials or permissions were refused. Further attempts cannot succeed.
	Abandon,
}

/// Calls one matching endpoint with bounded retries and absorbs every failure into an empty
/// proposal.
pub struct ResilientInvoker {
	cfg: MatchingProviderConfig,
	transport: Arc<dyn Transport>,
	diagnostics: Arc<Diagnostics>,
	include_temperature: AtomicBool,
}
impl ResilientInvoker {
	pub fn new(
		cfg: MatchingProviderConfig,
		transport: Arc<dyn Transport>,
		diagnostics: Arc<Diagnostics>,
	) -> Self {
		let include_temperature = AtomicBool::new(cfg.temperature.is_some());

		Self { cfg, transport, diagnostics, include_temperature }
	}

	pub fn from_config(cfg: MatchingProviderConfig, diagnostics: Arc<Diagnostics>) -> Result<Self> {
		let transport = HttpTransport::new(&cfg)?;

		Ok(Self::new(cfg, Arc::new(transport), diagnostics))
	}

	pub fn provider_id(&self) -> &str {
		&self.cfg.provider_id
	}

	pub fn source_weight(&self) -> u32 {
		self.cfg.source_weight
	}

	pub fn repeats(&self) -> u32 {
		self.cfg.repeats
	}

	/// False once the endpoint has refused a non-default temperature.
	pub fn includes_temperature(&self) -> bool {
		self.include_temperature.load(Ordering::Acquire)
	}

	pub async fn propose(&self, request: &MatchRequest<'_>) -> Vec<u32> {
		let messages = matching::build_messages(request);
		let max_attempts = self.cfg.max_attempts.max(1);
		let mut last_status = None;

		for attempt in 1..=max_attempts {
			let temperature = if self.includes_temperature() { self.cfg.temperature } else { None };
			let body = matching::build_body(&self.cfg.model, &messages, temperature);
			let started = Instant::now();
			let outcome = match self.transport.post(&body).await {
				Ok(response) => {
					last_status = Some(response.status);

					tracing::debug!(
						provider_id = %self.cfg.provider_id,
						attempt,
						status = response.status,
						elapsed_ms = started.elapsed().as_millis() as u64,
						"Matching provider responded."
					);

					self.classify(&response, attempt)
				},
				Err(err) => {
					tracing::debug!(
						provider_id = %self.cfg.provider_id,
						attempt,
						error = %err,
						"Matching provider request failed."
					);

					AttemptOutcome::RetryAfter(self.linear_backoff(attempt))
				},
			};

			match outcome {
				AttemptOutcome::Success(ids) => {
					if self.diagnostics.claim_first_success() {
						tracing::info!(
							provider_id = %self.cfg.provider_id,
							model = %self.cfg.model,
							"Tag matching succeeded."
						);
					}

					return ids;
				},
				AttemptOutcome::Abandon => {
					tracing::warn!(
						provider_id = %self.cfg.provider_id,
						status = ?last_status,
						"Matching provider refused credentials; abandoning call."
					);

					return Vec::new();
				},
				AttemptOutcome::RetryNow => {},
				AttemptOutcome::RetryAfter(delay) =>
					if attempt < max_attempts {
						tokio::time::sleep(delay).await;
					},
			}
		}

		tracing::warn!(
			provider_id = %self.cfg.provider_id,
			attempts = max_attempts,
			status = ?last_status,
			"Matching provider attempts exhausted."
		);

		Vec::new()
	}

	pub fn classify(&self, response: &RawResponse, attempt: u32) -> AttemptOutcome {
		if response.is_success() {
			return match matching::parse_response(&response.body) {
				Ok(ids) => AttemptOutcome::Success(ids),
				Err(err) => {
					tracing::warn!(
						provider_id = %self.cfg.provider_id,
						error = %err,
						"Matching provider returned an unreadable body."
					);

					AttemptOutcome::Success(Vec::new())
				},
			};
		}

		match response.status {
			429 => AttemptOutcome::RetryAfter(self.rate_limit_delay(response.retry_after, attempt)),
			401 | 403 => AttemptOutcome::Abandon,
			400 if self.learn_from_bad_request(&response.body) => AttemptOutcome::RetryNow,
			_ => AttemptOutcome::RetryAfter(self.linear_backoff(attempt)),
		}
	}

	fn learn_from_bad_request(&self, body: &str) -> bool {
		let Some(err) = parse_api_error(body) else {
			return false;
		};

		if self.cfg.temperature.is_some() && rejects_temperature(&err) {
			if self.include_temperature.swap(false, Ordering::AcqRel) {
				tracing::info!(
					provider_id = %self.cfg.provider_id,
					"Matching provider rejects temperature; omitting it from now on."
				);
			}

			return true;
		}

		false
	}

	fn rate_limit_delay(&self, hint: Option<Duration>, attempt: u32) -> Duration {
		if let Some(hint) = hint {
			return hint.min(Duration::from_millis(self.cfg.max_retry_after_ms));
		}

		let factor = 1_u64.checked_shl(attempt.saturating_sub(1)).unwrap_or(u64::MAX);

		Duration::from_millis(self.cfg.rate_limit_backoff_ms.saturating_mul(factor))
	}

	fn linear_backoff(&self, attempt: u32) -> Duration {
		Duration::from_millis(self.cfg.backoff_ms.saturating_mul(u64::from(attempt)))
	}
}
