use std::time::Duration;

use reqwest::{Client, header::RETRY_AFTER};
use serde_json::Value;

use crate::{BoxFuture, Result};
use curio_config::MatchingProviderConfig;

/// A completed HTTP exchange, whatever its status.
#[derive(Clone, Debug)]
pub struct RawResponse {
	pub status: u16,
	/// Delay hint taken from a numeric `Retry-After` header.
	pub retry_after: Option<Duration>,
	pub body: String,
}
impl RawResponse {
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

/// Sends one JSON request to a matching endpoint. An `Err` means no response arrived at all.
pub trait Transport
where
	Self: Send + Sync,
{
	fn post<'a>(&'a self, body: &'a Value) -> BoxFuture<'a, Result<RawResponse>>;
}

pub struct HttpTransport {
	client: Client,
	url: String,
	headers: reqwest::header::HeaderMap,
}
impl HttpTransport {
	pub fn new(cfg: &MatchingProviderConfig) -> Result<Self> {
		let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
		let url = format!("{}{}", cfg.api_base, cfg.path);
		let headers = crate::auth_headers(&cfg.api_key, &cfg.default_headers)?;

		Ok(Self { client, url, headers })
	}

	async fn send(&self, body: &Value) -> Result<RawResponse> {
		let res = self.client.post(&self.url).headers(self.headers.clone()).json(body).send().await?;
		let status = res.status().as_u16();
		let retry_after = res
			.headers()
			.get(RETRY_AFTER)
			.and_then(|value| value.to_str().ok())
			.and_then(parse_retry_after);
		let body = res.text().await?;

		Ok(RawResponse { status, retry_after, body })
	}
}
impl Transport for HttpTransport {
	fn post<'a>(&'a self, body: &'a Value) -> BoxFuture<'a, Result<RawResponse>> {
		Box::pin(self.send(body))
	}
}

/// Accepts delta-seconds, including fractional values. HTTP dates are ignored.
pub fn parse_retry_after(raw: &str) -> Option<Duration> {
	let seconds = raw.trim().parse::<f64>().ok()?;

	if !seconds.is_finite() || seconds < 0.0 {
		return None;
	}

	Some(Duration::from_secs_f64(seconds))
}
