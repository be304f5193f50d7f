use std::path::PathBuf;

use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub catalog: CatalogSource,
	#[serde(default)]
	pub search: Search,
	#[serde(default)]
	pub providers: Providers,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CatalogSource {
	/// JSON snapshot holding tags, topics, resources and their weighted tag associations.
	pub path: PathBuf,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Search {
	pub min_text_chars: u32,
	pub max_text_chars: u32,
	pub default_max_results: u32,
	pub max_results_cap: u32,
	/// Upper bound on the list size requested from a matching provider.
	pub max_interest_tags: u32,
	pub default_language: String,
	pub default_explain: bool,
	/// Deadline for the whole matching phase of one request. Expiry triggers the deterministic
	/// fallback.
	pub request_timeout_ms: u64,
}
impl Default for Search {
	fn default() -> Self {
		Self {
			min_text_chars: 12,
			max_text_chars: 2_048,
			default_max_results: 200,
			max_results_cap: 200,
			max_interest_tags: 15,
			default_language: "en".to_string(),
			default_explain: true,
			request_timeout_ms: 120_000,
		}
	}
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Providers {
	/// Evaluated in declaration order; each entry casts `repeats` weighted votes per request.
	#[serde(default)]
	pub matching: Vec<MatchingProviderConfig>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct MatchingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	#[serde(default)]
	pub api_key: String,
	#[serde(default = "default_chat_path")]
	pub path: String,
	pub model: String,
	#[serde(default = "default_temperature")]
	pub temperature: Option<f32>,
	#[serde(default = "default_timeout_ms")]
	pub timeout_ms: u64,
	#[serde(default = "default_max_attempts")]
	pub max_attempts: u32,
	#[serde(default = "default_repeats")]
	pub repeats: u32,
	#[serde(default = "default_source_weight")]
	pub source_weight: u32,
	#[serde(default = "default_backoff_ms")]
	pub backoff_ms: u64,
	#[serde(default = "default_rate_limit_backoff_ms")]
	pub rate_limit_backoff_ms: u64,
	#[serde(default = "default_max_retry_after_ms")]
	pub max_retry_after_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}
impl MatchingProviderConfig {
	/// A provider without credentials never reaches the network.
	pub fn is_dry_run(&self) -> bool {
		self.api_key.trim().is_empty()
	}
}

fn default_chat_path() -> String {
	"/v1/chat/completions".to_string()
}

fn default_temperature() -> Option<f32> {
	Some(0.2)
}

fn default_timeout_ms() -> u64 {
	30_000
}

fn default_max_attempts() -> u32 {
	3
}

fn default_repeats() -> u32 {
	1
}

fn default_source_weight() -> u32 {
	3
}

fn default_backoff_ms() -> u64 {
	500
}

fn default_rate_limit_backoff_ms() -> u64 {
	1_000
}

fn default_max_retry_after_ms() -> u64 {
	30_000
}
