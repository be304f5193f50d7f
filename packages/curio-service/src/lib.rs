pub mod aggregate;
pub mod catalog;
pub mod interest;
pub mod resources;
pub mod scoring;
pub mod topics;

mod error;

pub use aggregate::RankedProposal;
pub use catalog::Catalog;
pub use error::{Error, Result};
pub use interest::{
	InterestMatchedTag, InterestSearchRequest, InterestSearchResponse, InterestTopicScore,
	TopicContribution,
};
pub use resources::ResourceSummary;
pub use scoring::{Contribution, EntityScore};
pub use topics::{
	ResourceContribution, ScoredResource, TagListResponse, TagView, TopicCandidate, TopicDetails,
	TopicListQuery, TopicListResponse, TopicResolution, TopicSummary,
};

use std::{future::Future, pin::Pin, sync::Arc};

use curio_config::Config;
use curio_providers::{Diagnostics, MatchRequest, ResilientInvoker};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Produces one ranked list of raw tag ids for an interest text. Failures surface as an empty list.
pub trait TagMatchProvider
where
	Self: Send + Sync,
{
	fn propose<'a>(&'a self, request: &'a MatchRequest<'a>) -> BoxFuture<'a, Vec<u32>>;
}

/// A configured provider together with how often it is asked and how much its ranking counts.
#[derive(Clone)]
pub struct MatchingSource {
	pub provider_id: String,
	pub repeats: u32,
	pub source_weight: u32,
	pub provider: Arc<dyn TagMatchProvider>,
}
impl MatchingSource {
	pub fn from_invoker(invoker: ResilientInvoker) -> Self {
		Self {
			provider_id: invoker.provider_id().to_string(),
			repeats: invoker.repeats(),
			source_weight: invoker.source_weight(),
			provider: Arc::new(invoker),
		}
	}
}

pub struct CurioService {
	pub cfg: Config,
	pub catalog: Arc<Catalog>,
	pub sources: Vec<MatchingSource>,
	pub diagnostics: Arc<Diagnostics>,
}
impl CurioService {
	/// Builds one resilient invoker per configured provider. Providers without an API key are
	/// skipped, and a service with no sources always uses the deterministic fallback.
	pub fn new(cfg: Config, catalog: Catalog) -> Result<Self> {
		let diagnostics = Arc::new(Diagnostics::new());
		let mut sources = Vec::new();

		for provider in &cfg.providers.matching {
			if provider.is_dry_run() {
				tracing::info!(
					provider_id = %provider.provider_id,
					"Matching provider has no API key; skipping it."
				);

				continue;
			}

			let invoker = ResilientInvoker::from_config(provider.clone(), diagnostics.clone())?;

			sources.push(MatchingSource::from_invoker(invoker));
		}

		Ok(Self::with_sources(cfg, catalog, sources, diagnostics))
	}

	pub fn with_sources(
		cfg: Config,
		catalog: Catalog,
		sources: Vec<MatchingSource>,
		diagnostics: Arc<Diagnostics>,
	) -> Self {
		Self { cfg, catalog: Arc::new(catalog), sources, diagnostics }
	}

	pub fn is_dry_run(&self) -> bool {
		self.sources.iter().all(|source| source.repeats == 0)
	}
}

impl TagMatchProvider for ResilientInvoker {
	fn propose<'a>(&'a self, request: &'a MatchRequest<'a>) -> BoxFuture<'a, Vec<u32>> {
		Box::pin(ResilientInvoker::propose(self, request))
	}
}
