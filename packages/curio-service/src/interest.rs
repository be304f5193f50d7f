use std::{collections::HashSet, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{
	CurioService, Error, Result, TopicSummary,
	aggregate::{self, RankedProposal},
	scoring,
};
use curio_domain::{LanguageCode, TagId, TagWeight, WeightCurve};
use curio_providers::MatchRequest;

#[derive(Clone, Debug, Deserialize)]
pub struct InterestSearchRequest {
	pub interests_text: String,
	#[serde(default)]
	pub language: Option<String>,
	#[serde(default)]
	pub max_results: Option<u32>,
	#[serde(default)]
	pub explain_matches: Option<bool>,
}

#[derive(Clone, Debug, Serialize)]
pub struct InterestSearchResponse {
	pub interests_text: String,
	pub used_language: String,
	/// True when no provider produced a usable proposal and the deterministic selection was used.
	pub fallback: bool,
	pub matched_tags: Vec<InterestMatchedTag>,
	pub topics: Vec<InterestTopicScore>,
}

#[derive(Clone, Debug, Serialize)]
pub struct InterestMatchedTag {
	pub tag_id: TagId,
	pub label: String,
	pub interest_weight: TagWeight,
}

#[derive(Clone, Debug, Serialize)]
pub struct InterestTopicScore {
	pub topic: TopicSummary,
	pub score: u32,
	pub matched_tags: Vec<TopicContribution>,
}

#[derive(Clone, Debug, Serialize)]
pub struct TopicContribution {
	pub tag_id: TagId,
	pub label: String,
	pub interest_weight: TagWeight,
	pub topic_weight: TagWeight,
	pub contribution: u32,
}

struct ValidatedSearch {
	text: String,
	language: LanguageCode,
	max_results: usize,
	explain: bool,
	text_chars: usize,
}

impl CurioService {
	pub async fn interest_search(
		&self,
		req: InterestSearchRequest,
	) -> Result<InterestSearchResponse> {
		let search = self.validate_search(req)?;
		let requested_max = self.cfg.search.max_interest_tags as usize;
		let curve = WeightCurve::resolve(search.text_chars, requested_max)?;

		tracing::debug!(
			text_chars = search.text_chars,
			layer = curve.layer,
			requested_list_size = curve.requested_list_size,
			cutoff = curve.cutoff(),
			"Resolved weight curve."
		);

		let (interest_weights, fallback) = self.match_interest_tags(&search, &curve).await;
		let matched_tags = self.matched_tags(&interest_weights);
		let mut topics: Vec<InterestTopicScore> = self
			.catalog
			.topics()
			.iter()
			.map(|topic| {
				let weights = self.catalog.topic_weights(&topic.id);
				let score =
					scoring::score_entity(&self.catalog, &interest_weights, weights, search.explain);

				InterestTopicScore {
					topic: TopicSummary::from_topic(&self.catalog, topic),
					score: score.total,
					matched_tags: score
						.contributions
						.into_iter()
						.map(|c| TopicContribution {
							tag_id: c.tag_id,
							label: c.label,
							interest_weight: c.query_weight,
							topic_weight: c.entity_weight,
							contribution: c.contribution,
						})
						.collect(),
				}
			})
			.collect();

		topics.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.topic.id.cmp(&b.topic.id)));
		topics.truncate(search.max_results);

		Ok(InterestSearchResponse {
			interests_text: search.text,
			used_language: search.language.as_str().to_string(),
			fallback,
			matched_tags,
			topics,
		})
	}

	fn validate_search(&self, req: InterestSearchRequest) -> Result<ValidatedSearch> {
		let limits = &self.cfg.search;
		let text = req.interests_text.trim().to_string();
		let text_chars = text.chars().count();

		if text_chars < limits.min_text_chars as usize || text_chars > limits.max_text_chars as usize
		{
			return Err(Error::invalid_field(
				"interests_text",
				format!(
					"interests_text must be between {} and {} characters.",
					limits.min_text_chars, limits.max_text_chars
				),
			));
		}

		let language = match req.language.as_deref().map(str::trim) {
			Some(raw) if !raw.is_empty() => LanguageCode::parse(raw)
				.map_err(|err| Error::invalid_field("language", err.to_string()))?,
			_ => LanguageCode::parse(&limits.default_language)?,
		};
		let max_results = match req.max_results {
			None => limits.default_max_results,
			Some(value) if (1..=limits.max_results_cap).contains(&value) => value,
			Some(_) => {
				return Err(Error::invalid_field(
					"max_results",
					format!("max_results must be in the range 1-{}.", limits.max_results_cap),
				));
			},
		};

		Ok(ValidatedSearch {
			text,
			language,
			max_results: max_results as usize,
			explain: req.explain_matches.unwrap_or(limits.default_explain),
			text_chars,
		})
	}

	/// Returns the weighted interest tags and whether the deterministic fallback produced them.
	async fn match_interest_tags(
		&self,
		search: &ValidatedSearch,
		curve: &WeightCurve,
	) -> (Vec<(TagId, TagWeight)>, bool) {
		let candidates = self.catalog.tags();

		if candidates.is_empty() {
			tracing::warn!("Tag catalog is empty; no interest tags can be matched.");

			return (Vec::new(), false);
		}
		if self.is_dry_run() && self.diagnostics.claim_dry_run() {
			tracing::info!("No matching provider is active; interest tags use the fallback.");
		}

		let deadline = Duration::from_millis(self.cfg.search.request_timeout_ms);
		let proposals = match tokio::time::timeout(deadline, self.collect_proposals(search, curve))
			.await
		{
			Ok(proposals) => proposals,
			Err(_) => {
				tracing::warn!(
					timeout_ms = self.cfg.search.request_timeout_ms,
					"Tag matching timed out; discarding partial proposals."
				);

				Vec::new()
			},
		};

		if proposals.is_empty() {
			if self.diagnostics.claim_fallback() {
				tracing::warn!("No matching provider produced tags; using deterministic fallback.");
			}

			let fallback = aggregate::deterministic_proposal(candidates, curve);

			return (aggregate::assign_weights(&fallback, curve), true);
		}

		let consensus = aggregate::merge_ranked(&proposals);

		tracing::debug!(
			proposals = proposals.len(),
			consensus = consensus.len(),
			"Aggregated matching proposals."
		);

		(aggregate::assign_weights(&consensus, curve), false)
	}

	async fn collect_proposals(
		&self,
		search: &ValidatedSearch,
		curve: &WeightCurve,
	) -> Vec<RankedProposal> {
		let candidates = self.catalog.tags();
		let valid: HashSet<TagId> = candidates.iter().map(|tag| tag.id()).collect();
		let request = MatchRequest {
			interest_text: &search.text,
			language: search.language.as_str(),
			candidates,
			requested_list_size: curve.requested_list_size,
		};
		let mut proposals = Vec::new();

		for source in &self.sources {
			for repeat in 0..source.repeats {
				let raw = source.provider.propose(&request).await;
				let tag_ids = aggregate::sanitize(&raw, &valid, curve.requested_list_size);

				tracing::debug!(
					provider_id = %source.provider_id,
					repeat,
					raw = raw.len(),
					kept = tag_ids.len(),
					"Collected matching proposal."
				);

				if !tag_ids.is_empty() {
					proposals.push(RankedProposal { source_weight: source.source_weight, tag_ids });
				}
			}
		}

		proposals
	}

	fn matched_tags(&self, weights: &[(TagId, TagWeight)]) -> Vec<InterestMatchedTag> {
		let mut matched: Vec<InterestMatchedTag> = weights
			.iter()
			.map(|(tag_id, weight)| InterestMatchedTag {
				tag_id: *tag_id,
				label: self.catalog.label(*tag_id),
				interest_weight: *weight,
			})
			.collect();

		matched.sort_by(|a, b| b.interest_weight.cmp(&a.interest_weight));

		matched
	}
}
