use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::{Catalog, CurioService, Error, Result, scoring};
use curio_domain::{Tag, TagId, TagWeight, Topic, TopicId};

const MAX_SIMILAR_TOPICS: usize = 25;
const DEFAULT_MAX_LAYER: u32 = 2;

/// Filters and ordering for the topic listing. Query keys are camelCase.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicListQuery {
	/// Defaults to 2.
	pub max_layer: Option<u32>,
	/// Defaults to true.
	pub show_courses: Option<bool>,
	/// Defaults to false.
	pub show_achievements: Option<bool>,
	/// `name` (default, case-insensitive), `layer` or `id`.
	pub sort_by: Option<String>,
	/// `asc` (default) or `desc`.
	pub sort_direction: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TopicSortKey {
	Name,
	Layer,
	Id,
}
impl TopicSortKey {
	fn parse(raw: Option<&str>) -> Result<Self> {
		match raw.map(|value| value.trim().to_ascii_lowercase()).as_deref() {
			None | Some("name") => Ok(Self::Name),
			Some("layer") => Ok(Self::Layer),
			Some("id") => Ok(Self::Id),
			Some(_) =>
				Err(Error::invalid_field("sortBy", "Invalid sortBy. Allowed: name,layer,id.")),
		}
	}

	fn compare(self, a: &Topic, b: &Topic) -> Ordering {
		match self {
			Self::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
			Self::Layer => a.layer.cmp(&b.layer),
			Self::Id => a.id.cmp(&b.id),
		}
	}
}

fn parse_descending(raw: Option<&str>) -> Result<bool> {
	match raw.map(|value| value.trim().to_ascii_lowercase()).as_deref() {
		None | Some("asc") => Ok(false),
		Some("desc") => Ok(true),
		Some(_) =>
			Err(Error::invalid_field("sortDirection", "Invalid sortDirection. Allowed: asc,desc.")),
	}
}

#[derive(Clone, Debug, Serialize)]
pub struct TagView {
	pub id: TagId,
	pub label: String,
	pub synonyms: Vec<String>,
}
impl From<&Tag> for TagView {
	fn from(tag: &Tag) -> Self {
		Self {
			id: tag.id(),
			label: tag.primary_label().to_string(),
			synonyms: tag.synonyms().to_vec(),
		}
	}
}

#[derive(Clone, Debug, Serialize)]
pub struct TagListResponse {
	pub items: Vec<TagView>,
	pub total: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct TopicSummary {
	pub id: TopicId,
	pub name: String,
	pub layer: u32,
	pub tags: Vec<TagView>,
}
impl TopicSummary {
	pub fn from_topic(catalog: &Catalog, topic: &Topic) -> Self {
		Self {
			id: topic.id.clone(),
			name: topic.name.clone(),
			layer: topic.layer,
			tags: catalog.topic_tags(&topic.id).into_iter().map(TagView::from).collect(),
		}
	}
}

#[derive(Clone, Debug, Serialize)]
pub struct TopicListResponse {
	pub items: Vec<TopicSummary>,
	pub total: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TopicCandidate {
	pub id: TopicId,
	pub name: String,
	pub layer: u32,
}
impl From<&Topic> for TopicCandidate {
	fn from(topic: &Topic) -> Self {
		Self { id: topic.id.clone(), name: topic.name.clone(), layer: topic.layer }
	}
}

#[derive(Clone, Debug, Serialize)]
pub struct ResourceContribution {
	pub tag_id: TagId,
	pub label: String,
	pub topic_weight: TagWeight,
	pub resource_weight: TagWeight,
	pub contribution: u32,
}

#[derive(Clone, Debug, Serialize)]
pub struct ScoredResource {
	pub id: u32,
	pub title: String,
	pub url: Option<String>,
	pub score: u32,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub matched_tags: Vec<ResourceContribution>,
}

#[derive(Clone, Debug, Serialize)]
pub struct TopicDetails {
	#[serde(flatten)]
	pub summary: TopicSummary,
	pub resources: Vec<ScoredResource>,
	pub similar_topics: Vec<TopicCandidate>,
}

/// Outcome of a case-insensitive topic lookup.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TopicResolution {
	Exact { topic: Box<TopicDetails> },
	Ambiguous { candidates: Vec<TopicCandidate> },
}

impl CurioService {
	pub fn list_tags(&self) -> TagListResponse {
		let items: Vec<TagView> = self.catalog.tags().iter().map(TagView::from).collect();

		TagListResponse { total: items.len(), items }
	}

	/// Topics up to `max_layer`, optionally without courses or achievements. Equal sort keys keep
	/// id order in both directions.
	pub fn list_topics(&self, query: &TopicListQuery) -> Result<TopicListResponse> {
		let sort_key = TopicSortKey::parse(query.sort_by.as_deref())?;
		let descending = parse_descending(query.sort_direction.as_deref())?;
		let max_layer = query.max_layer.unwrap_or(DEFAULT_MAX_LAYER);
		let show_courses = query.show_courses.unwrap_or(true);
		let show_achievements = query.show_achievements.unwrap_or(false);
		let mut topics: Vec<&Topic> = self
			.catalog
			.topics()
			.iter()
			.filter(|topic| topic.layer <= max_layer)
			.filter(|topic| show_courses || !topic.id.is_course())
			.filter(|topic| show_achievements || !topic.id.is_achievement())
			.collect();

		topics.sort_by(|a, b| {
			let ordering = sort_key.compare(a, b);

			if descending { ordering.reverse() } else { ordering }
		});

		let items: Vec<TopicSummary> = topics
			.into_iter()
			.map(|topic| TopicSummary::from_topic(&self.catalog, topic))
			.collect();

		Ok(TopicListResponse { total: items.len(), items })
	}

	/// Resolves `raw_id` ignoring case. One match yields its details. Several matches yield the
	/// candidates, even when one of them is spelled exactly like `raw_id`.
	pub fn topic_details(&self, raw_id: &str, explain: Option<bool>) -> Result<TopicResolution> {
		let raw_id = raw_id.trim();

		if raw_id.is_empty() {
			return Err(Error::invalid_field("topic_id", "topic_id must not be empty."));
		}

		let explain = explain.unwrap_or(self.cfg.search.default_explain);
		let matches = self.catalog.topics_matching(raw_id);
		let topic = match matches.as_slice() {
			[only] => *only,
			[] =>
				return Err(Error::NotFound { message: format!("Topic {raw_id} does not exist.") }),
			many =>
				return Ok(TopicResolution::Ambiguous {
					candidates: many.iter().map(|topic| TopicCandidate::from(*topic)).collect(),
				}),
		};

		Ok(TopicResolution::Exact { topic: Box::new(self.describe_topic(topic, explain)) })
	}

	fn describe_topic(&self, topic: &Topic, explain: bool) -> TopicDetails {
		let weights = self.catalog.topic_weights(&topic.id);
		let mut resources: Vec<ScoredResource> = self
			.catalog
			.resources()
			.iter()
			.filter(|resource| resource.active)
			.filter_map(|resource| {
				let score = scoring::score_entity(
					&self.catalog,
					weights,
					self.catalog.resource_weights(resource.id),
					explain,
				);

				if score.total == 0 {
					return None;
				}

				let mut matched_tags: Vec<ResourceContribution> = score
					.contributions
					.into_iter()
					.map(|c| ResourceContribution {
						tag_id: c.tag_id,
						label: c.label,
						topic_weight: c.query_weight,
						resource_weight: c.entity_weight,
						contribution: c.contribution,
					})
					.collect();

				matched_tags.sort_by(|a, b| b.contribution.cmp(&a.contribution));

				Some(ScoredResource {
					id: resource.id,
					title: resource.title.clone(),
					url: resource.url.clone(),
					score: score.total,
					matched_tags,
				})
			})
			.collect();

		resources.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.id.cmp(&b.id)));

		let stem = topic.id.stem();
		let similar_topics = self
			.catalog
			.topics()
			.iter()
			.filter(|other| other.id != topic.id && other.id.stem() == stem)
			.take(MAX_SIMILAR_TOPICS)
			.map(TopicCandidate::from)
			.collect();

		TopicDetails {
			summary: TopicSummary::from_topic(&self.catalog, topic),
			resources,
			similar_topics,
		}
	}
}
