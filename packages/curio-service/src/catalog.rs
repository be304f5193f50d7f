use std::{
	collections::HashMap,
	fs,
	path::Path,
};

use serde::Deserialize;

use crate::{Error, Result};
use curio_domain::{Resource, ResourceTag, Tag, TagId, TagWeight, Topic, TopicId, TopicTag};

/// Tag ids with their association weights, in catalog order.
pub type TagWeights = Vec<(TagId, TagWeight)>;

#[derive(Debug, Deserialize)]
struct CatalogDocument {
	tags: Vec<Tag>,
	#[serde(default)]
	topics: Vec<Topic>,
	#[serde(default)]
	resources: Vec<Resource>,
	#[serde(default)]
	topic_tags: Vec<TopicTag>,
	#[serde(default)]
	resource_tags: Vec<ResourceTag>,
}

/// Immutable snapshot of the catalog shared by every request.
#[derive(Debug, Default)]
pub struct Catalog {
	tags: Vec<Tag>,
	tag_index: HashMap<TagId, usize>,
	topics: Vec<Topic>,
	topic_index: HashMap<TopicId, usize>,
	topics_by_lower_id: HashMap<String, Vec<usize>>,
	resources: Vec<Resource>,
	resource_index: HashMap<u32, usize>,
	topic_weights: HashMap<TopicId, TagWeights>,
	resource_weights: HashMap<u32, TagWeights>,
}
impl Catalog {
	pub fn load(path: &Path) -> Result<Self> {
		let raw = fs::read_to_string(path).map_err(|err| Error::Catalog {
			message: format!("Failed to read catalog at {path:?}: {err}."),
		})?;

		Self::from_json_str(&raw)
	}

	pub fn from_json_str(raw: &str) -> Result<Self> {
		let doc: CatalogDocument = serde_json::from_str(raw)
			.map_err(|err| Error::Catalog { message: format!("Failed to parse catalog: {err}.") })?;

		Self::from_parts(doc.tags, doc.topics, doc.resources, doc.topic_tags, doc.resource_tags)
	}

	pub fn from_parts(
		mut tags: Vec<Tag>,
		mut topics: Vec<Topic>,
		mut resources: Vec<Resource>,
		topic_tags: Vec<TopicTag>,
		resource_tags: Vec<ResourceTag>,
	) -> Result<Self> {
		tags.sort_by_key(|tag| tag.id());
		topics.sort_by(|a, b| a.id.cmp(&b.id));
		resources.sort_by_key(|resource| resource.id);

		let mut tag_index = HashMap::with_capacity(tags.len());

		for (index, tag) in tags.iter().enumerate() {
			if tag_index.insert(tag.id(), index).is_some() {
				return Err(duplicate("tag", tag.id()));
			}
		}

		let mut topic_index = HashMap::with_capacity(topics.len());
		let mut topics_by_lower_id: HashMap<String, Vec<usize>> = HashMap::new();

		for (index, topic) in topics.iter().enumerate() {
			if topic_index.insert(topic.id.clone(), index).is_some() {
				return Err(duplicate("topic", &topic.id));
			}

			topics_by_lower_id.entry(topic.id.as_str().to_lowercase()).or_default().push(index);
		}

		let mut resource_index = HashMap::with_capacity(resources.len());

		for (index, resource) in resources.iter().enumerate() {
			if resource_index.insert(resource.id, index).is_some() {
				return Err(duplicate("resource", resource.id));
			}
		}

		let mut topic_weights: HashMap<TopicId, TagWeights> = HashMap::new();

		for link in topic_tags {
			if !topic_index.contains_key(&link.topic_id) {
				return Err(dangling("topic_tags", "topic", &link.topic_id));
			}
			if !tag_index.contains_key(&link.tag_id) {
				return Err(dangling("topic_tags", "tag", link.tag_id));
			}

			let weights = topic_weights.entry(link.topic_id.clone()).or_default();

			if weights.iter().any(|(tag_id, _)| *tag_id == link.tag_id) {
				return Err(Error::Catalog {
					message: format!(
						"topic_tags links topic {} to tag {} more than once.",
						link.topic_id, link.tag_id
					),
				});
			}

			weights.push((link.tag_id, link.weight));
		}

		let mut resource_weights: HashMap<u32, TagWeights> = HashMap::new();

		for link in resource_tags {
			if !resource_index.contains_key(&link.resource_id) {
				return Err(dangling("resource_tags", "resource", link.resource_id));
			}
			if !tag_index.contains_key(&link.tag_id) {
				return Err(dangling("resource_tags", "tag", link.tag_id));
			}

			let weights = resource_weights.entry(link.resource_id).or_default();

			if weights.iter().any(|(tag_id, _)| *tag_id == link.tag_id) {
				return Err(Error::Catalog {
					message: format!(
						"resource_tags links resource {} to tag {} more than once.",
						link.resource_id, link.tag_id
					),
				});
			}

			weights.push((link.tag_id, link.weight));
		}

		Ok(Self {
			tags,
			tag_index,
			topics,
			topic_index,
			topics_by_lower_id,
			resources,
			resource_index,
			topic_weights,
			resource_weights,
		})
	}

	/// All tags, ordered by id.
	pub fn tags(&self) -> &[Tag] {
		&self.tags
	}

	pub fn tag(&self, id: TagId) -> Option<&Tag> {
		self.tag_index.get(&id).map(|index| &self.tags[*index])
	}

	/// All topics, ordered by id.
	pub fn topics(&self) -> &[Topic] {
		&self.topics
	}

	pub fn topic(&self, id: &TopicId) -> Option<&Topic> {
		self.topic_index.get(id).map(|index| &self.topics[*index])
	}

	/// Topics whose id equals `raw` ignoring case, ordered by id.
	pub fn topics_matching(&self, raw: &str) -> Vec<&Topic> {
		self.topics_by_lower_id
			.get(&raw.trim().to_lowercase())
			.map(|indexes| indexes.iter().map(|index| &self.topics[*index]).collect())
			.unwrap_or_default()
	}

	/// All resources, ordered by id.
	pub fn resources(&self) -> &[Resource] {
		&self.resources
	}

	pub fn resource(&self, id: u32) -> Option<&Resource> {
		self.resource_index.get(&id).map(|index| &self.resources[*index])
	}

	pub fn topic_weights(&self, id: &TopicId) -> &[(TagId, TagWeight)] {
		self.topic_weights.get(id).map(Vec::as_slice).unwrap_or_default()
	}

	pub fn resource_weights(&self, id: u32) -> &[(TagId, TagWeight)] {
		self.resource_weights.get(&id).map(Vec::as_slice).unwrap_or_default()
	}

	pub fn topic_tags(&self, id: &TopicId) -> Vec<&Tag> {
		self.topic_weights(id).iter().filter_map(|(tag_id, _)| self.tag(*tag_id)).collect()
	}

	pub fn label(&self, id: TagId) -> String {
		self.tag(id).map(|tag| tag.primary_label().to_string()).unwrap_or_else(|| format!("tag#{id}"))
	}
}

fn duplicate(kind: &str, id: impl std::fmt::Display) -> Error {
	Error::Catalog { message: format!("Duplicate {kind} id {id}.") }
}

fn dangling(table: &str, kind: &str, id: impl std::fmt::Display) -> Error {
	Error::Catalog { message: format!("{table} references unknown {kind} {id}.") }
}
