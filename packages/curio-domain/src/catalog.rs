use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{Error, Result, TagId, TagWeight};

const TOPIC_ID_PATTERN: &str = r"^(?:[A-Z]{3}\d|[A-Z][a-z]{2}\d|[a-z]{4})$";

/// Four-character topic identifier: `AAA0` subjects, `Aaa0` courses, `aaaa` achievements.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TopicId(String);
impl TopicId {
	pub fn parse(raw: &str) -> Result<Self> {
		let trimmed = raw.trim();

		if !Regex::new(TOPIC_ID_PATTERN).map(|re| re.is_match(trimmed)).unwrap_or(false) {
			return Err(Error::InvalidTopicId { value: raw.to_string() });
		}

		Ok(Self(trimmed.to_string()))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Lowercase three-character prefix shared by all layers of one subject or course.
	pub fn stem(&self) -> String {
		self.0.chars().take(3).collect::<String>().to_lowercase()
	}

	/// `Aaa0` ids.
	pub fn is_course(&self) -> bool {
		let mut chars = self.0.chars();

		chars.next().is_some_and(|c| c.is_ascii_uppercase())
			&& chars.next().is_some_and(|c| c.is_ascii_lowercase())
	}

	/// `aaaa` ids.
	pub fn is_achievement(&self) -> bool {
		self.0.chars().all(|c| c.is_ascii_lowercase())
	}
}
impl TryFrom<String> for TopicId {
	type Error = Error;

	fn try_from(raw: String) -> Result<Self> {
		Self::parse(&raw)
	}
}
impl From<TopicId> for String {
	fn from(id: TopicId) -> Self {
		id.0
	}
}
impl fmt::Display for TopicId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Topic {
	pub id: TopicId,
	pub name: String,
	#[serde(default)]
	pub layer: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Resource {
	pub id: u32,
	pub title: String,
	#[serde(default)]
	pub url: Option<String>,
	#[serde(default = "default_active")]
	pub active: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TopicTag {
	pub topic_id: TopicId,
	pub tag_id: TagId,
	pub weight: TagWeight,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResourceTag {
	pub resource_id: u32,
	pub tag_id: TagId,
	pub weight: TagWeight,
}

fn default_active() -> bool {
	true
}
