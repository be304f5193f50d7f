use std::{fmt, hash::Hash};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct TagId(u32);
impl TagId {
	pub fn new(raw: u32) -> Result<Self> {
		if raw == 0 {
			return Err(Error::InvalidTagId);
		}

		Ok(Self(raw))
	}

	pub fn get(self) -> u32 {
		self.0
	}
}
impl TryFrom<u32> for TagId {
	type Error = Error;

	fn try_from(raw: u32) -> Result<Self> {
		Self::new(raw)
	}
}
impl From<TagId> for u32 {
	fn from(id: TagId) -> Self {
		id.0
	}
}
impl fmt::Display for TagId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// Strength of a tag association, always within `MIN..=MAX`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct TagWeight(u8);
impl TagWeight {
	pub const MAX: u8 = 5;
	pub const MIN: u8 = 1;

	pub fn new(value: i64) -> Result<Self> {
		if value < i64::from(Self::MIN) || value > i64::from(Self::MAX) {
			return Err(Error::InvalidTagWeight { value });
		}

		Ok(Self(value as u8))
	}

	/// Forces `value` into range. Only the final interest-weight assignment uses this.
	pub fn clamped(value: i64) -> Self {
		Self(value.clamp(i64::from(Self::MIN), i64::from(Self::MAX)) as u8)
	}

	pub fn get(self) -> u32 {
		u32::from(self.0)
	}
}
impl TryFrom<i64> for TagWeight {
	type Error = Error;

	fn try_from(value: i64) -> Result<Self> {
		Self::new(value)
	}
}
impl From<TagWeight> for u8 {
	fn from(weight: TagWeight) -> Self {
		weight.0
	}
}
impl fmt::Display for TagWeight {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// A catalog keyword. `labels[0]` is the display label, the rest are synonyms.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "RawTag")]
pub struct Tag {
	id: TagId,
	labels: Vec<String>,
}
impl Tag {
	/// Trims every label and drops blank ones. At least one label has to survive.
	pub fn new<I, S>(id: TagId, raw_labels: I) -> Result<Self>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let labels = raw_labels
			.into_iter()
			.map(|label| label.as_ref().trim().to_string())
			.filter(|label| !label.is_empty())
			.collect::<Vec<_>>();

		if labels.is_empty() {
			return Err(Error::InvalidTag { id: id.get() });
		}

		Ok(Self { id, labels })
	}

	pub fn id(&self) -> TagId {
		self.id
	}

	pub fn primary_label(&self) -> &str {
		&self.labels[0]
	}

	pub fn synonyms(&self) -> &[String] {
		&self.labels[1..]
	}

	pub fn labels(&self) -> &[String] {
		&self.labels
	}
}
impl PartialEq for Tag {
	fn eq(&self, other: &Self) -> bool {
		self.id == other.id
	}
}
impl Eq for Tag {}
impl Hash for Tag {
	fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
		self.id.hash(state);
	}
}

#[derive(Deserialize)]
struct RawTag {
	id: TagId,
	labels: Vec<String>,
}
impl TryFrom<RawTag> for Tag {
	type Error = Error;

	fn try_from(raw: RawTag) -> Result<Self> {
		Self::new(raw.id, raw.labels)
	}
}
