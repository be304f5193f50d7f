use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Lowercase ISO-639 style code such as `en` or `de`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LanguageCode(String);
impl LanguageCode {
	pub const DEFAULT: &'static str = "en";

	pub fn parse(raw: &str) -> Result<Self> {
		let normalized = raw.trim().to_ascii_lowercase();

		if normalized.is_empty() {
			return Err(Error::InvalidLanguageCode { value: raw.to_string(), reason: "empty" });
		}
		if !(2..=3).contains(&normalized.len()) {
			return Err(Error::InvalidLanguageCode {
				value: raw.to_string(),
				reason: "length must be 2 or 3",
			});
		}
		if !normalized.bytes().all(|b| b.is_ascii_lowercase()) {
			return Err(Error::InvalidLanguageCode {
				value: raw.to_string(),
				reason: "only letters a-z are allowed",
			});
		}

		Ok(Self(normalized))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl Default for LanguageCode {
	fn default() -> Self {
		Self(Self::DEFAULT.to_string())
	}
}
impl TryFrom<String> for LanguageCode {
	type Error = Error;

	fn try_from(raw: String) -> Result<Self> {
		Self::parse(&raw)
	}
}
impl From<LanguageCode> for String {
	fn from(code: LanguageCode) -> Self {
		code.0
	}
}
impl fmt::Display for LanguageCode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}
