pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Tag weight must be between 1 and 5, but was {value}.")]
	InvalidTagWeight { value: i64 },
	#[error("Tag id must be greater than zero.")]
	InvalidTagId,
	#[error("Tag {id} must have at least one non-blank label.")]
	InvalidTag { id: u32 },
	#[error("Invalid language code {value:?}: {reason}")]
	InvalidLanguageCode { value: String, reason: &'static str },
	#[error("Topic id {value:?} does not match the allowed patterns.")]
	InvalidTopicId { value: String },
	#[error(
		"Interest weight curve mismatch for layer {layer}: expected {expected} weights, found {actual}."
	)]
	WeightCurveMismatch { layer: u32, expected: usize, actual: usize },
}
