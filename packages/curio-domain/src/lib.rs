pub mod catalog;
pub mod language;
pub mod tag;
pub mod weight_curve;

mod error;

pub use catalog::{Resource, ResourceTag, Topic, TopicId, TopicTag};
pub use error::{Error, Result};
pub use language::LanguageCode;
pub use tag::{Tag, TagId, TagWeight};
pub use weight_curve::WeightCurve;
