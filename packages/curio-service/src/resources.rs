use serde::Serialize;

use crate::{CurioService, Error, Result};
use curio_domain::Resource;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResourceSummary {
	pub id: u32,
	pub title: String,
	pub url: Option<String>,
	pub active: bool,
}
impl From<&Resource> for ResourceSummary {
	fn from(resource: &Resource) -> Self {
		Self {
			id: resource.id,
			title: resource.title.clone(),
			url: resource.url.clone(),
			active: resource.active,
		}
	}
}

impl CurioService {
	/// Looks up one resource by id. Inactive resources resolve too.
	pub fn resource_details(&self, id: u32) -> Result<ResourceSummary> {
		self.catalog
			.resource(id)
			.map(ResourceSummary::from)
			.ok_or_else(|| Error::NotFound { message: format!("Resource {id} does not exist.") })
	}
}
