use std::sync::Arc;

use curio_config::Config;
use curio_service::{Catalog, CurioService};

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<CurioService>,
}
impl AppState {
	pub fn new(config: Config) -> color_eyre::Result<Self> {
		let catalog = Catalog::load(&config.catalog.path)?;

		tracing::info!(
			path = %config.catalog.path.display(),
			tags = catalog.tags().len(),
			topics = catalog.topics().len(),
			resources = catalog.resources().len(),
			"Catalog loaded."
		);

		let service = CurioService::new(config, catalog)?;

		Ok(Self::from_service(service))
	}

	pub fn from_service(service: CurioService) -> Self {
		Self { service: Arc::new(service) }
	}
}
