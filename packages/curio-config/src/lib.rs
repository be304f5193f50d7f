mod error;
mod types;

pub use error::{Error, Result};
pub use types::{CatalogSource, Config, MatchingProviderConfig, Providers, Search, Service};

use std::{collections::HashSet, fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.catalog.path.as_os_str().is_empty() {
		return Err(Error::Validation { message: "catalog.path must be non-empty.".to_string() });
	}

	validate_search(cfg)?;

	let mut seen = HashSet::new();

	for provider in &cfg.providers.matching {
		validate_provider(provider)?;

		if !seen.insert(provider.provider_id.as_str()) {
			return Err(Error::Validation {
				message: format!(
					"providers.matching.provider_id {} is declared more than once.",
					provider.provider_id
				),
			});
		}
	}

	Ok(())
}

fn validate_search(cfg: &Config) -> Result<()> {
	let search = &cfg.search;

	if search.min_text_chars == 0 {
		return Err(Error::Validation {
			message: "search.min_text_chars must be greater than zero.".to_string(),
		});
	}
	if search.min_text_chars >= search.max_text_chars {
		return Err(Error::Validation {
			message: "search.min_text_chars must be less than search.max_text_chars.".to_string(),
		});
	}
	if search.max_results_cap == 0 {
		return Err(Error::Validation {
			message: "search.max_results_cap must be greater than zero.".to_string(),
		});
	}
	if search.default_max_results == 0 || search.default_max_results > search.max_results_cap {
		return Err(Error::Validation {
			message: "search.default_max_results must be in the range 1-search.max_results_cap."
				.to_string(),
		});
	}
	if search.max_interest_tags < 4 {
		return Err(Error::Validation {
			message: "search.max_interest_tags must be at least 4.".to_string(),
		});
	}
	if !is_language_code(&search.default_language) {
		return Err(Error::Validation {
			message: "search.default_language must be a 2-3 letter language code.".to_string(),
		});
	}
	if search.request_timeout_ms == 0 {
		return Err(Error::Validation {
			message: "search.request_timeout_ms must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn validate_provider(provider: &MatchingProviderConfig) -> Result<()> {
	if provider.provider_id.trim().is_empty() {
		return Err(Error::Validation {
			message: "providers.matching.provider_id must be non-empty.".to_string(),
		});
	}

	let id = provider.provider_id.as_str();

	for (label, value) in [("api_base", &provider.api_base), ("model", &provider.model)] {
		if value.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("Provider {id} {label} must be non-empty."),
			});
		}
	}

	if provider.timeout_ms == 0 {
		return Err(Error::Validation {
			message: format!("Provider {id} timeout_ms must be greater than zero."),
		});
	}
	if provider.max_attempts == 0 {
		return Err(Error::Validation {
			message: format!("Provider {id} max_attempts must be at least 1."),
		});
	}
	if provider.source_weight == 0 {
		return Err(Error::Validation {
			message: format!("Provider {id} source_weight must be at least 1."),
		});
	}

	if let Some(temperature) = provider.temperature {
		if !temperature.is_finite() {
			return Err(Error::Validation {
				message: format!("Provider {id} temperature must be a finite number."),
			});
		}
		if !(0.0..=2.0).contains(&temperature) {
			return Err(Error::Validation {
				message: format!("Provider {id} temperature must be in the range 0.0-2.0."),
			});
		}
	}

	if provider.default_headers.values().any(|value| !value.is_string()) {
		return Err(Error::Validation {
			message: format!("Provider {id} default_headers values must be strings."),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.search.default_language = cfg.search.default_language.trim().to_ascii_lowercase();

	for provider in &mut cfg.providers.matching {
		provider.provider_id = provider.provider_id.trim().to_string();
		provider.api_key = provider.api_key.trim().to_string();
		provider.api_base = provider.api_base.trim_end_matches('/').to_string();
	}
}

fn is_language_code(raw: &str) -> bool {
	let len = raw.len();

	(2..=3).contains(&len) && raw.bytes().all(|b| b.is_ascii_lowercase())
}
