pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String, field: Option<String> },
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Catalog error: {message}")]
	Catalog { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error(transparent)]
	Domain(#[from] curio_domain::Error),
}
impl Error {
	/// An invalid request caused by the named request field.
	pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
		Self::InvalidRequest { message: message.into(), field: Some(field.to_string()) }
	}
}
impl From<curio_providers::Error> for Error {
	fn from(err: curio_providers::Error) -> Self {
		Self::Provider { message: err.to_string() }
	}
}
