use std::fmt::Write as _;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::{Error, Result};
use curio_domain::{Tag, weight_curve::MIN_REQUESTED_TAGS};

pub const SYSTEM_PROMPT: &str = "You are an assistant that only returns JSON arrays of integers.";

/// One proposal request against the full candidate catalog.
#[derive(Clone, Copy, Debug)]
pub struct MatchRequest<'a> {
	pub interest_text: &'a str,
	pub language: &'a str,
	pub candidates: &'a [Tag],
	pub requested_list_size: usize,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApiError {
	#[serde(default)]
	pub message: Option<String>,
	#[serde(default, rename = "type")]
	pub kind: Option<String>,
	#[serde(default)]
	pub param: Option<String>,
	#[serde(default)]
	pub code: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorEnvelope {
	error: ApiError,
}

pub fn build_prompt(request: &MatchRequest<'_>) -> String {
	let max = request.requested_list_size.max(MIN_REQUESTED_TAGS);
	let mut prompt = String::new();

	prompt.push_str("You are selecting tags that best match the given interests.\n");
	let _ = writeln!(prompt, "- Choose between {MIN_REQUESTED_TAGS} and {max} tag IDs.");
	prompt.push_str("- Order tags by relevance (most relevant first).\n");
	prompt.push_str("- Only return tag IDs from the catalog; never invent new IDs.\n");
	prompt.push_str("- Respond with a plain JSON array of integers, e.g. [12,4,7,1].\n\n");
	let _ = writeln!(prompt, "USER INTERESTS (language={}):", request.language);
	prompt.push_str(request.interest_text);
	prompt.push_str("\n\nTAG CATALOG:\n");

	for tag in request.candidates {
		let _ = write!(prompt, "- {}: {}", tag.id(), tag.primary_label());

		if !tag.synonyms().is_empty() {
			let _ = write!(prompt, " (synonyms: {})", tag.synonyms().join(", "));
		}

		prompt.push('\n');
	}

	prompt
}

pub fn build_messages(request: &MatchRequest<'_>) -> Vec<Value> {
	vec![
		serde_json::json!({ "role": "system", "content": SYSTEM_PROMPT }),
		serde_json::json!({ "role": "user", "content": build_prompt(request) }),
	]
}

pub fn build_body(model: &str, messages: &[Value], temperature: Option<f32>) -> Value {
	let mut body = serde_json::json!({
		"model": model,
		"messages": messages,
	});

	if let Some(temperature) = temperature {
		body["temperature"] = serde_json::json!(temperature);
	}

	body
}

/// Tag ids from a 2xx body. A body that is not JSON at all is an `InvalidResponse`.
pub fn parse_response(body: &str) -> Result<Vec<u32>> {
	let json: Value = serde_json::from_str(body).map_err(|err| Error::InvalidResponse {
		message: format!("Matching response is not JSON: {err}."),
	})?;

	Ok(parse_tag_ids(&json))
}

/// Reads `choices[0].message.content` and scans it for tag ids. Anything unreadable yields an
/// empty list.
pub fn parse_tag_ids(json: &Value) -> Vec<u32> {
	json.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|msg| msg.get("content"))
		.and_then(|c| c.as_str())
		.map(scan_ids)
		.unwrap_or_default()
}

/// Integers inside the first `[...]` segment of `content`, in order. Values that cannot be tag
/// ids are skipped.
pub fn scan_ids(content: &str) -> Vec<u32> {
	let Some(start) = content.find('[') else {
		return Vec::new();
	};
	let Some(len) = content[start + 1..].find(']') else {
		return Vec::new();
	};
	let segment = &content[start + 1..start + 1 + len];
	let Ok(re) = Regex::new(r"-?\d+") else {
		return Vec::new();
	};

	re.find_iter(segment)
		.filter_map(|m| m.as_str().parse::<i64>().ok())
		.filter_map(|value| u32::try_from(value).ok())
		.filter(|value| *value > 0)
		.collect()
}

pub fn parse_api_error(body: &str) -> Option<ApiError> {
	if body.trim().is_empty() {
		return None;
	}

	serde_json::from_str::<ApiErrorEnvelope>(body).ok().map(|envelope| envelope.error)
}

/// True when the endpoint only accepts its default sampling temperature.
pub fn rejects_temperature(err: &ApiError) -> bool {
	let is_temperature =
		err.param.as_deref().map(|param| param.eq_ignore_ascii_case("temperature")).unwrap_or(false);

	if !is_temperature {
		return false;
	}

	let unsupported = err
		.code
		.as_deref()
		.map(|code| code.eq_ignore_ascii_case("unsupported_value"))
		.unwrap_or(false);
	let only_default = err
		.message
		.as_deref()
		.map(|message| message.to_lowercase().contains("only the default"))
		.unwrap_or(false);

	unsupported || only_default
}
