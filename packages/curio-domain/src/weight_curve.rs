use crate::{Error, Result, TagWeight};

pub const MIN_LAYER: u32 = 3;
pub const MAX_LAYER: u32 = 8;
pub const MIN_REQUESTED_TAGS: usize = 4;

/// Characters of interest text per doubling step of the layer equivalent.
const CHARS_PER_STEP: usize = 50;

/// Hand-tuned interest weights per layer equivalent. Values are kept as tuned.
const CURVES: [(u32, &[i64]); 6] = [
	(3, &[5, 4, 3, 1]),
	(4, &[5, 4, 3, 2, 1]),
	(5, &[5, 4, 3, 3, 1]),
	(6, &[5, 4, 3, 2, 2, 1]),
	(7, &[5, 4, 3, 3, 2, 1]),
	(8, &[5, 4, 3, 3, 2, 1, 1]),
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WeightCurve {
	pub layer: u32,
	/// Weight for the i-th consensus tag. Its length is the selection cutoff.
	pub weights: Vec<TagWeight>,
	/// Number of tag ids a matching provider is asked for.
	pub requested_list_size: usize,
}
impl WeightCurve {
	/// `requested_max` is the caller's hard limit on proposal length.
	pub fn resolve(text_len: usize, requested_max: usize) -> Result<Self> {
		let layer = layer_equivalent(text_len);
		let weights = weights_for_layer(layer)?;
		let by_layer = 6 + (layer as usize / 2);
		let requested_list_size = requested_max.min(by_layer).max(MIN_REQUESTED_TAGS);

		Ok(Self { layer, weights, requested_list_size })
	}

	pub fn cutoff(&self) -> usize {
		self.weights.len()
	}
}

/// `3 + floor(log2(len / 50))`, clamped to `MIN_LAYER..=MAX_LAYER`.
pub fn layer_equivalent(text_len: usize) -> u32 {
	let mut steps = 0_u32;
	let mut threshold = CHARS_PER_STEP * 2;

	while threshold <= text_len && MIN_LAYER + steps < MAX_LAYER {
		steps += 1;
		threshold = threshold.saturating_mul(2);
	}

	MIN_LAYER + steps
}

pub fn weights_for_layer(layer: u32) -> Result<Vec<TagWeight>> {
	let layer = layer.clamp(MIN_LAYER, MAX_LAYER);
	let expected = expected_cutoff(layer);
	let raw = CURVES
		.iter()
		.find(|(curve_layer, _)| *curve_layer == layer)
		.map(|(_, weights)| *weights)
		.unwrap_or_default();

	if raw.len() != expected {
		return Err(Error::WeightCurveMismatch { layer, expected, actual: raw.len() });
	}

	raw.iter().map(|weight| TagWeight::new(*weight)).collect()
}

pub fn expected_cutoff(layer: u32) -> usize {
	3 + (layer as usize / 2)
}
