use std::collections::{BTreeSet, HashMap, HashSet};

use curio_domain::{Tag, TagId, TagWeight, WeightCurve};

/// One provider response after sanitation, best match first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RankedProposal {
	pub source_weight: u32,
	pub tag_ids: Vec<TagId>,
}

/// Keeps ids that name a candidate tag, drops repeats, and stops at `limit`.
pub fn sanitize(raw: &[u32], valid: &HashSet<TagId>, limit: usize) -> Vec<TagId> {
	let mut seen = HashSet::new();

	raw.iter()
		.filter_map(|id| TagId::new(*id).ok())
		.filter(|id| valid.contains(id) && seen.insert(*id))
		.take(limit)
		.collect()
}

/// Weighted reverse-Borda merge.
///
/// Every tag gets `sum(position * source_weight)` across the non-empty proposals, where a tag
/// missing from a proposal sits at that proposal's length. Lower totals rank higher and ties go to
/// the lower tag id, so the result does not depend on proposal order.
pub fn merge_ranked(proposals: &[RankedProposal]) -> Vec<TagId> {
	let proposals: Vec<_> = proposals.iter().filter(|p| !p.tag_ids.is_empty()).collect();
	let union: BTreeSet<TagId> =
		proposals.iter().flat_map(|proposal| proposal.tag_ids.iter().copied()).collect();
	let positions: Vec<HashMap<TagId, usize>> = proposals
		.iter()
		.map(|proposal| {
			let mut map = HashMap::with_capacity(proposal.tag_ids.len());

			for (position, id) in proposal.tag_ids.iter().enumerate() {
				map.entry(*id).or_insert(position);
			}

			map
		})
		.collect();
	let mut keyed: Vec<(u64, TagId)> = union
		.into_iter()
		.map(|id| {
			let key = proposals
				.iter()
				.zip(&positions)
				.map(|(proposal, positions)| {
					let position = positions.get(&id).copied().unwrap_or(proposal.tag_ids.len());

					position as u64 * u64::from(proposal.source_weight)
				})
				.sum();

			(key, id)
		})
		.collect();

	keyed.sort();
	keyed.into_iter().map(|(_, id)| id).collect()
}

/// Truncates a consensus ranking to the curve's cutoff and pairs each tag with its curve weight.
pub fn assign_weights(consensus: &[TagId], curve: &WeightCurve) -> Vec<(TagId, TagWeight)> {
	consensus
		.iter()
		.take(curve.cutoff())
		.zip(&curve.weights)
		.map(|(id, weight)| (*id, TagWeight::clamped(i64::from(weight.get()))))
		.collect()
}

/// Stands in for provider consensus: the lowest candidate ids, as many as were requested.
pub fn deterministic_proposal(candidates: &[Tag], curve: &WeightCurve) -> Vec<TagId> {
	let mut ids: Vec<TagId> = candidates.iter().map(Tag::id).collect();

	ids.sort();
	ids.dedup();
	ids.truncate(curve.requested_list_size);

	ids
}
