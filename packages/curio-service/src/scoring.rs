use curio_domain::{TagId, TagWeight};

use crate::Catalog;

/// One shared tag between a query and a scored entity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Contribution {
	pub tag_id: TagId,
	pub label: String,
	pub query_weight: TagWeight,
	pub entity_weight: TagWeight,
	pub contribution: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EntityScore {
	pub total: u32,
	/// Empty unless explanations were requested. Ordered like the query tags.
	pub contributions: Vec<Contribution>,
}

/// Weighted intersection: the sum of `query weight * entity weight` over shared tags.
pub fn score_entity(
	catalog: &Catalog,
	query: &[(TagId, TagWeight)],
	entity: &[(TagId, TagWeight)],
	explain: bool,
) -> EntityScore {
	let mut score = EntityScore::default();

	for (tag_id, query_weight) in query {
		let Some((_, entity_weight)) = entity.iter().find(|(id, _)| id == tag_id) else {
			continue;
		};
		let contribution = query_weight.get() * entity_weight.get();

		score.total += contribution;

		if explain {
			score.contributions.push(Contribution {
				tag_id: *tag_id,
				label: catalog.label(*tag_id),
				query_weight: *query_weight,
				entity_weight: *entity_weight,
				contribution,
			});
		}
	}

	score
}
