use std::{
	path::PathBuf,
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
	time::Duration,
};

use curio_config::{CatalogSource, Config, Providers, Search, Service};
use curio_domain::{Resource, ResourceTag, Tag, TagId, TagWeight, Topic, TopicId, TopicTag};
use curio_providers::{Diagnostics, MatchRequest};
use curio_service::{
	BoxFuture, Catalog, CurioService, Error, InterestSearchRequest, MatchingSource,
	TagMatchProvider, TopicListQuery, TopicResolution,
};

struct StaticProvider {
	ids: Vec<u32>,
	calls: AtomicUsize,
}
impl StaticProvider {
	fn new(ids: &[u32]) -> Arc<Self> {
		Arc::new(Self { ids: ids.to_vec(), calls: AtomicUsize::new(0) })
	}

	fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}
impl TagMatchProvider for StaticProvider {
	fn propose<'a>(&'a self, _request: &'a MatchRequest<'a>) -> BoxFuture<'a, Vec<u32>> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		let ids = self.ids.clone();

		Box::pin(async move { ids })
	}
}

struct StalledProvider;
impl TagMatchProvider for StalledProvider {
	fn propose<'a>(&'a self, _request: &'a MatchRequest<'a>) -> BoxFuture<'a, Vec<u32>> {
		Box::pin(async {
			tokio::time::sleep(Duration::from_secs(30)).await;

			vec![1, 2, 3]
		})
	}
}

fn config() -> Config {
	Config {
		service: Service { http_bind: "127.0.0.1:0".to_string(), log_level: "info".to_string() },
		catalog: CatalogSource { path: PathBuf::from("catalog.json") },
		search: Search::default(),
		providers: Providers::default(),
	}
}

fn tag_id(id: u32) -> TagId {
	TagId::new(id).expect("tag id")
}

fn weight(value: i64) -> TagWeight {
	TagWeight::new(value).expect("weight")
}

fn topic(id: &str, name: &str) -> Topic {
	Topic { id: TopicId::parse(id).expect("topic id"), name: name.to_string(), layer: 1 }
}

fn topic_tag(topic_id: &str, tag: u32, value: i64) -> TopicTag {
	TopicTag {
		topic_id: TopicId::parse(topic_id).expect("topic id"),
		tag_id: tag_id(tag),
		weight: weight(value),
	}
}

fn resource(id: u32, active: bool) -> Resource {
	Resource { id, title: format!("Resource {id}"), url: None, active }
}

fn resource_tag(resource_id: u32, tag: u32, value: i64) -> ResourceTag {
	ResourceTag { resource_id, tag_id: tag_id(tag), weight: weight(value) }
}

fn tags() -> Vec<Tag> {
	(1..=12).map(|id| Tag::new(tag_id(id), [format!("tag {id}")]).expect("tag")).collect()
}

fn catalog() -> Catalog {
	Catalog::from_parts(
		tags(),
		vec![
			topic("MAT1", "Mathematics"),
			topic("Mat1", "Mathematics course"),
			topic("BIO1", "Biology"),
			topic("BIO2", "Advanced biology"),
			topic("bios", "Biology badge"),
		],
		vec![resource(10, true), resource(11, true), resource(12, true), resource(13, false)],
		vec![
			topic_tag("BIO1", 7, 4),
			topic_tag("BIO1", 3, 2),
			topic_tag("BIO2", 9, 3),
			topic_tag("MAT1", 1, 5),
			topic_tag("Mat1", 12, 1),
		],
		vec![
			resource_tag(10, 7, 2),
			resource_tag(11, 3, 5),
			resource_tag(12, 12, 4),
			resource_tag(13, 7, 5),
		],
	)
	.expect("catalog")
}

fn source(provider: Arc<dyn TagMatchProvider>, source_weight: u32, repeats: u32) -> MatchingSource {
	MatchingSource { provider_id: format!("p{source_weight}"), repeats, source_weight, provider }
}

fn service(sources: Vec<MatchingSource>) -> CurioService {
	CurioService::with_sources(config(), catalog(), sources, Arc::new(Diagnostics::new()))
}

/// Interest text of exactly `chars` characters with no surrounding whitespace.
fn text(chars: usize) -> String {
	"curious about cells ".chars().cycle().take(chars).collect()
}

fn request(chars: usize) -> InterestSearchRequest {
	InterestSearchRequest {
		interests_text: text(chars),
		language: None,
		max_results: None,
		explain_matches: None,
	}
}

fn ids(tags: &[curio_service::InterestMatchedTag]) -> Vec<u32> {
	tags.iter().map(|tag| tag.tag_id.get()).collect()
}

#[tokio::test]
async fn weighted_consensus_drives_topic_ranking() {
	let service = service(vec![
		source(StaticProvider::new(&[7, 3, 9, 1]), 3, 1),
		source(StaticProvider::new(&[3, 7, 1]), 2, 1),
	]);
	let response = service.interest_search(request(150)).await.expect("search");

	assert!(!response.fallback);
	assert_eq!(response.used_language, "en");
	assert_eq!(ids(&response.matched_tags), vec![7, 3, 9, 1]);

	let weights: Vec<u32> =
		response.matched_tags.iter().map(|tag| tag.interest_weight.get()).collect();

	assert_eq!(weights, vec![5, 4, 3, 2]);

	let ranking: Vec<(&str, u32)> =
		response.topics.iter().map(|t| (t.topic.id.as_str(), t.score)).collect();

	assert_eq!(
		ranking,
		vec![("BIO1", 28), ("MAT1", 10), ("BIO2", 9), ("Mat1", 0), ("bios", 0)]
	);
	assert_eq!(response.topics[0].matched_tags.len(), 2);
	assert_eq!(response.topics[0].matched_tags[0].contribution, 20);
}

#[tokio::test]
async fn provider_order_does_not_change_consensus() {
	let forward = service(vec![
		source(StaticProvider::new(&[7, 3, 9, 1]), 3, 1),
		source(StaticProvider::new(&[3, 7, 1]), 2, 1),
	]);
	let reversed = service(vec![
		source(StaticProvider::new(&[3, 7, 1]), 2, 1),
		source(StaticProvider::new(&[7, 3, 9, 1]), 3, 1),
	]);
	let a = forward.interest_search(request(150)).await.expect("search");
	let b = reversed.interest_search(request(150)).await.expect("search");

	assert_eq!(ids(&a.matched_tags), ids(&b.matched_tags));
}

#[tokio::test]
async fn unknown_and_repeated_ids_are_discarded() {
	let service = service(vec![source(StaticProvider::new(&[99, 4, 4, 0, 2]), 3, 1)]);
	let response = service.interest_search(request(150)).await.expect("search");

	assert!(!response.fallback);
	assert_eq!(ids(&response.matched_tags), vec![4, 2]);
}

#[tokio::test]
async fn empty_proposals_fall_back_to_lowest_ids() {
	let empty = StaticProvider::new(&[]);
	let service = service(vec![source(empty.clone(), 3, 2)]);
	let response = service.interest_search(request(150)).await.expect("search");

	assert_eq!(empty.calls(), 2);
	assert!(response.fallback);
	assert_eq!(ids(&response.matched_tags), vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn service_without_sources_uses_fallback() {
	let service = service(Vec::new());

	assert!(service.is_dry_run());

	let response = service.interest_search(request(60)).await.expect("search");
	let weights: Vec<u32> =
		response.matched_tags.iter().map(|tag| tag.interest_weight.get()).collect();

	assert!(response.fallback);
	assert_eq!(weights, vec![5, 4, 3, 1]);
}

#[tokio::test]
async fn muted_sources_are_never_called() {
	let muted = StaticProvider::new(&[1]);
	let service = service(vec![source(muted.clone(), 2, 0)]);
	let response = service.interest_search(request(150)).await.expect("search");

	assert_eq!(muted.calls(), 0);
	assert!(response.fallback);
}

#[tokio::test]
async fn expired_matching_deadline_falls_back() {
	let mut cfg = config();

	cfg.search.request_timeout_ms = 20;

	let service = CurioService::with_sources(
		cfg,
		catalog(),
		vec![source(Arc::new(StalledProvider), 3, 1)],
		Arc::new(Diagnostics::new()),
	);
	let response = service.interest_search(request(150)).await.expect("search");

	assert!(response.fallback);
	assert_eq!(ids(&response.matched_tags), vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn explanations_can_be_disabled() {
	let service = service(vec![source(StaticProvider::new(&[7, 3]), 3, 1)]);
	let mut req = request(150);

	req.explain_matches = Some(false);

	let response = service.interest_search(req).await.expect("search");

	assert_eq!(response.topics[0].score, 28);
	assert!(response.topics.iter().all(|topic| topic.matched_tags.is_empty()));
}

#[tokio::test]
async fn results_are_truncated_by_score_then_id() {
	let topics: Vec<Topic> = (0..50_u8)
		.map(|i| {
			let id = format!("T{}A{}", (b'A' + i / 10) as char, i % 10);

			topic(&id, "Generated")
		})
		.collect();
	let links: Vec<TopicTag> = topics
		.iter()
		.enumerate()
		.map(|(i, topic)| TopicTag {
			topic_id: topic.id.clone(),
			tag_id: tag_id(1),
			weight: weight((i % 5) as i64 + 1),
		})
		.collect();
	let expected: Vec<String> =
		topics.iter().skip(4).step_by(5).map(|topic| topic.id.to_string()).collect();
	let catalog =
		Catalog::from_parts(tags(), topics, Vec::new(), links, Vec::new()).expect("catalog");
	let service =
		CurioService::with_sources(config(), catalog, Vec::new(), Arc::new(Diagnostics::new()));
	let mut req = request(150);

	req.max_results = Some(10);

	let response = service.interest_search(req).await.expect("search");
	let got: Vec<String> = response.topics.iter().map(|t| t.topic.id.to_string()).collect();

	assert_eq!(got, expected);
	assert!(response.topics.iter().all(|t| t.score == 25));
}

#[tokio::test]
async fn invalid_requests_are_rejected() {
	let service = service(Vec::new());
	let short = InterestSearchRequest { interests_text: "   too short   ".to_string(), ..request(0) };
	let zero = InterestSearchRequest { max_results: Some(0), ..request(150) };
	let over_cap = InterestSearchRequest { max_results: Some(201), ..request(150) };
	let bad_language =
		InterestSearchRequest { language: Some("english".to_string()), ..request(150) };

	for req in [short, zero, over_cap, bad_language] {
		let err = service.interest_search(req).await.expect_err("invalid request");

		assert!(matches!(err, Error::InvalidRequest { .. }), "unexpected error: {err}");
	}

	let zero = InterestSearchRequest { max_results: Some(0), ..request(150) };

	match service.interest_search(zero).await {
		Err(Error::InvalidRequest { field, .. }) =>
			assert_eq!(field.as_deref(), Some("max_results")),
		other => panic!("expected an invalid request, got {other:?}"),
	}

	let oversized = request(2_049);

	assert!(service.interest_search(oversized).await.is_err());
	assert!(service.interest_search(request(2_048)).await.is_ok());
}

#[tokio::test]
async fn language_is_normalized() {
	let service = service(Vec::new());
	let req = InterestSearchRequest { language: Some(" DE ".to_string()), ..request(150) };
	let response = service.interest_search(req).await.expect("search");

	assert_eq!(response.used_language, "de");
}

#[test]
fn topic_details_score_active_resources() {
	let service = service(Vec::new());
	let TopicResolution::Exact { topic } = service.topic_details("bio1", None).expect("details")
	else {
		panic!("expected an exact match");
	};
	let resources: Vec<(u32, u32)> =
		topic.resources.iter().map(|resource| (resource.id, resource.score)).collect();
	let similar: Vec<String> =
		topic.similar_topics.iter().map(|candidate| candidate.id.to_string()).collect();

	assert_eq!(topic.summary.id.as_str(), "BIO1");
	assert_eq!(resources, vec![(11, 10), (10, 8)]);
	assert_eq!(topic.resources[0].matched_tags[0].resource_weight.get(), 5);
	assert_eq!(similar, vec!["BIO2", "bios"]);
}

#[test]
fn topic_details_report_ambiguity_and_absence() {
	let service = service(Vec::new());
	let TopicResolution::Ambiguous { candidates } =
		service.topic_details("MAT1", None).expect("resolution")
	else {
		panic!("expected ambiguity");
	};
	let ids: Vec<String> = candidates.iter().map(|candidate| candidate.id.to_string()).collect();

	assert_eq!(ids, vec!["MAT1", "Mat1"]);
	assert!(matches!(service.topic_details("ZZZ9", None), Err(Error::NotFound { .. })));
	assert!(matches!(service.topic_details("  ", None), Err(Error::InvalidRequest { .. })));
}

#[test]
fn listings_default_to_name_order() {
	let service = service(Vec::new());
	let tags = service.list_tags();
	let topics = service.list_topics(&TopicListQuery::default()).expect("topics");
	let ids: Vec<&str> = topics.items.iter().map(|topic| topic.id.as_str()).collect();

	assert_eq!(tags.items.len(), 12);
	assert_eq!(tags.total, 12);
	assert_eq!(tags.items[0].label, "tag 1");
	assert_eq!(ids, vec!["BIO2", "BIO1", "MAT1", "Mat1"]);
	assert_eq!(topics.total, 4);
	assert_eq!(topics.items[1].tags.len(), 2);
}

fn layered_service() -> CurioService {
	let layered = |id: &str, name: &str, layer: u32| Topic { layer, ..topic(id, name) };
	let catalog = Catalog::from_parts(
		tags(),
		vec![
			layered("MAT1", "Mathematics", 1),
			layered("Mat1", "Mathematics course", 2),
			layered("BIO1", "Biology", 1),
			layered("BIO2", "Advanced biology", 3),
			layered("bios", "Biology badge", 2),
		],
		Vec::new(),
		Vec::new(),
		Vec::new(),
	)
	.expect("catalog");

	CurioService::with_sources(config(), catalog, Vec::new(), Arc::new(Diagnostics::new()))
}

fn listed(service: &CurioService, query: TopicListQuery) -> Vec<String> {
	let response = service.list_topics(&query).expect("topics");

	assert_eq!(response.total, response.items.len());

	response.items.iter().map(|topic| topic.id.to_string()).collect()
}

#[test]
fn topic_list_filters() {
	let service = layered_service();

	assert_eq!(listed(&service, TopicListQuery::default()), vec!["BIO1", "MAT1", "Mat1"]);
	assert_eq!(
		listed(&service, TopicListQuery { max_layer: Some(1), ..Default::default() }),
		vec!["BIO1", "MAT1"]
	);
	assert_eq!(
		listed(&service, TopicListQuery { max_layer: Some(3), ..Default::default() }),
		vec!["BIO2", "BIO1", "MAT1", "Mat1"]
	);
	assert!(
		listed(&service, TopicListQuery { max_layer: Some(0), ..Default::default() }).is_empty()
	);
	assert_eq!(
		listed(&service, TopicListQuery { show_courses: Some(false), ..Default::default() }),
		vec!["BIO1", "MAT1"]
	);
	assert_eq!(
		listed(&service, TopicListQuery { show_achievements: Some(true), ..Default::default() }),
		vec!["BIO1", "bios", "MAT1", "Mat1"]
	);
}

#[test]
fn topic_list_sorting() {
	let service = layered_service();
	let all = |sort_by: &str, sort_direction: Option<&str>| TopicListQuery {
		max_layer: Some(3),
		show_achievements: Some(true),
		sort_by: Some(sort_by.to_string()),
		sort_direction: sort_direction.map(str::to_string),
		..Default::default()
	};

	assert_eq!(listed(&service, all("NAME", None)), vec!["BIO2", "BIO1", "bios", "MAT1", "Mat1"]);
	assert_eq!(
		listed(&service, all("name", Some("desc"))),
		vec!["Mat1", "MAT1", "bios", "BIO1", "BIO2"]
	);
	assert_eq!(
		listed(&service, all(" layer ", Some("asc"))),
		vec!["BIO1", "MAT1", "Mat1", "bios", "BIO2"]
	);
	// Equal layers keep id order when descending.
	assert_eq!(
		listed(&service, all("layer", Some(" DESC "))),
		vec!["BIO2", "Mat1", "bios", "BIO1", "MAT1"]
	);
	assert_eq!(
		listed(&service, all("id", Some("desc"))),
		vec!["bios", "Mat1", "MAT1", "BIO2", "BIO1"]
	);
}

#[test]
fn topic_list_rejects_unknown_sort_options() {
	let service = layered_service();
	let bad_key = TopicListQuery { sort_by: Some("popularity".to_string()), ..Default::default() };
	let bad_direction =
		TopicListQuery { sort_direction: Some("sideways".to_string()), ..Default::default() };

	for (query, expected) in [(bad_key, "sortBy"), (bad_direction, "sortDirection")] {
		match service.list_topics(&query) {
			Err(Error::InvalidRequest { field, message }) => {
				assert_eq!(field.as_deref(), Some(expected));
				assert!(message.contains("Allowed"), "unexpected message: {message}");
			},
			other => panic!("expected an invalid request, got {other:?}"),
		}
	}
}

#[test]
fn resource_details_include_inactive_resources() {
	let service = service(Vec::new());
	let active = service.resource_details(10).expect("resource");
	let inactive = service.resource_details(13).expect("resource");

	assert_eq!(active.title, "Resource 10");
	assert!(active.active);
	assert!(!inactive.active);
	assert!(matches!(service.resource_details(99), Err(Error::NotFound { .. })));
}
