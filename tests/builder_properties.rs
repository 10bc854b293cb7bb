//! Property-based tests for the graph builder.
//!
//! For any list of records, however messy:
//! - building is deterministic
//! - node ids are unique
//! - every edge joins a publication to a tag node that exists
//! - each distinct title, and each untitled record, gets one publication node

use std::collections::HashSet;
use std::sync::Arc;

use knowledge_graph_canvas::components::knowledge_graph::config::BuilderOptions;
use knowledge_graph_canvas::components::knowledge_graph::{
	GraphData, NodeKind, PublicationRecord, build_with,
};
use proptest::prelude::*;

/// Small alphabets so titles and tags collide often.
fn arb_record() -> impl Strategy<Value = PublicationRecord> {
	(
		prop::option::of("[ab :#]{0,4}"),
		prop::option::of("[ab,; \n]{0,10}"),
		prop::option::of("[bc,;]{0,8}"),
		prop::option::of("[ab]{0,2}"),
	)
		.prop_map(|(title, topic, keywords, author)| PublicationRecord {
			title,
			topic,
			keywords,
			author,
			..PublicationRecord::default()
		})
}

fn arb_records() -> impl Strategy<Value = Vec<Arc<PublicationRecord>>> {
	prop::collection::vec(arb_record().prop_map(Arc::new), 0..12)
}

fn arb_options() -> impl Strategy<Value = BuilderOptions> {
	(any::<bool>(), any::<bool>()).prop_map(|(include_authors, include_body_sections)| {
		BuilderOptions {
			include_authors,
			include_body_sections,
		}
	})
}

/// Records sharing a title are one publication; untitled records each get their own.
fn expected_publications(records: &[Arc<PublicationRecord>]) -> usize {
	let titles: HashSet<&str> = records.iter().filter_map(|r| r.usable_title()).collect();
	let untitled = records.iter().filter(|r| r.usable_title().is_none()).count();
	titles.len() + untitled
}

fn assert_well_formed(data: &GraphData, records: &[Arc<PublicationRecord>]) -> Result<(), TestCaseError> {
	let ids: HashSet<_> = data.nodes.iter().map(|n| n.id.clone()).collect();
	prop_assert_eq!(ids.len(), data.nodes.len(), "duplicate node ids");
	prop_assert_eq!(data.count_of(NodeKind::Publication), expected_publications(records));

	for edge in &data.edges {
		let source = data.node(&edge.source);
		let target = data.node(&edge.target);
		prop_assert!(source.is_some(), "dangling source {}", edge.source);
		prop_assert!(target.is_some(), "dangling target {}", edge.target);
		prop_assert_eq!(source.map(|n| n.kind), Some(NodeKind::Publication));
		prop_assert_ne!(target.map(|n| n.kind), Some(NodeKind::Publication));
	}
	Ok(())
}

proptest! {
	#![proptest_config(ProptestConfig::with_cases(200))]

	#[test]
	fn build_is_deterministic(records in arb_records(), options in arb_options()) {
		prop_assert_eq!(build_with(&records, &options), build_with(&records, &options));
	}

	#[test]
	fn build_is_well_formed(records in arb_records(), options in arb_options()) {
		let data = build_with(&records, &options);
		assert_well_formed(&data, &records)?;
	}

	#[test]
	fn tag_nodes_unique_per_kind_and_label(records in arb_records(), options in arb_options()) {
		let data = build_with(&records, &options);
		let mut seen = HashSet::new();
		for node in data.nodes.iter().filter(|n| n.kind != NodeKind::Publication) {
			prop_assert!(
				seen.insert((node.kind, node.label.clone())),
				"tag {:?} {:?} emitted twice",
				node.kind,
				node.label
			);
		}
	}

	#[test]
	fn publication_nodes_keep_their_record(records in arb_records()) {
		let data = build_with(&records, &BuilderOptions::default());
		let publications: Vec<_> = data
			.nodes
			.iter()
			.filter(|n| n.kind == NodeKind::Publication)
			.collect();
		prop_assert_eq!(publications.len(), expected_publications(&records));
		for node in publications {
			let record = node.data.as_ref();
			prop_assert!(record.is_some());
			prop_assert!(records.iter().any(|r| record.is_some_and(|d| Arc::ptr_eq(r, d))));
		}
	}
}
