//! Derives the typed knowledge graph from publication records.
//!
//! Building is pure and cheap; views rebuild from scratch whenever the dataset
//! or the scope changes.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use log::debug;

use super::config::BuilderOptions;
use super::types::{GraphData, GraphEdge, GraphNode, NodeId, NodeKind, PublicationRecord};

/// Body sections turned into section nodes when enabled.
const BODY_SECTIONS: &[(&str, &str)] = &[
	("abstract", "Abstract"),
	("introduction", "Introduction"),
	("results", "Results"),
	("conclusion", "Conclusion"),
];

/// Which records a build covers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum GraphScope {
	/// Every record.
	#[default]
	All,
	/// The publication with this title plus every publication sharing a tag with it.
	Neighborhood(String),
}

/// Builds the graph over every record with default options.
pub fn build(records: &[Arc<PublicationRecord>]) -> GraphData {
	build_with(records, &BuilderOptions::default())
}

/// Builds the graph over every record.
pub fn build_with(records: &[Arc<PublicationRecord>], options: &BuilderOptions) -> GraphData {
	let mut builder = GraphBuilder::new(options);
	for (index, record) in records.iter().enumerate() {
		builder.add_record(index, record);
	}
	let data = builder.finish();
	debug!(
		"built graph from {} records: {} nodes, {} edges",
		records.len(),
		data.nodes.len(),
		data.edges.len()
	);
	data
}

/// Builds the graph over the records selected by `scope`.
///
/// An unknown neighbourhood title falls back to the whole dataset.
pub fn build_scoped(
	records: &[Arc<PublicationRecord>],
	scope: &GraphScope,
	options: &BuilderOptions,
) -> GraphData {
	match scope {
		GraphScope::All => build_with(records, options),
		GraphScope::Neighborhood(title) => {
			let title = title.trim();
			let Some(focus) = records.iter().find(|r| r.usable_title() == Some(title)) else {
				debug!("scope target {title:?} not in dataset, building full graph");
				return build_with(records, options);
			};
			let focus_tags: HashSet<(NodeKind, String)> = record_tags(focus, options).collect();
			let scoped: Vec<Arc<PublicationRecord>> = records
				.iter()
				.filter(|r| {
					Arc::ptr_eq(r, focus)
						|| r.usable_title() == Some(title)
						|| record_tags(r, options).any(|tag| focus_tags.contains(&tag))
				})
				.cloned()
				.collect();
			build_with(&scoped, options)
		}
	}
}

/// Splits a delimited field on commas, semicolons and newlines.
///
/// Returns trimmed, non-empty tags in order of first appearance, without repeats.
pub fn parse_tags(text: &str) -> Vec<String> {
	let mut seen = HashSet::new();
	text.split([',', ';', '\n', '\r'])
		.map(str::trim)
		.filter(|t| !t.is_empty())
		.filter(|t| seen.insert(*t))
		.map(str::to_string)
		.collect()
}

/// Every tag a record links to, keyed by the kind of node it becomes.
fn record_tags<'r>(
	record: &'r PublicationRecord,
	options: &'r BuilderOptions,
) -> impl Iterator<Item = (NodeKind, String)> + 'r {
	let topics = record
		.topic
		.as_deref()
		.map(parse_tags)
		.unwrap_or_default()
		.into_iter()
		.map(|t| (NodeKind::Section, t));
	let body = BODY_SECTIONS
		.iter()
		.filter(|_| options.include_body_sections)
		.filter(|(key, _)| record.text_field(key).is_some())
		.map(|(_, label)| (NodeKind::Section, label.to_string()));
	let keywords = record
		.keywords
		.as_deref()
		.map(parse_tags)
		.unwrap_or_default()
		.into_iter()
		.map(|t| (NodeKind::Keyword, t));
	let authors = record
		.author
		.as_deref()
		.filter(|_| options.include_authors)
		.map(str::trim)
		.filter(|a| !a.is_empty())
		.map(|a| (NodeKind::Author, a.to_string()));

	let mut seen = HashSet::new();
	topics
		.chain(body)
		.chain(keywords)
		.chain(authors)
		.filter(move |tag| seen.insert(tag.clone()))
}

struct GraphBuilder<'o> {
	options: &'o BuilderOptions,
	nodes: Vec<GraphNode>,
	edges: Vec<GraphEdge>,
	entities: HashMap<(NodeKind, String), usize>,
	taken: HashSet<String>,
}

impl<'o> GraphBuilder<'o> {
	fn new(options: &'o BuilderOptions) -> Self {
		Self {
			options,
			nodes: Vec::new(),
			edges: Vec::new(),
			entities: HashMap::new(),
			taken: HashSet::new(),
		}
	}

	fn add_record(&mut self, index: usize, record: &Arc<PublicationRecord>) {
		let publication = match record.usable_title() {
			Some(title) => self.intern(
				NodeKind::Publication,
				title,
				title.to_string(),
				Some(record.clone()),
			),
			None => {
				let id = self.claim(format!("paper-{index}"));
				let label = format!("Untitled {}", index + 1);
				self.push(id, NodeKind::Publication, label, Some(record.clone()))
			}
		};

		let options = self.options;
		for (kind, tag) in record_tags(record, options) {
			let target = self.intern(kind, &tag, tag.clone(), None);
			self.edges.push(GraphEdge {
				source: publication.clone(),
				target,
			});
		}
	}

	/// Returns the node for a logical entity, creating it on first sight.
	fn intern(
		&mut self,
		kind: NodeKind,
		key: &str,
		label: String,
		data: Option<Arc<PublicationRecord>>,
	) -> NodeId {
		if let Some(&index) = self.entities.get(&(kind, key.to_string())) {
			return self.nodes[index].id.clone();
		}
		let id = self.claim(format!("{}{}", kind.id_prefix(), key));
		self.entities.insert((kind, key.to_string()), self.nodes.len());
		self.push(id, kind, label, data)
	}

	/// Reserves `base`, suffixing it when another entity already holds it.
	fn claim(&mut self, base: String) -> NodeId {
		let mut candidate = base.clone();
		let mut n = 2;
		while self.taken.contains(&candidate) {
			candidate = format!("{base}#{n}");
			n += 1;
		}
		self.taken.insert(candidate.clone());
		NodeId::new(candidate)
	}

	fn push(
		&mut self,
		id: NodeId,
		kind: NodeKind,
		label: String,
		data: Option<Arc<PublicationRecord>>,
	) -> NodeId {
		self.nodes.push(GraphNode {
			id: id.clone(),
			kind,
			label,
			data,
		});
		id
	}

	fn finish(self) -> GraphData {
		GraphData {
			nodes: self.nodes,
			edges: self.edges,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn records(items: Vec<PublicationRecord>) -> Vec<Arc<PublicationRecord>> {
		items.into_iter().map(Arc::new).collect()
	}

	fn ids(data: &GraphData) -> Vec<&str> {
		data.nodes.iter().map(|n| n.id.as_str()).collect()
	}

	#[test]
	fn two_papers_sharing_a_topic() {
		let data = build(&records(vec![
			PublicationRecord::titled("A").with_topic("x,y"),
			PublicationRecord::titled("B").with_topic("y"),
		]));
		assert_eq!(ids(&data), vec!["A", "section:x", "section:y", "B"]);
		assert_eq!(
			data.edges,
			vec![
				GraphEdge::new("A", "section:x"),
				GraphEdge::new("A", "section:y"),
				GraphEdge::new("B", "section:y"),
			]
		);
	}

	#[test]
	fn empty_input_is_empty_graph() {
		assert_eq!(build(&[]), GraphData::default());
	}

	#[test]
	fn stray_separators_degrade_to_fewer_tags() {
		assert_eq!(parse_tags(" ,a;; b\n\n,a , "), vec!["a", "b"]);
		assert!(parse_tags(",;\n").is_empty());
	}

	#[test]
	fn blank_titles_get_unique_fallback_ids() {
		let data = build(&records(vec![
			PublicationRecord::titled("paper-1"),
			PublicationRecord::titled("   ").with_keywords("k"),
			PublicationRecord::default(),
		]));
		assert_eq!(ids(&data), vec!["paper-1", "paper-1#2", "keyword:k", "paper-2"]);
		assert_eq!(data.edges, vec![GraphEdge::new("paper-1#2", "keyword:k")]);
		assert!(data.nodes.iter().all(|n| n.data.is_some() || n.kind != NodeKind::Publication));
	}

	#[test]
	fn same_label_different_kinds_stay_distinct() {
		let data = build(&records(vec![
			PublicationRecord::titled("A").with_topic("graphs").with_keywords("graphs"),
		]));
		assert_eq!(ids(&data), vec!["A", "section:graphs", "keyword:graphs"]);
	}

	#[test]
	fn title_that_looks_like_a_tag_id_does_not_collide() {
		let data = build(&records(vec![
			PublicationRecord::titled("keyword:x"),
			PublicationRecord::titled("B").with_keywords("x"),
		]));
		assert_eq!(ids(&data), vec!["keyword:x", "B", "keyword:x#2"]);
		assert_eq!(data.node(&"keyword:x#2".into()).unwrap().kind, NodeKind::Keyword);
	}

	#[test]
	fn authors_and_body_sections_are_opt_in() {
		let mut record = PublicationRecord::titled("A").with_author("Ng");
		record.summary = Some("text".into());
		let input = records(vec![record]);

		assert_eq!(build(&input).nodes.len(), 1);

		let options = BuilderOptions {
			include_authors: true,
			include_body_sections: true,
		};
		let data = build_with(&input, &options);
		assert_eq!(ids(&data), vec!["A", "section:Abstract", "author:Ng"]);
		assert_eq!(data.node(&"author:Ng".into()).unwrap().kind, NodeKind::Author);
	}

	#[test]
	fn neighborhood_keeps_papers_sharing_a_tag() {
		let input = records(vec![
			PublicationRecord::titled("A").with_topic("x"),
			PublicationRecord::titled("B").with_topic("x,z"),
			PublicationRecord::titled("C").with_topic("z"),
		]);
		let scope = GraphScope::Neighborhood("A".into());
		let data = build_scoped(&input, &scope, &BuilderOptions::default());
		assert_eq!(ids(&data), vec!["A", "section:x", "B", "section:z"]);
	}

	#[test]
	fn unknown_neighborhood_falls_back_to_everything() {
		let input = records(vec![PublicationRecord::titled("A"), PublicationRecord::titled("B")]);
		let scope = GraphScope::Neighborhood("missing".into());
		assert_eq!(build_scoped(&input, &scope, &BuilderOptions::default()).nodes.len(), 2);
	}

	#[test]
	fn publication_nodes_carry_their_record() {
		let input = records(vec![PublicationRecord::titled("A").with_author("Ng")]);
		let data = build(&input);
		let record = data.nodes[0].data.as_ref().unwrap();
		assert!(Arc::ptr_eq(record, &input[0]));
	}
}
