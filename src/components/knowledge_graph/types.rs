//! Graph data structures produced by the builder and consumed by the surface.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A publication as supplied by the host dataset.
///
/// Only the fields the builder reads are typed; everything else is kept in
/// `extra` untouched.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct PublicationRecord {
	/// Unique key of the publication. Blank titles get a generated id.
	#[serde(default, deserialize_with = "lenient_text")]
	pub title: Option<String>,
	#[serde(default, deserialize_with = "lenient_text")]
	pub author: Option<String>,
	#[serde(default, rename = "abstract", deserialize_with = "lenient_text")]
	pub summary: Option<String>,
	/// Delimited list of topics; each becomes a section node.
	#[serde(default, deserialize_with = "lenient_text")]
	pub topic: Option<String>,
	/// Delimited list of free-text keywords.
	#[serde(default, deserialize_with = "lenient_text")]
	pub keywords: Option<String>,
	#[serde(default, deserialize_with = "lenient_text")]
	pub link: Option<String>,
	#[serde(flatten)]
	pub extra: BTreeMap<String, Value>,
}

impl PublicationRecord {
	/// Creates a record with a title and nothing else.
	pub fn titled(title: impl Into<String>) -> Self {
		Self {
			title: Some(title.into()),
			..Self::default()
		}
	}

	/// Sets the topic list.
	pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
		self.topic = Some(topic.into());
		self
	}

	/// Sets the keyword list.
	pub fn with_keywords(mut self, keywords: impl Into<String>) -> Self {
		self.keywords = Some(keywords.into());
		self
	}

	/// Sets the author field.
	pub fn with_author(mut self, author: impl Into<String>) -> Self {
		self.author = Some(author.into());
		self
	}

	/// Trimmed title, or `None` when absent or blank.
	pub fn usable_title(&self) -> Option<&str> {
		self.title
			.as_deref()
			.map(str::trim)
			.filter(|t| !t.is_empty())
	}

	/// Looks up a text field by its dataset key, typed or free-form.
	pub fn text_field(&self, key: &str) -> Option<&str> {
		let typed = match key {
			"title" => self.title.as_deref(),
			"author" => self.author.as_deref(),
			"abstract" => self.summary.as_deref(),
			"topic" => self.topic.as_deref(),
			"keywords" => self.keywords.as_deref(),
			"link" => self.link.as_deref(),
			_ => self.extra.get(key).and_then(Value::as_str),
		};
		typed.map(str::trim).filter(|t| !t.is_empty())
	}

	/// Free-form field rendered as display text (numbers included).
	pub fn display_field(&self, key: &str) -> Option<String> {
		if let Some(text) = self.text_field(key) {
			return Some(text.to_string());
		}
		match self.extra.get(key)? {
			Value::Number(n) => Some(n.to_string()),
			Value::Bool(b) => Some(b.to_string()),
			_ => None,
		}
	}
}

/// Accepts strings, arrays, numbers and booleans; anything else reads as absent.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
	D: Deserializer<'de>,
{
	let value = Value::deserialize(deserializer)?;
	Ok(value_to_text(&value))
}

fn value_to_text(value: &Value) -> Option<String> {
	match value {
		Value::String(s) => Some(s.clone()),
		Value::Number(n) => Some(n.to_string()),
		Value::Bool(b) => Some(b.to_string()),
		Value::Array(items) => {
			let parts: Vec<String> = items.iter().filter_map(value_to_text).collect();
			(!parts.is_empty()).then(|| parts.join(","))
		}
		Value::Null | Value::Object(_) => None,
	}
}

/// Globally unique node identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
	/// Wraps a raw id string.
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	/// The raw id.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for NodeId {
	fn from(id: &str) -> Self {
		Self(id.to_string())
	}
}

impl From<String> for NodeId {
	fn from(id: String) -> Self {
		Self(id)
	}
}

/// Node taxonomy. `Author` is only produced when enabled in the builder options.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
	/// A paper.
	Publication,
	/// A topic tag or a body section such as "Abstract".
	Section,
	/// A free-text keyword.
	Keyword,
	/// An author name.
	Author,
}

impl NodeKind {
	/// Every kind, in legend order.
	pub const ALL: [NodeKind; 4] = [
		NodeKind::Publication,
		NodeKind::Section,
		NodeKind::Keyword,
		NodeKind::Author,
	];

	/// Namespace prepended to ids of tag nodes.
	pub fn id_prefix(self) -> &'static str {
		match self {
			NodeKind::Publication => "",
			NodeKind::Section => "section:",
			NodeKind::Keyword => "keyword:",
			NodeKind::Author => "author:",
		}
	}

	/// Human readable name.
	pub fn name(self) -> &'static str {
		match self {
			NodeKind::Publication => "Publication",
			NodeKind::Section => "Section",
			NodeKind::Keyword => "Keyword",
			NodeKind::Author => "Author",
		}
	}
}

impl fmt::Display for NodeKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

/// A vertex of the knowledge graph. Identity and kind never change after build.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
	/// Unique id.
	pub id: NodeId,
	/// Node type.
	pub kind: NodeKind,
	/// Display label.
	pub label: String,
	/// Originating record, publication nodes only.
	pub data: Option<Arc<PublicationRecord>>,
}

/// A publication-to-tag connection. Undirected for layout.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GraphEdge {
	/// Publication end.
	pub source: NodeId,
	/// Tag end.
	pub target: NodeId,
}

impl GraphEdge {
	/// Creates an edge.
	pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
		Self {
			source: source.into(),
			target: target.into(),
		}
	}

	/// Whether either endpoint is `id`.
	pub fn touches(&self, id: &NodeId) -> bool {
		&self.source == id || &self.target == id
	}
}

/// Complete graph data: nodes and edges.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphData {
	pub nodes: Vec<GraphNode>,
	pub edges: Vec<GraphEdge>,
}

impl GraphData {
	/// Looks up a node by id.
	pub fn node(&self, id: &NodeId) -> Option<&GraphNode> {
		self.nodes.iter().find(|n| &n.id == id)
	}

	/// Publication node built from `record`. Falls back to a publication
	/// labelled with the same title when the record was merged into an earlier one.
	pub fn node_for_record(&self, record: &Arc<PublicationRecord>) -> Option<&GraphNode> {
		let publications = || self.nodes.iter().filter(|n| n.kind == NodeKind::Publication);
		publications()
			.find(|n| n.data.as_ref().is_some_and(|d| Arc::ptr_eq(d, record)))
			.or_else(|| {
				let title = record.usable_title()?;
				publications().find(|n| n.label == title)
			})
	}

	/// Number of edges touching `id`, counting repeated edges.
	pub fn degree(&self, id: &NodeId) -> usize {
		self.edges.iter().filter(|e| e.touches(id)).count()
	}

	/// Number of nodes of a given kind.
	pub fn count_of(&self, kind: NodeKind) -> usize {
		self.nodes.iter().filter(|n| n.kind == kind).count()
	}

	/// Detail surfaced to the host when `id` is selected.
	pub fn detail(&self, id: &NodeId) -> Option<NodeDetail> {
		let node = self.node(id)?;
		Some(NodeDetail {
			id: node.id.clone(),
			kind: node.kind,
			label: node.label.clone(),
			connections: self.degree(id),
			record: node.data.clone(),
		})
	}
}

/// What the selection callback receives.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeDetail {
	pub id: NodeId,
	pub kind: NodeKind,
	pub label: String,
	/// Edges touching the node.
	pub connections: usize,
	/// Originating record for publication nodes.
	pub record: Option<Arc<PublicationRecord>>,
}
