//! Publication dataset loading and lookups used by the pages.

use std::collections::HashMap;
use std::sync::Arc;

use log::{info, warn};
use serde_json::Value;
use thiserror::Error;

use crate::components::knowledge_graph::builder::parse_tags;
use crate::components::knowledge_graph::types::PublicationRecord;

/// Bundled dataset shipped with the app.
const BUNDLED: &str = include_str!("../data/publications.json");

#[derive(Debug, Error)]
pub enum DatasetError {
	#[error("dataset is not valid JSON: {0}")]
	Json(#[from] serde_json::Error),
	#[error("dataset must be a JSON array of records, found {0}")]
	NotAnArray(&'static str),
}

/// An ordered, immutable list of publication records.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dataset {
	pub records: Vec<Arc<PublicationRecord>>,
}

impl Dataset {
	/// Parses a JSON array of records. Non-object entries are skipped.
	pub fn from_json(text: &str) -> Result<Self, DatasetError> {
		let value: Value = serde_json::from_str(text)?;
		let Value::Array(items) = value else {
			return Err(DatasetError::NotAnArray(json_kind(&value)));
		};
		let total = items.len();
		let records: Vec<Arc<PublicationRecord>> = items
			.into_iter()
			.filter(Value::is_object)
			.filter_map(|item| serde_json::from_value(item).ok())
			.map(Arc::new)
			.collect();
		if records.len() < total {
			warn!("skipped {} malformed dataset entries", total - records.len());
		}
		info!("loaded {} publication records", records.len());
		Ok(Self { records })
	}

	/// The bundled dataset, or an empty one when it fails to parse.
	pub fn bundled() -> Self {
		Self::from_json(BUNDLED).unwrap_or_else(|e| {
			warn!("bundled dataset unusable: {e}");
			Self::default()
		})
	}

	pub fn len(&self) -> usize {
		self.records.len()
	}

	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}

	pub fn get(&self, index: usize) -> Option<&Arc<PublicationRecord>> {
		self.records.get(index)
	}

	/// Records whose title, author, abstract, topic or keywords contain every
	/// whitespace-separated term of `query`, case-insensitively. Returned with
	/// their dataset index.
	pub fn search(&self, query: &str) -> Vec<(usize, Arc<PublicationRecord>)> {
		let terms: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
		self.records
			.iter()
			.enumerate()
			.filter(|(_, record)| {
				if terms.is_empty() {
					return true;
				}
				let haystack = ["title", "author", "abstract", "topic", "keywords"]
					.iter()
					.filter_map(|key| record.text_field(key))
					.collect::<Vec<_>>()
					.join(" ")
					.to_lowercase();
				terms.iter().all(|term| haystack.contains(term.as_str()))
			})
			.map(|(index, record)| (index, record.clone()))
			.collect()
	}

	/// The `limit` most frequent topics by number of publications, ties broken
	/// alphabetically.
	pub fn top_topics(&self, limit: usize) -> Vec<(String, usize)> {
		let mut counts: HashMap<String, usize> = HashMap::new();
		for record in &self.records {
			for topic in parse_tags(record.topic.as_deref().unwrap_or_default()) {
				*counts.entry(topic).or_default() += 1;
			}
		}
		let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
		ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
		ranked.truncate(limit);
		ranked
	}
}

fn json_kind(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "a boolean",
		Value::Number(_) => "a number",
		Value::String(_) => "a string",
		Value::Array(_) => "an array",
		Value::Object(_) => "an object",
	}
}
