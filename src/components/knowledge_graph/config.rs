//! Tunables for building, laying out and viewing a graph.
//!
//! Every struct deserializes with defaults filled in, so a host can override a
//! single value from JSON without restating the rest.

use serde::Deserialize;

use super::types::NodeKind;

/// Aggregate configuration for one graph view.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
	pub builder: BuilderOptions,
	pub layout: LayoutConfig,
	pub zoom: ZoomConfig,
	pub labels: LabelPolicy,
}

impl GraphConfig {
	/// Parses a (possibly partial) JSON override.
	pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(text)
	}
}

/// Which optional node kinds the builder derives.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BuilderOptions {
	/// Add an author node per distinct author string.
	pub include_authors: bool,
	/// Add Abstract/Introduction/Results/Conclusion section nodes for records
	/// carrying that text.
	pub include_body_sections: bool,
}

/// Force simulation parameters.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
	pub alpha: f64,
	pub alpha_min: f64,
	/// Per-tick decay rate toward `alpha_target`.
	pub alpha_decay: f64,
	/// Target held while a node is dragged.
	pub drag_alpha_target: f64,
	/// Fraction of velocity removed every tick.
	pub velocity_decay: f64,
	pub link_distance_section: f64,
	pub link_distance_keyword: f64,
	pub link_distance_author: f64,
	pub link_iterations: usize,
	/// Negative values repel.
	pub charge_strength: f64,
	/// Pairs closer than this are treated as this far apart.
	pub charge_distance_min: f64,
	pub charge_distance_max: Option<f64>,
	pub center_strength: f64,
	pub collide_radius_publication: f64,
	pub collide_radius_tag: f64,
	pub collide_strength: f64,
	/// Alpha applied after a container resize.
	pub resize_alpha: f64,
	/// A pending focus resolves once alpha has fallen below this.
	pub focus_settle_alpha: f64,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		let alpha_min: f64 = 0.001;
		Self {
			alpha: 1.0,
			alpha_min,
			alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
			drag_alpha_target: 0.3,
			velocity_decay: 0.4,
			link_distance_section: 90.0,
			link_distance_keyword: 70.0,
			link_distance_author: 110.0,
			link_iterations: 1,
			charge_strength: -300.0,
			charge_distance_min: 1.0,
			charge_distance_max: None,
			center_strength: 1.0,
			collide_radius_publication: 18.0,
			collide_radius_tag: 12.0,
			collide_strength: 0.7,
			resize_alpha: 0.3,
			focus_settle_alpha: 0.1,
		}
	}
}

impl LayoutConfig {
	/// Rest length of an edge ending at a node of `kind`.
	pub fn link_distance(&self, kind: NodeKind) -> f64 {
		match kind {
			NodeKind::Section => self.link_distance_section,
			NodeKind::Keyword => self.link_distance_keyword,
			NodeKind::Author | NodeKind::Publication => self.link_distance_author,
		}
	}

	/// Separation radius of a node of `kind`.
	pub fn collide_radius(&self, kind: NodeKind) -> f64 {
		match kind {
			NodeKind::Publication => self.collide_radius_publication,
			_ => self.collide_radius_tag,
		}
	}
}

/// Pan/zoom limits and focus animation.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
	pub min_scale: f64,
	pub max_scale: f64,
	/// Scale multiplier per wheel notch.
	pub wheel_factor: f64,
	/// Scale the view animates to when focusing a node.
	pub focus_scale: f64,
	/// Focus animation length in seconds.
	pub focus_duration: f64,
}

impl Default for ZoomConfig {
	fn default() -> Self {
		Self {
			min_scale: 0.2,
			max_scale: 4.0,
			wheel_factor: 1.1,
			focus_scale: 1.8,
			focus_duration: 0.75,
		}
	}
}

/// Label decluttering and legibility.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LabelPolicy {
	/// Publication labels appear at or above this zoom scale.
	pub publication_min_scale: f64,
	/// On-screen font size at scale 1.
	pub base_font: f64,
	pub min_font: f64,
	pub max_font: f64,
	/// Publication titles longer than this are truncated.
	pub max_chars: usize,
}

impl Default for LabelPolicy {
	fn default() -> Self {
		Self {
			publication_min_scale: 1.2,
			base_font: 11.0,
			min_font: 8.0,
			max_font: 16.0,
			max_chars: 60,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn partial_override_keeps_defaults() {
		let config =
			GraphConfig::from_json(r#"{"zoom": {"max_scale": 8.0}, "builder": {"include_authors": true}}"#)
				.unwrap();
		assert_eq!(config.zoom.max_scale, 8.0);
		assert_eq!(config.zoom.min_scale, 0.2);
		assert!(config.builder.include_authors);
		assert_eq!(config.layout, LayoutConfig::default());
	}

	#[test]
	fn tag_links_are_shorter_than_author_links() {
		let layout = LayoutConfig::default();
		assert!(layout.link_distance(NodeKind::Keyword) < layout.link_distance(NodeKind::Author));
		assert!(layout.link_distance(NodeKind::Section) < layout.link_distance(NodeKind::Author));
		assert!(layout.collide_radius(NodeKind::Publication) > layout.collide_radius(NodeKind::Keyword));
	}
}
