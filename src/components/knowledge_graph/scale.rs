//! Zoom-dependent visual policy.
//!
//! Everything here is a pure function of the current zoom scale, recomputed
//! whenever the transform changes rather than toggled imperatively.

use std::borrow::Cow;

use super::config::{LabelPolicy, ZoomConfig};
use super::types::NodeKind;

impl ZoomConfig {
	/// Clamps a requested scale into `[min_scale, max_scale]`. Swapped bounds
	/// from a partial override are reordered rather than trusted.
	pub fn clamp(&self, k: f64) -> f64 {
		let (lo, hi) = ordered(self.min_scale, self.max_scale);
		if k.is_nan() {
			return lo;
		}
		k.max(lo).min(hi)
	}
}

impl LabelPolicy {
	/// Publication labels declutter at low zoom; tag labels are always shown.
	pub fn shows_label(&self, kind: NodeKind, k: f64) -> bool {
		match kind {
			NodeKind::Publication => k >= self.publication_min_scale,
			_ => true,
		}
	}

	/// On-screen font size in pixels, growing with zoom within legible bounds.
	pub fn font_px(&self, k: f64) -> f64 {
		let (lo, hi) = ordered(self.min_font, self.max_font);
		(self.base_font * k).max(lo).min(hi)
	}

	/// Font size in graph units, for drawing inside the scaled context.
	pub fn font_world(&self, k: f64) -> f64 {
		self.font_px(k) / k
	}

	/// Shortens long publication titles; other labels pass through.
	pub fn display_label<'a>(&self, kind: NodeKind, label: &'a str) -> Cow<'a, str> {
		if kind != NodeKind::Publication || label.chars().count() <= self.max_chars {
			return Cow::Borrowed(label);
		}
		let short: String = label.chars().take(self.max_chars).collect();
		Cow::Owned(format!("{}...", short.trim_end()))
	}
}

fn ordered(a: f64, b: f64) -> (f64, f64) {
	if a <= b { (a, b) } else { (b, a) }
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::knowledge_graph::config::GraphConfig;

	#[test]
	fn scale_is_clamped_to_extent() {
		let zoom = ZoomConfig::default();
		assert_eq!(zoom.clamp(0.01), 0.2);
		assert_eq!(zoom.clamp(100.0), 4.0);
		assert_eq!(zoom.clamp(1.5), 1.5);
		assert_eq!(zoom.clamp(f64::NAN), 0.2);
	}

	#[test]
	fn inverted_zoom_override_does_not_panic() {
		let zoom = GraphConfig::from_json(r#"{"zoom": {"min_scale": 5.0}}"#)
			.unwrap()
			.zoom;
		assert_eq!(zoom.clamp(1.0), 4.0);
		assert_eq!(zoom.clamp(10.0), 5.0);
		assert_eq!(zoom.clamp(f64::NAN), 4.0);
	}

	#[test]
	fn inverted_font_override_does_not_panic() {
		let policy = GraphConfig::from_json(r#"{"labels": {"min_font": 20.0}}"#)
			.unwrap()
			.labels;
		assert_eq!(policy.font_px(1.0), 16.0);
		assert_eq!(policy.font_px(0.1), 16.0);
		assert_eq!(policy.font_px(4.0), 20.0);
	}

	#[test]
	fn publication_labels_hide_when_zoomed_out() {
		let policy = LabelPolicy::default();
		assert!(!policy.shows_label(NodeKind::Publication, 0.5));
		assert!(policy.shows_label(NodeKind::Publication, 2.0));
		assert!(policy.shows_label(NodeKind::Keyword, 0.2));
		assert!(policy.shows_label(NodeKind::Section, 0.2));
	}

	#[test]
	fn font_size_is_bounded() {
		let policy = LabelPolicy::default();
		assert_eq!(policy.font_px(0.2), policy.min_font);
		assert_eq!(policy.font_px(4.0), policy.max_font);
		assert_eq!(policy.font_px(1.0), policy.base_font);
		assert!((policy.font_world(2.0) - 8.0).abs() < 1e-9);
	}

	#[test]
	fn long_titles_are_truncated() {
		let policy = LabelPolicy {
			max_chars: 5,
			..LabelPolicy::default()
		};
		assert_eq!(policy.display_label(NodeKind::Publication, "Microgravity"), "Micro...");
		assert_eq!(policy.display_label(NodeKind::Keyword, "Microgravity"), "Microgravity");
		assert_eq!(policy.display_label(NodeKind::Publication, "Bone"), "Bone");
	}
}
