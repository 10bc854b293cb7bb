//! Colours and sizes per node kind.

use super::types::{GraphNode, NodeKind};

/// Palette for section nodes, picked by a hash of the id.
const SECTION_COLORS: &[&str] = &[
	"#8dd3c7", "#bebada", "#fb8072", "#80b1d3", "#fdb462", "#b3de69", "#fccde5", "#bc80bd",
	"#ccebc5", "#ffed6f",
];

pub const BACKGROUND: &str = "#ffffff";
pub const EDGE: &str = "100, 116, 139";
pub const LABEL: &str = "17, 24, 39";
pub const NODE_STROKE: &str = "#ffffff";
pub const SELECTED_STROKE: &str = "#111827";

/// Drawn radius in graph units.
pub fn node_radius(kind: NodeKind) -> f64 {
	match kind {
		NodeKind::Publication => 8.0,
		_ => 6.0,
	}
}

/// Pointer pick radius in graph units; a little larger than the drawn circle.
pub fn hit_radius(kind: NodeKind) -> f64 {
	node_radius(kind) + 4.0
}

/// Legend colour of a kind.
pub fn kind_color(kind: NodeKind) -> &'static str {
	match kind {
		NodeKind::Publication => "#2563eb",
		NodeKind::Section => "#0369a1",
		NodeKind::Keyword => "#10b981",
		NodeKind::Author => "#f59e0b",
	}
}

/// Fill colour of a node. Sections vary by id so neighbouring topics differ.
pub fn node_color(node: &GraphNode) -> &'static str {
	match node.kind {
		NodeKind::Section => {
			let hash = node
				.id
				.as_str()
				.bytes()
				.fold(0u32, |h, b| h.wrapping_mul(31).wrapping_add(b as u32));
			SECTION_COLORS[hash as usize % SECTION_COLORS.len()]
		}
		kind => kind_color(kind),
	}
}
