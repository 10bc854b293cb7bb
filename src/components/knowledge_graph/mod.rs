//! Knowledge graph over publication records: graph building, a force layout,
//! pan/zoom/drag interaction and a canvas surface.
//!
//! The engine modules are DOM-free. Only [`KnowledgeGraphCanvas`] touches the
//! browser.

pub mod builder;
mod component;
pub mod config;
pub mod interaction;
pub mod layout;
mod render;
pub mod scale;
pub mod state;
pub mod theme;
pub mod types;

pub use builder::{GraphScope, build, build_scoped, build_with};
pub use component::{KnowledgeGraphCanvas, SurfaceError};
pub use config::GraphConfig;
pub use state::{GraphHandle, MountOptions};
pub use types::{GraphData, GraphEdge, GraphNode, NodeDetail, NodeId, NodeKind, PublicationRecord};
