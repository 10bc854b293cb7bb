use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, info};

use super::config::GraphConfig;
use super::interaction::{Controller, ViewTransform};
use super::layout::Simulation;
use super::types::{GraphData, NodeDetail, NodeId, NodeKind};

/// Invoked synchronously when a node is clicked.
pub type SelectCallback = Rc<dyn Fn(&NodeDetail)>;

/// Everything a host passes when mounting a view.
#[derive(Clone, Default)]
pub struct MountOptions {
	pub config: GraphConfig,
	/// Node to center and zoom on once the layout settles.
	pub focus: Option<NodeId>,
	pub on_select: Option<SelectCallback>,
}

/// One mounted graph: the built data, its simulation and its controller.
pub struct GraphView {
	pub data: GraphData,
	pub sim: Simulation,
	pub controller: Controller,
	pub width: f64,
	pub height: f64,
	ids: Vec<NodeId>,
	kinds: Vec<NodeKind>,
}

impl GraphView {
	pub fn new(data: GraphData, width: f64, height: f64, config: &GraphConfig) -> Self {
		let sim = Simulation::new(&data.nodes, &data.edges, width, height, config.layout.clone());
		let mut adjacency = vec![Vec::new(); data.nodes.len()];
		for edge in &data.edges {
			if let (Some(s), Some(t)) = (sim.index_of(&edge.source), sim.index_of(&edge.target)) {
				adjacency[s].push(t);
				adjacency[t].push(s);
			}
		}
		let controller = Controller::new(
			adjacency,
			config.zoom.clone(),
			config.labels.clone(),
			&config.layout,
		);
		let ids = data.nodes.iter().map(|n| n.id.clone()).collect();
		let kinds = data.nodes.iter().map(|n| n.kind).collect();

		Self {
			data,
			sim,
			controller,
			width,
			height,
			ids,
			kinds,
		}
	}

	/// Advances the simulation by one tick (if unsettled) and animations by `dt` seconds.
	/// Returns whether anything moved.
	pub fn frame(&mut self, dt: f64) -> bool {
		let ticked = self.sim.step();
		let animating = self.controller.is_focusing() || self.controller.has_active_highlight();
		self.controller.update(dt, &self.sim, self.width, self.height);
		ticked || animating
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.sim.resize(width, height);
	}

	/// Queues a focus on `id`. Unknown ids are ignored.
	pub fn focus(&mut self, id: &NodeId) -> bool {
		match self.sim.index_of(id) {
			Some(idx) => {
				self.controller.request_focus(idx);
				true
			}
			None => {
				debug!("focus target {id} not in graph");
				false
			}
		}
	}

	pub fn detail(&self, idx: usize) -> Option<NodeDetail> {
		self.data.detail(self.ids.get(idx)?)
	}

	pub fn kind(&self, idx: usize) -> NodeKind {
		self.kinds[idx]
	}

	pub fn pointer_down(&mut self, x: f64, y: f64) {
		self.controller
			.pointer_down(&mut self.sim, &self.ids, &self.kinds, x, y);
	}

	pub fn pointer_move(&mut self, x: f64, y: f64) {
		self.controller
			.pointer_move(&mut self.sim, &self.ids, &self.kinds, x, y);
	}

	pub fn pointer_up(&mut self) -> Option<NodeDetail> {
		let clicked = self.controller.pointer_up(&mut self.sim, &self.ids)?;
		self.detail(clicked)
	}

	pub fn pointer_leave(&mut self) {
		self.controller.pointer_leave(&mut self.sim, &self.ids);
	}

	/// Zooms about the viewport center, as the zoom buttons do.
	pub fn zoom_by(&mut self, factor: f64) {
		self.controller
			.zoom_at(self.width / 2.0, self.height / 2.0, factor);
	}

	pub fn reset_view(&mut self) {
		self.controller.set_transform(ViewTransform::default());
	}
}

/// Host-facing handle to a mounted view.
///
/// Cloning shares the view. After [`GraphHandle::destroy`], or when mounted
/// without a container, every method is a no-op.
#[derive(Clone, Default)]
pub struct GraphHandle {
	view: Rc<RefCell<Option<GraphView>>>,
	on_select: Option<SelectCallback>,
}

impl GraphHandle {
	/// Mounts a view over `data` in a viewport of the given size.
	/// A missing viewport yields a detached handle.
	pub fn mount(viewport: Option<(f64, f64)>, data: GraphData, options: MountOptions) -> Self {
		let Some((width, height)) = viewport else {
			debug!("no container to mount graph into");
			return Self::default();
		};
		let mut view = GraphView::new(data, width, height, &options.config);
		if let Some(focus) = &options.focus {
			view.focus(focus);
		}
		info!(
			"mounted graph: {} nodes, {} edges in {width}x{height}",
			view.data.nodes.len(),
			view.data.edges.len()
		);
		Self {
			view: Rc::new(RefCell::new(Some(view))),
			on_select: options.on_select,
		}
	}

	pub fn is_live(&self) -> bool {
		self.view.borrow().is_some()
	}

	/// Runs `f` against the live view.
	pub fn with_view<R>(&self, f: impl FnOnce(&GraphView) -> R) -> Option<R> {
		self.view.borrow().as_ref().map(f)
	}

	fn with_view_mut<R>(&self, f: impl FnOnce(&mut GraphView) -> R) -> Option<R> {
		self.view.borrow_mut().as_mut().map(f)
	}

	pub fn frame(&self, dt: f64) -> bool {
		self.with_view_mut(|v| v.frame(dt)).unwrap_or(false)
	}

	pub fn resize(&self, width: f64, height: f64) {
		self.with_view_mut(|v| v.resize(width, height));
	}

	pub fn focus(&self, id: &NodeId) {
		self.with_view_mut(|v| v.focus(id));
	}

	pub fn pointer_down(&self, x: f64, y: f64) {
		self.with_view_mut(|v| v.pointer_down(x, y));
	}

	pub fn pointer_move(&self, x: f64, y: f64) {
		self.with_view_mut(|v| v.pointer_move(x, y));
	}

	/// Ends a gesture; a click selects and notifies the host.
	pub fn pointer_up(&self) -> Option<NodeDetail> {
		let detail = self.with_view_mut(|v| v.pointer_up()).flatten()?;
		// The view borrow is released so the callback may call back into the handle.
		if let Some(on_select) = &self.on_select {
			on_select(&detail);
		}
		Some(detail)
	}

	pub fn pointer_leave(&self) {
		self.with_view_mut(|v| v.pointer_leave());
	}

	pub fn wheel(&self, x: f64, y: f64, delta_y: f64) {
		self.with_view_mut(|v| v.controller.wheel(x, y, delta_y));
	}

	pub fn zoom_by(&self, factor: f64) {
		self.with_view_mut(|v| v.zoom_by(factor));
	}

	pub fn reset_view(&self) {
		self.with_view_mut(|v| v.reset_view());
	}

	/// Stops the simulation and releases the view. Safe to call repeatedly.
	pub fn destroy(&self) {
		if let Some(mut view) = self.view.borrow_mut().take() {
			view.sim.stop();
			info!("destroyed graph with {} nodes", view.data.nodes.len());
		}
	}
}

#[cfg(test)]
mod tests {
	use std::cell::Cell;
	use std::sync::Arc;

	use super::*;
	use crate::components::knowledge_graph::builder::build;
	use crate::components::knowledge_graph::types::PublicationRecord;

	fn sample() -> GraphData {
		let records: Vec<Arc<PublicationRecord>> = vec![
			PublicationRecord::titled("A").with_topic("x,y"),
			PublicationRecord::titled("B").with_topic("y"),
		]
		.into_iter()
		.map(Arc::new)
		.collect();
		build(&records)
	}

	fn screen_of(handle: &GraphHandle, id: &str) -> (f64, f64) {
		handle
			.with_view(|v| {
				let (x, y) = v.sim.position(&id.into()).unwrap();
				v.controller.transform.graph_to_screen(x, y)
			})
			.unwrap()
	}

	#[test]
	fn missing_container_gives_inert_handle() {
		let handle = GraphHandle::mount(None, sample(), MountOptions::default());
		assert!(!handle.is_live());
		assert!(!handle.frame(0.016));
		handle.resize(10.0, 10.0);
		handle.focus(&"A".into());
		handle.pointer_down(1.0, 1.0);
		assert_eq!(handle.pointer_up(), None);
		handle.destroy();
	}

	#[test]
	fn destroy_is_idempotent_and_silences_handlers() {
		let handle = GraphHandle::mount(Some((800.0, 600.0)), sample(), MountOptions::default());
		assert!(handle.is_live());
		assert!(handle.frame(0.016));
		let (sx, sy) = screen_of(&handle, "A");

		handle.destroy();
		handle.destroy();
		assert!(!handle.is_live());
		handle.pointer_down(sx, sy);
		handle.pointer_move(sx + 40.0, sy);
		assert_eq!(handle.pointer_up(), None);
		handle.wheel(sx, sy, -1.0);
		assert!(!handle.frame(0.016));
		assert_eq!(handle.with_view(|_| ()), None);
	}

	#[test]
	fn click_reports_detail_to_host() {
		let seen = Rc::new(Cell::new(0usize));
		let sink = seen.clone();
		let options = MountOptions {
			on_select: Some(Rc::new(move |detail: &NodeDetail| {
				assert_eq!(detail.id.as_str(), "section:y");
				assert_eq!(detail.kind, NodeKind::Section);
				sink.set(detail.connections);
			})),
			..MountOptions::default()
		};
		let handle = GraphHandle::mount(Some((800.0, 600.0)), sample(), options);
		for _ in 0..400 {
			handle.frame(0.016);
		}
		let (sx, sy) = screen_of(&handle, "section:y");
		handle.pointer_down(sx, sy);
		let detail = handle.pointer_up().unwrap();
		assert_eq!(detail.label, "y");
		assert_eq!(seen.get(), 2);
		assert!(detail.record.is_none());
	}

	#[test]
	fn publication_detail_carries_record() {
		let handle = GraphHandle::mount(Some((800.0, 600.0)), sample(), MountOptions::default());
		let detail = handle.with_view(|v| v.detail(0)).flatten().unwrap();
		assert_eq!(detail.kind, NodeKind::Publication);
		assert_eq!(detail.connections, 2);
		assert_eq!(detail.record.unwrap().usable_title(), Some("A"));
	}

	#[test]
	fn unknown_focus_leaves_transform_alone() {
		let options = MountOptions {
			focus: Some("nope".into()),
			..MountOptions::default()
		};
		let handle = GraphHandle::mount(Some((800.0, 600.0)), sample(), options);
		for _ in 0..400 {
			handle.frame(0.016);
		}
		let transform = handle.with_view(|v| v.controller.transform).unwrap();
		assert_eq!(transform, ViewTransform::default());
	}

	#[test]
	fn mount_focus_centers_target_after_settling() {
		let options = MountOptions {
			focus: Some("B".into()),
			..MountOptions::default()
		};
		let handle = GraphHandle::mount(Some((800.0, 600.0)), sample(), options);
		for _ in 0..400 {
			handle.frame(0.016);
		}
		let (sx, sy) = screen_of(&handle, "B");
		assert!((sx - 400.0).abs() < 1e-6 && (sy - 300.0).abs() < 1e-6, "B at {sx},{sy}");
		assert_eq!(handle.with_view(|v| v.controller.selected), Some(Some(3)));
	}

	#[test]
	fn zoom_buttons_scale_about_center_and_reset() {
		let handle = GraphHandle::mount(Some((800.0, 600.0)), sample(), MountOptions::default());
		handle.zoom_by(2.0);
		let transform = handle.with_view(|v| v.controller.transform).unwrap();
		assert_eq!(transform.k, 2.0);
		assert_eq!(transform.screen_to_graph(400.0, 300.0), (400.0, 300.0));
		handle.reset_view();
		assert_eq!(
			handle.with_view(|v| v.controller.transform),
			Some(ViewTransform::default())
		);
	}

	#[test]
	fn resize_updates_bounds_and_reheats() {
		let handle = GraphHandle::mount(Some((800.0, 600.0)), sample(), MountOptions::default());
		while handle.with_view(|v| v.sim.is_settled()) == Some(false) {
			handle.frame(0.016);
		}
		handle.resize(400.0, 300.0);
		let (center, settled, size) = handle
			.with_view(|v| (v.sim.center(), v.sim.is_settled(), (v.width, v.height)))
			.unwrap();
		assert_eq!(center, (200.0, 150.0));
		assert!(!settled);
		assert_eq!(size, (400.0, 300.0));
	}
}
