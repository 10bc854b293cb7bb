//! Gesture handling: pan, zoom, drag, hover, selection and focus.
//!
//! The controller never owns node positions. Drags go through the simulation
//! as pins; pan and zoom only touch the view transform.

use std::collections::HashSet;

use super::config::{LabelPolicy, LayoutConfig, ZoomConfig};
use super::layout::Simulation;
use super::theme;
use super::types::{NodeId, NodeKind};

/// Pointer travel in screen pixels below which a press counts as a click.
pub const CLICK_SLOP: f64 = 3.0;

pub fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

/// Maps graph space to screen space: `screen = graph * k + (x, y)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

impl ViewTransform {
	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		((sx - self.x) / self.k, (sy - self.y) / self.k)
	}

	pub fn graph_to_screen(&self, gx: f64, gy: f64) -> (f64, f64) {
		(gx * self.k + self.x, gy * self.k + self.y)
	}

	/// Transform placing graph point `(gx, gy)` at the middle of the viewport.
	pub fn centered_on(gx: f64, gy: f64, k: f64, width: f64, height: f64) -> Self {
		Self {
			x: width / 2.0 - gx * k,
			y: height / 2.0 - gy * k,
			k,
		}
	}

	fn lerp(&self, to: &Self, t: f64) -> Self {
		Self {
			x: self.x + (to.x - self.x) * t,
			y: self.y + (to.y - self.y) * t,
			k: self.k + (to.k - self.k) * t,
		}
	}
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node_idx: Option<usize>,
	pub start_x: f64,
	pub start_y: f64,
	/// Pointer left the click slop since the press.
	pub moved: bool,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
	pub moved: bool,
}

#[derive(Clone, Debug, Default)]
pub struct HoverState {
	pub node: Option<usize>,
	pub neighbors: HashSet<usize>,
	pub highlight_t: f64,
	pub prev_node: Option<usize>,
	pub prev_neighbors: HashSet<usize>,
	delay_t: f64,
}

/// Eases the view onto a node, then follows it until the layout settles.
#[derive(Clone, Copy, Debug)]
struct FocusAnimation {
	idx: usize,
	from: ViewTransform,
	k: f64,
	elapsed: f64,
	duration: f64,
}

/// Pan/zoom, drag and selection state of one mounted view.
#[derive(Clone, Debug)]
pub struct Controller {
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub hover: HoverState,
	pub selected: Option<usize>,
	adjacency: Vec<Vec<usize>>,
	pending_focus: Option<usize>,
	focus: Option<FocusAnimation>,
	zoom: ZoomConfig,
	labels: LabelPolicy,
	drag_alpha_target: f64,
	focus_settle_alpha: f64,
}

impl Controller {
	/// `adjacency[i]` lists the neighbours of node `i`.
	pub fn new(
		adjacency: Vec<Vec<usize>>,
		zoom: ZoomConfig,
		labels: LabelPolicy,
		layout: &LayoutConfig,
	) -> Self {
		Self {
			transform: ViewTransform::default(),
			drag: DragState::default(),
			pan: PanState::default(),
			hover: HoverState::default(),
			selected: None,
			adjacency,
			pending_focus: None,
			focus: None,
			zoom,
			labels,
			drag_alpha_target: layout.drag_alpha_target,
			focus_settle_alpha: layout.focus_settle_alpha,
		}
	}

	pub fn zoom_config(&self) -> &ZoomConfig {
		&self.zoom
	}

	pub fn label_policy(&self) -> &LabelPolicy {
		&self.labels
	}

	/// Nearest node whose pick radius contains the screen point.
	pub fn node_at_position(
		&self,
		sim: &Simulation,
		kinds: &[NodeKind],
		sx: f64,
		sy: f64,
	) -> Option<usize> {
		let (gx, gy) = self.transform.screen_to_graph(sx, sy);
		sim.particles()
			.iter()
			.zip(kinds)
			.enumerate()
			.filter_map(|(idx, (p, &kind))| {
				let d = ((p.x - gx).powi(2) + (p.y - gy).powi(2)).sqrt();
				(d < theme::hit_radius(kind)).then_some((idx, d))
			})
			.min_by(|a, b| a.1.total_cmp(&b.1))
			.map(|(idx, _)| idx)
	}

	/// Press: starts a node drag or a background pan. A gesture still in
	/// progress is released first.
	pub fn pointer_down(
		&mut self,
		sim: &mut Simulation,
		ids: &[NodeId],
		kinds: &[NodeKind],
		sx: f64,
		sy: f64,
	) {
		self.focus = None;
		self.end_drag(sim, ids);
		self.pan = PanState::default();
		match self.node_at_position(sim, kinds, sx, sy) {
			Some(idx) => {
				let (gx, gy) = self.transform.screen_to_graph(sx, sy);
				sim.pin(&ids[idx], gx, gy);
				sim.set_alpha_target(self.drag_alpha_target);
				self.drag = DragState {
					active: true,
					node_idx: Some(idx),
					start_x: sx,
					start_y: sy,
					moved: false,
				};
			}
			None => {
				self.pan = PanState {
					active: true,
					start_x: sx,
					start_y: sy,
					transform_start_x: self.transform.x,
					transform_start_y: self.transform.y,
					moved: false,
				};
			}
		}
	}

	/// Move: updates the dragged pin, the pan offset, or the hover target.
	pub fn pointer_move(
		&mut self,
		sim: &mut Simulation,
		ids: &[NodeId],
		kinds: &[NodeKind],
		sx: f64,
		sy: f64,
	) {
		if self.drag.active {
			if let Some(idx) = self.drag.node_idx {
				let (gx, gy) = self.transform.screen_to_graph(sx, sy);
				sim.pin(&ids[idx], gx, gy);
				if travel(self.drag.start_x, self.drag.start_y, sx, sy) > CLICK_SLOP {
					self.drag.moved = true;
				}
			}
		} else if self.pan.active {
			self.focus = None;
			self.transform.x = self.pan.transform_start_x + (sx - self.pan.start_x);
			self.transform.y = self.pan.transform_start_y + (sy - self.pan.start_y);
			if travel(self.pan.start_x, self.pan.start_y, sx, sy) > CLICK_SLOP {
				self.pan.moved = true;
			}
		} else {
			let hovered = self.node_at_position(sim, kinds, sx, sy);
			self.set_hover(hovered);
		}
	}

	/// Release: ends drag or pan. Returns the node clicked, if the press never
	/// left the click slop.
	pub fn pointer_up(&mut self, sim: &mut Simulation, ids: &[NodeId]) -> Option<usize> {
		let clicked = self.end_drag(sim, ids);
		if self.pan.active && !self.pan.moved {
			self.selected = None;
		}
		self.pan = PanState::default();
		if clicked.is_some() {
			self.selected = clicked;
		}
		clicked
	}

	/// Pointer left the surface: abandon gestures and hover.
	pub fn pointer_leave(&mut self, sim: &mut Simulation, ids: &[NodeId]) {
		self.end_drag(sim, ids);
		self.pan = PanState::default();
		self.set_hover(None);
	}

	fn end_drag(&mut self, sim: &mut Simulation, ids: &[NodeId]) -> Option<usize> {
		if !self.drag.active {
			return None;
		}
		let drag = std::mem::take(&mut self.drag);
		let idx = drag.node_idx?;
		sim.unpin(&ids[idx]);
		sim.set_alpha_target(0.0);
		(!drag.moved).then_some(idx)
	}

	/// Wheel zoom anchored at the pointer.
	pub fn wheel(&mut self, sx: f64, sy: f64, delta_y: f64) {
		let factor = if delta_y > 0.0 {
			1.0 / self.zoom.wheel_factor
		} else {
			self.zoom.wheel_factor
		};
		self.zoom_at(sx, sy, factor);
	}

	/// Scales by `factor` keeping the screen point `(sx, sy)` fixed.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
		self.focus = None;
		let new_k = self.zoom.clamp(self.transform.k * factor);
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	/// Replaces the transform, clamping its scale.
	pub fn set_transform(&mut self, transform: ViewTransform) {
		self.focus = None;
		self.transform = ViewTransform {
			k: self.zoom.clamp(transform.k),
			..transform
		};
	}

	/// Centers and zooms on `idx` once the layout has had a settling pass.
	pub fn request_focus(&mut self, idx: usize) {
		self.pending_focus = Some(idx);
		self.selected = Some(idx);
	}

	pub fn is_focusing(&self) -> bool {
		self.pending_focus.is_some() || self.focus.is_some()
	}

	pub fn set_hover(&mut self, node: Option<usize>) {
		if self.hover.node == node {
			return;
		}
		let was_hovering = self.hover.node.is_some();

		// Save previous state for fade-out
		if was_hovering && node.is_none() {
			self.hover.prev_node = self.hover.node.take();
			self.hover.prev_neighbors = std::mem::take(&mut self.hover.neighbors);
		} else {
			self.hover.prev_node = None;
			self.hover.prev_neighbors.clear();
		}

		self.hover.node = node;
		self.hover.neighbors.clear();

		if let Some(idx) = node {
			if !was_hovering {
				self.hover.delay_t = 0.0;
			}
			if let Some(adjacent) = self.adjacency.get(idx) {
				self.hover.neighbors.extend(adjacent.iter().copied());
			}
		}
	}

	pub fn is_highlighted(&self, idx: usize) -> bool {
		self.hover.node == Some(idx)
			|| self.hover.neighbors.contains(&idx)
			|| self.hover.prev_node == Some(idx)
			|| self.hover.prev_neighbors.contains(&idx)
	}

	pub fn is_hovered(&self, idx: usize) -> bool {
		self.hover.node == Some(idx) || self.hover.prev_node == Some(idx)
	}

	pub fn has_active_highlight(&self) -> bool {
		self.hover.node.is_some() || self.hover.prev_node.is_some()
	}

	/// Whether the label of node `idx` is drawn at the current zoom.
	pub fn label_visible(&self, idx: usize, kind: NodeKind) -> bool {
		self.hover.node == Some(idx)
			|| self.selected == Some(idx)
			|| self.labels.shows_label(kind, self.transform.k)
	}

	/// Per-frame animation: hover fade and focus transition.
	pub fn update(&mut self, dt: f64, sim: &Simulation, width: f64, height: f64) {
		self.update_hover(dt);

		if let Some(idx) = self.pending_focus {
			if sim.is_settled() || sim.alpha() < self.focus_settle_alpha {
				self.pending_focus = None;
				self.focus = Some(FocusAnimation {
					idx,
					from: self.transform,
					k: self.zoom.clamp(self.zoom.focus_scale),
					elapsed: 0.0,
					duration: self.zoom.focus_duration.max(f64::EPSILON),
				});
			}
		}

		if let Some(mut anim) = self.focus {
			let Some(p) = sim.particles().get(anim.idx) else {
				self.focus = None;
				return;
			};
			anim.elapsed += dt;
			let t = (anim.elapsed / anim.duration).min(1.0);
			let to = ViewTransform::centered_on(p.x, p.y, anim.k, width, height);
			self.transform = anim.from.lerp(&to, ease_out_cubic(t));
			let done = t >= 1.0 && sim.is_settled();
			self.focus = (!done).then_some(anim);
		}
	}

	fn update_hover(&mut self, dt: f64) {
		let (target, delay, speed) = if self.hover.node.is_some() {
			(1.0, 0.08, 1.8)
		} else {
			(0.0, 0.0, 1.26)
		};

		if self.hover.node.is_some() {
			self.hover.delay_t = (self.hover.delay_t + dt).min(delay);
			if self.hover.delay_t >= delay {
				self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt;
			}
		} else {
			self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt;
			if self.hover.highlight_t < 0.01 {
				self.hover.highlight_t = 0.0;
				self.hover.prev_node = None;
				self.hover.prev_neighbors.clear();
			}
		}
	}
}

fn travel(x0: f64, y0: f64, x1: f64, y1: f64) -> f64 {
	((x1 - x0).powi(2) + (y1 - y0).powi(2)).sqrt()
}
