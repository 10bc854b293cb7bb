//! Force-directed layout.
//!
//! A velocity-Verlet style simulation in the manner of d3-force: every tick
//! applies link, charge, centering and collision forces scaled by a decaying
//! `alpha`, then integrates velocities with damping. Pinned nodes hold their
//! position exactly and ignore forces.

use std::collections::HashMap;
use std::f64::consts::PI;

use log::warn;

use super::config::LayoutConfig;
use super::types::{GraphEdge, GraphNode, NodeId};

/// Mutable simulation state of one node.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Particle {
	pub x: f64,
	pub y: f64,
	pub vx: f64,
	pub vy: f64,
	/// Pinned x, authoritative over forces while set.
	pub fx: Option<f64>,
	/// Pinned y.
	pub fy: Option<f64>,
}

impl Particle {
	/// Whether the particle is pinned on either axis.
	pub fn is_pinned(&self) -> bool {
		self.fx.is_some() || self.fy.is_some()
	}
}

#[derive(Clone, Debug)]
struct Link {
	source: usize,
	target: usize,
	distance: f64,
	strength: f64,
	bias: f64,
}

/// Linear congruential generator used to break exact coincidences.
/// Deterministic so identical inputs lay out identically.
#[derive(Clone, Debug)]
struct Lcg(u64);

impl Lcg {
	const A: u64 = 1_664_525;
	const C: u64 = 1_013_904_223;
	const M: u64 = 1 << 32;

	fn next(&mut self) -> f64 {
		self.0 = (Self::A.wrapping_mul(self.0).wrapping_add(Self::C)) % Self::M;
		self.0 as f64 / Self::M as f64
	}

	/// A tiny non-zero offset.
	fn jiggle(&mut self) -> f64 {
		let j = (self.next() - 0.5) * 1e-6;
		if j == 0.0 { 1e-7 } else { j }
	}
}

/// Physics simulation owned by one mounted view.
#[derive(Clone, Debug)]
pub struct Simulation {
	config: LayoutConfig,
	particles: Vec<Particle>,
	radii: Vec<f64>,
	links: Vec<Link>,
	index: HashMap<NodeId, usize>,
	center: (f64, f64),
	alpha: f64,
	alpha_target: f64,
	stopped: bool,
	rng: Lcg,
}

impl Simulation {
	/// Seeds positions on a phyllotaxis spiral around the canvas center.
	///
	/// Edges referencing unknown nodes are skipped.
	pub fn new(
		nodes: &[GraphNode],
		edges: &[GraphEdge],
		width: f64,
		height: f64,
		config: LayoutConfig,
	) -> Self {
		let center = (width / 2.0, height / 2.0);
		let index: HashMap<NodeId, usize> = nodes
			.iter()
			.enumerate()
			.map(|(i, n)| (n.id.clone(), i))
			.collect();

		let golden = PI * (3.0 - 5f64.sqrt());
		let particles = if nodes.len() == 1 {
			vec![Particle {
				x: center.0,
				y: center.1,
				..Particle::default()
			}]
		} else {
			(0..nodes.len())
				.map(|i| {
					let (radius, angle) = (10.0 * (0.5 + i as f64).sqrt(), i as f64 * golden);
					Particle {
						x: center.0 + radius * angle.cos(),
						y: center.1 + radius * angle.sin(),
						..Particle::default()
					}
				})
				.collect()
		};
		let radii = nodes.iter().map(|n| config.collide_radius(n.kind)).collect();

		let mut resolved = Vec::with_capacity(edges.len());
		for edge in edges {
			match (index.get(&edge.source), index.get(&edge.target)) {
				(Some(&s), Some(&t)) if s != t => resolved.push((s, t)),
				(Some(_), Some(_)) => {}
				_ => warn!("skipping edge {} -> {} with unknown endpoint", edge.source, edge.target),
			}
		}
		let mut degree = vec![0usize; nodes.len()];
		for &(s, t) in &resolved {
			degree[s] += 1;
			degree[t] += 1;
		}
		let links = resolved
			.into_iter()
			.map(|(s, t)| Link {
				source: s,
				target: t,
				distance: config.link_distance(nodes[t].kind),
				strength: 1.0 / degree[s].min(degree[t]) as f64,
				bias: degree[s] as f64 / (degree[s] + degree[t]) as f64,
			})
			.collect();

		Self {
			alpha: config.alpha,
			alpha_target: 0.0,
			config,
			particles,
			radii,
			links,
			index,
			center,
			stopped: false,
			rng: Lcg(1),
		}
	}

	/// Advances one tick and returns the updated particles.
	///
	/// Runs even when settled; a stopped or empty simulation is left untouched.
	pub fn tick(&mut self) -> &[Particle] {
		if self.stopped || self.particles.is_empty() {
			return &self.particles;
		}
		self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;

		for _ in 0..self.config.link_iterations.max(1) {
			self.apply_links();
		}
		self.apply_charge();
		self.apply_center();
		self.apply_collide();

		let keep = 1.0 - self.config.velocity_decay;
		for p in &mut self.particles {
			match p.fx {
				Some(fx) => {
					p.x = fx;
					p.vx = 0.0;
				}
				None => {
					p.vx *= keep;
					p.x += p.vx;
				}
			}
			match p.fy {
				Some(fy) => {
					p.y = fy;
					p.vy = 0.0;
				}
				None => {
					p.vy *= keep;
					p.y += p.vy;
				}
			}
		}
		&self.particles
	}

	/// Frame-driven advance: ticks only while live and not yet settled.
	/// Returns whether a tick ran.
	pub fn step(&mut self) -> bool {
		if self.stopped || self.particles.is_empty() || self.is_settled() {
			return false;
		}
		self.tick();
		true
	}

	fn apply_links(&mut self) {
		let alpha = self.alpha;
		for link in &self.links {
			let (s, t) = (self.particles[link.source], self.particles[link.target]);
			let mut x = t.x + t.vx - s.x - s.vx;
			let mut y = t.y + t.vy - s.y - s.vy;
			if x == 0.0 {
				x = self.rng.jiggle();
			}
			if y == 0.0 {
				y = self.rng.jiggle();
			}
			let len = (x * x + y * y).sqrt();
			let l = (len - link.distance) / len * alpha * link.strength;
			let (x, y) = (x * l, y * l);

			let target = &mut self.particles[link.target];
			target.vx -= x * link.bias;
			target.vy -= y * link.bias;
			let source = &mut self.particles[link.source];
			source.vx += x * (1.0 - link.bias);
			source.vy += y * (1.0 - link.bias);
		}
	}

	fn apply_charge(&mut self) {
		let strength = self.config.charge_strength * self.alpha;
		let min2 = self.config.charge_distance_min.powi(2);
		let max2 = self.config.charge_distance_max.map(|d| d * d);
		let n = self.particles.len();

		for i in 0..n {
			for j in (i + 1)..n {
				let (a, b) = (self.particles[i], self.particles[j]);
				let mut x = b.x - a.x;
				let mut y = b.y - a.y;
				let mut l = x * x + y * y;
				if max2.is_some_and(|max2| l >= max2) {
					continue;
				}
				if x == 0.0 {
					x = self.rng.jiggle();
					l += x * x;
				}
				if y == 0.0 {
					y = self.rng.jiggle();
					l += y * y;
				}
				if l < min2 {
					l = (min2 * l).sqrt();
				}
				let w = strength / l;
				self.particles[i].vx += x * w;
				self.particles[i].vy += y * w;
				self.particles[j].vx -= x * w;
				self.particles[j].vy -= y * w;
			}
		}
	}

	fn apply_center(&mut self) {
		let n = self.particles.len() as f64;
		let (sx, sy) = self
			.particles
			.iter()
			.fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
		let strength = self.config.center_strength;
		let (dx, dy) = ((sx / n - self.center.0) * strength, (sy / n - self.center.1) * strength);
		for p in &mut self.particles {
			p.x -= dx;
			p.y -= dy;
		}
	}

	fn apply_collide(&mut self) {
		let strength = self.config.collide_strength;
		let n = self.particles.len();

		for i in 0..n {
			let ri = self.radii[i];
			let ri2 = ri * ri;
			let a = self.particles[i];
			let (xi, yi) = (a.x + a.vx, a.y + a.vy);
			for j in (i + 1)..n {
				let rj = self.radii[j];
				let r = ri + rj;
				let b = self.particles[j];
				let mut x = xi - b.x - b.vx;
				let mut y = yi - b.y - b.vy;
				let mut l = x * x + y * y;
				if l >= r * r {
					continue;
				}
				if x == 0.0 {
					x = self.rng.jiggle();
					l += x * x;
				}
				if y == 0.0 {
					y = self.rng.jiggle();
					l += y * y;
				}
				let len = l.sqrt();
				let k = (r - len) / len * strength;
				let (x, y) = (x * k, y * k);
				let share = rj * rj / (ri2 + rj * rj);
				self.particles[i].vx += x * share;
				self.particles[i].vy += y * share;
				self.particles[j].vx -= x * (1.0 - share);
				self.particles[j].vy -= y * (1.0 - share);
			}
		}
	}

	/// Sets alpha, waking a settled simulation.
	pub fn reheat(&mut self, alpha: f64) {
		if self.stopped {
			return;
		}
		self.alpha = alpha.clamp(0.0, 1.0);
	}

	/// Sets the value alpha decays toward. Non-zero keeps the simulation warm.
	pub fn set_alpha_target(&mut self, target: f64) {
		if self.stopped {
			return;
		}
		self.alpha_target = target.clamp(0.0, 1.0);
	}

	/// Fixes a node at `(x, y)` from the next tick on. Returns false for unknown ids.
	pub fn pin(&mut self, id: &NodeId, x: f64, y: f64) -> bool {
		match self.index.get(id) {
			Some(&i) => {
				self.particles[i].fx = Some(x);
				self.particles[i].fy = Some(y);
				true
			}
			None => false,
		}
	}

	/// Returns a pinned node to free simulation.
	pub fn unpin(&mut self, id: &NodeId) -> bool {
		match self.index.get(id) {
			Some(&i) => {
				self.particles[i].fx = None;
				self.particles[i].fy = None;
				true
			}
			None => false,
		}
	}

	/// Moves the centering target and mildly reheats.
	pub fn resize(&mut self, width: f64, height: f64) {
		if self.stopped {
			return;
		}
		self.center = (width / 2.0, height / 2.0);
		self.alpha = self.alpha.max(self.config.resize_alpha);
	}

	/// Halts the simulation for good; later ticks and reheats are ignored.
	pub fn stop(&mut self) {
		self.stopped = true;
	}

	pub fn is_stopped(&self) -> bool {
		self.stopped
	}

	/// Alpha has decayed below the configured minimum and nothing holds it up.
	pub fn is_settled(&self) -> bool {
		self.alpha < self.config.alpha_min && self.alpha_target < self.config.alpha_min
	}

	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	pub fn alpha_target(&self) -> f64 {
		self.alpha_target
	}

	pub fn center(&self) -> (f64, f64) {
		self.center
	}

	pub fn config(&self) -> &LayoutConfig {
		&self.config
	}

	pub fn particles(&self) -> &[Particle] {
		&self.particles
	}

	/// Index of a node in [`Self::particles`].
	pub fn index_of(&self, id: &NodeId) -> Option<usize> {
		self.index.get(id).copied()
	}

	/// Current position of a node.
	pub fn position(&self, id: &NodeId) -> Option<(f64, f64)> {
		self.index_of(id).map(|i| (self.particles[i].x, self.particles[i].y))
	}
}
