//! Property-based tests for the force layout and zoom policy.
//!
//! - identical inputs give identical trajectories
//! - a simulation always settles within the alpha schedule, with finite positions
//! - by the time it settles, nodes have effectively stopped moving
//! - pinned nodes stay exactly where they were pinned
//! - the zoom scale never leaves its configured extent

use std::sync::Arc;

use knowledge_graph_canvas::components::knowledge_graph::config::{LabelPolicy, LayoutConfig, ZoomConfig};
use knowledge_graph_canvas::components::knowledge_graph::interaction::Controller;
use knowledge_graph_canvas::components::knowledge_graph::layout::Simulation;
use knowledge_graph_canvas::components::knowledge_graph::{GraphData, PublicationRecord, build};
use proptest::prelude::*;

fn arb_graph() -> impl Strategy<Value = GraphData> {
	prop::collection::vec(("[a-f]{1,2}", "[a-d,]{0,6}"), 0..10).prop_map(|items| {
		let records: Vec<Arc<PublicationRecord>> = items
			.into_iter()
			.map(|(title, topic)| Arc::new(PublicationRecord::titled(title).with_topic(topic)))
			.collect();
		build(&records)
	})
}

fn simulation(data: &GraphData) -> Simulation {
	Simulation::new(&data.nodes, &data.edges, 800.0, 600.0, LayoutConfig::default())
}

/// Ticks needed for alpha to fall from its start below the minimum.
fn settle_budget(config: &LayoutConfig) -> usize {
	((config.alpha_min / config.alpha).ln() / (1.0 - config.alpha_decay).ln()).ceil() as usize + 2
}

proptest! {
	#![proptest_config(ProptestConfig::with_cases(64))]

	#[test]
	fn same_graph_same_trajectory(data in arb_graph(), ticks in 1usize..80) {
		let (mut a, mut b) = (simulation(&data), simulation(&data));
		for _ in 0..ticks {
			a.tick();
			b.tick();
		}
		prop_assert_eq!(a.particles(), b.particles());
	}

	#[test]
	fn settles_within_schedule_with_finite_positions(data in arb_graph()) {
		let mut sim = simulation(&data);
		let budget = settle_budget(sim.config());
		let mut steps = 0;
		while sim.step() {
			steps += 1;
			prop_assert!(steps <= budget, "still running after {} steps", steps);
		}
		if !data.nodes.is_empty() {
			prop_assert!(sim.is_settled());
		}
		for p in sim.particles() {
			prop_assert!(p.x.is_finite() && p.y.is_finite(), "non-finite particle {:?}", p);
		}
	}

	#[test]
	fn displacement_vanishes_by_the_last_step(data in arb_graph()) {
		prop_assume!(!data.nodes.is_empty());
		let mut sim = simulation(&data);
		let mut last_displacement = f64::INFINITY;
		loop {
			let before: Vec<(f64, f64)> = sim.particles().iter().map(|p| (p.x, p.y)).collect();
			if !sim.step() {
				break;
			}
			last_displacement = sim
				.particles()
				.iter()
				.zip(&before)
				.map(|(p, &(x, y))| ((p.x - x).powi(2) + (p.y - y).powi(2)).sqrt())
				.sum();
		}
		prop_assert!(
			last_displacement < data.nodes.len() as f64,
			"{} nodes still moved {} on the final step",
			data.nodes.len(),
			last_displacement
		);
	}

	#[test]
	fn pinned_node_holds_position(
		data in arb_graph(),
		pick in any::<prop::sample::Index>(),
		x in -500.0f64..500.0,
		y in -500.0f64..500.0,
		ticks in 1usize..60,
	) {
		prop_assume!(!data.nodes.is_empty());
		let id = data.nodes[pick.index(data.nodes.len())].id.clone();
		let mut sim = simulation(&data);
		prop_assert!(sim.pin(&id, x, y));
		for _ in 0..ticks {
			sim.tick();
		}
		prop_assert_eq!(sim.position(&id), Some((x, y)));
	}

	#[test]
	fn zoom_clamp_stays_in_extent(k in prop::num::f64::ANY) {
		let zoom = ZoomConfig::default();
		let clamped = zoom.clamp(k);
		prop_assert!(clamped >= zoom.min_scale && clamped <= zoom.max_scale);
	}

	#[test]
	fn wheel_sequence_never_escapes_extent(
		deltas in prop::collection::vec(-500.0f64..500.0, 1..40),
		sx in 0.0f64..800.0,
		sy in 0.0f64..600.0,
	) {
		let zoom = ZoomConfig::default();
		let mut controller = Controller::new(
			Vec::new(),
			zoom.clone(),
			LabelPolicy::default(),
			&LayoutConfig::default(),
		);
		for delta in deltas {
			controller.wheel(sx, sy, delta);
			let k = controller.transform.k;
			prop_assert!(k >= zoom.min_scale && k <= zoom.max_scale, "scale {} escaped", k);
		}
	}
}
