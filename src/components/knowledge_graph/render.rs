use std::borrow::Cow;
use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::config::LabelPolicy;
use super::interaction::ease_out_cubic;
use super::state::GraphView;
use super::theme;
use super::types::GraphNode;

pub fn render(view: &GraphView, ctx: &CanvasRenderingContext2d) {
	let transform = view.controller.transform;
	ctx.set_fill_style_str(theme::BACKGROUND);
	ctx.fill_rect(0.0, 0.0, view.width, view.height);
	ctx.save();
	let _ = ctx.translate(transform.x, transform.y);
	let _ = ctx.scale(transform.k, transform.k);
	draw_edges(view, ctx);
	draw_nodes(view, ctx);
	ctx.restore();
}

fn draw_edges(view: &GraphView, ctx: &CanvasRenderingContext2d) {
	let ctl = &view.controller;
	let k = ctl.transform.k;
	let (line_width, arrow_size) = (1.2 / k.max(0.5), 6.0 / k.max(0.5));
	let t = ease_out_cubic(ctl.hover.highlight_t);
	let particles = view.sim.particles();

	for edge in &view.data.edges {
		let (Some(si), Some(ti)) = (view.sim.index_of(&edge.source), view.sim.index_of(&edge.target))
		else {
			continue;
		};
		let (s, d) = (particles[si], particles[ti]);
		let (dx, dy) = (d.x - s.x, d.y - s.y);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < 0.001 {
			continue;
		}

		// t=0: all edges at base (0.6), t=1: highlighted at 0.9, others at 0.15
		let alpha = if ctl.is_highlighted(si) && ctl.is_highlighted(ti) {
			0.6 + 0.3 * t
		} else {
			0.6 - 0.45 * t
		};
		let color = format!("rgba({}, {})", theme::EDGE, alpha);
		let (r_src, r_dst) = (
			theme::node_radius(view.kind(si)),
			theme::node_radius(view.kind(ti)),
		);

		let (ux, uy) = (dx / dist, dy / dist);
		ctx.set_stroke_style_str(&color);
		ctx.set_line_width(line_width);
		ctx.begin_path();
		ctx.move_to(s.x + ux * r_src, s.y + uy * r_src);
		ctx.line_to(d.x - ux * (r_dst + arrow_size), d.y - uy * (r_dst + arrow_size));
		ctx.stroke();

		let (tip_x, tip_y) = (d.x - ux * r_dst, d.y - uy * r_dst);
		let (back_x, back_y) = (tip_x - ux * arrow_size, tip_y - uy * arrow_size);
		let (px, py) = (-uy * arrow_size * 0.5, ux * arrow_size * 0.5);
		ctx.set_fill_style_str(&color);
		ctx.begin_path();
		ctx.move_to(tip_x, tip_y);
		ctx.line_to(back_x + px, back_y + py);
		ctx.line_to(back_x - px, back_y - py);
		ctx.close_path();
		ctx.fill();
	}
}

fn draw_nodes(view: &GraphView, ctx: &CanvasRenderingContext2d) {
	let ctl = &view.controller;
	let (has_highlight, t, k) = (
		ctl.has_active_highlight(),
		ease_out_cubic(ctl.hover.highlight_t),
		ctl.transform.k,
	);
	let policy = ctl.label_policy();
	let font = policy.font_world(k);
	ctx.set_font(&format!("{font}px sans-serif"));

	// Dimmed nodes first so highlighted ones draw on top.
	for pass_highlighted in [false, true] {
		for (idx, (node, p)) in view.data.nodes.iter().zip(view.sim.particles()).enumerate() {
			let highlighted = has_highlight && ctl.is_highlighted(idx);
			if highlighted != pass_highlighted {
				continue;
			}
			let base = theme::node_radius(node.kind);
			let (alpha, radius) = if !has_highlight {
				(1.0, base)
			} else if ctl.is_hovered(idx) {
				(1.0, base * (1.0 + 0.35 * t))
			} else if highlighted {
				(1.0, base * (1.0 + 0.2 * t))
			} else {
				(1.0 - 0.7 * t, base * (1.0 - 0.15 * t))
			};

			ctx.set_global_alpha(alpha);
			ctx.begin_path();
			let _ = ctx.arc(p.x, p.y, radius, 0.0, 2.0 * PI);
			ctx.set_fill_style_str(theme::node_color(node));
			ctx.fill();
			let selected = ctl.selected == Some(idx);
			ctx.set_stroke_style_str(if selected {
				theme::SELECTED_STROKE
			} else {
				theme::NODE_STROKE
			});
			ctx.set_line_width(if selected { 2.5 / k } else { 1.5 / k });
			ctx.stroke();

			if ctl.label_visible(idx, node.kind) {
				let x = p.x + radius + 3.0 / k;
				let lines = label_lines(node, ctl.is_hovered(idx), policy);
				for (line, text) in lines.iter().enumerate() {
					let (rgb, a) = if line == 0 {
						(theme::LABEL, alpha * 0.9)
					} else {
						(theme::EDGE, alpha * t)
					};
					ctx.set_fill_style_str(&format!("rgba({rgb}, {a})"));
					let _ = ctx.fill_text(text, x, p.y + 3.0 / k + font * line as f64);
				}
			}
			ctx.set_global_alpha(1.0);
		}
	}
}

/// Text drawn beside a node: the (possibly shortened) label, or when hovered
/// the full label followed by the node kind.
fn label_lines<'a>(node: &'a GraphNode, hovered: bool, policy: &LabelPolicy) -> Vec<Cow<'a, str>> {
	if hovered {
		vec![Cow::Borrowed(node.label.as_str()), Cow::Borrowed(node.kind.name())]
	} else {
		vec![policy.display_label(node.kind, &node.label)]
	}
}
