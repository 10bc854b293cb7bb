use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use log::warn;
use send_wrapper::SendWrapper;
use thiserror::Error;
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, ResizeObserver, WheelEvent, Window,
};

use super::config::GraphConfig;
use super::render;
use super::state::{GraphHandle, MountOptions, SelectCallback};
use super::theme;
use super::types::{GraphData, NodeDetail, NodeId, NodeKind};

/// Why a canvas surface could not be brought up.
#[derive(Debug, Error)]
pub enum SurfaceError {
	#[error("no browser window")]
	NoWindow,
	#[error("canvas has no 2d context")]
	NoContext,
	#[error("javascript error: {0}")]
	Js(String),
}

impl From<JsValue> for SurfaceError {
	fn from(value: JsValue) -> Self {
		Self::Js(format!("{value:?}"))
	}
}

#[derive(Clone)]
struct SurfaceProps {
	fullscreen: bool,
	width: Option<f64>,
	height: Option<f64>,
	focus: Option<NodeId>,
	config: GraphConfig,
	on_select: Option<SelectCallback>,
}

/// Browser resources tied to one mount. Dropping them all on teardown leaves
/// no frame callbacks, listeners or observers behind.
#[derive(Default)]
struct Surface {
	handle: GraphHandle,
	animate: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>,
	frame_id: Rc<Cell<Option<i32>>>,
	window_resize: Option<Closure<dyn FnMut()>>,
	observer: Option<(ResizeObserver, Closure<dyn FnMut(js_sys::Array)>)>,
}

impl Surface {
	fn teardown(&mut self) {
		self.handle.destroy();
		let window = web_sys::window();
		if let (Some(id), Some(window)) = (self.frame_id.take(), &window) {
			let _ = window.cancel_animation_frame(id);
		}
		self.animate.borrow_mut().take();
		if let (Some(cb), Some(window)) = (self.window_resize.take(), &window) {
			let _ = window.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}
		if let Some((observer, _cb)) = self.observer.take() {
			observer.disconnect();
		}
	}
}

fn viewport_size(window: &Window, canvas: &HtmlCanvasElement, props: &SurfaceProps) -> (f64, f64) {
	if props.fullscreen {
		let dim = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64());
		return (
			dim(window.inner_width()).unwrap_or(800.0),
			dim(window.inner_height()).unwrap_or(600.0),
		);
	}
	let parent = canvas.parent_element();
	(
		props.width.unwrap_or_else(|| {
			parent
				.as_ref()
				.map(|p| p.client_width() as f64)
				.unwrap_or(800.0)
		}),
		props.height.unwrap_or_else(|| {
			parent
				.as_ref()
				.map(|p| p.client_height() as f64)
				.unwrap_or(600.0)
		}),
	)
}

fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, SurfaceError> {
	canvas
		.get_context("2d")?
		.ok_or(SurfaceError::NoContext)?
		.dyn_into()
		.map_err(|_| SurfaceError::NoContext)
}

fn start(
	canvas: &HtmlCanvasElement,
	data: GraphData,
	props: SurfaceProps,
) -> Result<Surface, SurfaceError> {
	let window = web_sys::window().ok_or(SurfaceError::NoWindow)?;
	let (w, h) = viewport_size(&window, canvas, &props);
	canvas.set_width(w as u32);
	canvas.set_height(h as u32);
	let ctx = context_2d(canvas)?;

	let handle = GraphHandle::mount(
		Some((w, h)),
		data,
		MountOptions {
			config: props.config.clone(),
			focus: props.focus.clone(),
			on_select: props.on_select.clone(),
		},
	);
	let mut surface = Surface {
		handle: handle.clone(),
		..Surface::default()
	};

	if props.fullscreen {
		let (handle_resize, canvas_resize) = (handle.clone(), canvas.clone());
		let cb = Closure::<dyn FnMut()>::new(move || {
			let Some(win) = web_sys::window() else {
				return;
			};
			let (nw, nh) = (
				win.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(800.0),
				win.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(600.0),
			);
			canvas_resize.set_width(nw as u32);
			canvas_resize.set_height(nh as u32);
			handle_resize.resize(nw, nh);
		});
		window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref())?;
		surface.window_resize = Some(cb);
	} else if props.width.is_none() || props.height.is_none() {
		if let Some(parent) = canvas.parent_element() {
			let (handle_resize, canvas_resize, props_resize) =
				(handle.clone(), canvas.clone(), props.clone());
			let cb = Closure::<dyn FnMut(js_sys::Array)>::new(move |_entries: js_sys::Array| {
				let Some(win) = web_sys::window() else {
					return;
				};
				let (nw, nh) = viewport_size(&win, &canvas_resize, &props_resize);
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				handle_resize.resize(nw, nh);
			});
			let observer = ResizeObserver::new(cb.as_ref().unchecked_ref())?;
			observer.observe(&parent);
			surface.observer = Some((observer, cb));
		}
	}

	let (handle_anim, animate_inner, frame_inner) = (
		handle.clone(),
		surface.animate.clone(),
		surface.frame_id.clone(),
	);
	let mut last: Option<f64> = None;
	*surface.animate.borrow_mut() = Some(Closure::new(move |now: f64| {
		if !handle_anim.is_live() {
			return;
		}
		let dt = last.map_or(0.016, |prev| ((now - prev) / 1000.0).clamp(0.0, 0.1));
		last = Some(now);
		handle_anim.frame(dt);
		handle_anim.with_view(|view| render::render(view, &ctx));

		if let (Some(cb), Some(win)) = (&*animate_inner.borrow(), web_sys::window()) {
			frame_inner.set(win.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
		}
	}));
	if let Some(ref cb) = *surface.animate.borrow() {
		surface
			.frame_id
			.set(window.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
	}

	Ok(surface)
}

/// Pointer position relative to the canvas.
fn local_point(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

/// Interactive knowledge graph drawn on a canvas.
///
/// Rebuilds its simulation whenever `data` changes and tears everything down
/// on unmount. `focus` centers the view on a node once the layout settles.
#[component]
pub fn KnowledgeGraphCanvas(
	#[prop(into)] data: Signal<GraphData>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
	#[prop(default = None)] focus: Option<NodeId>,
	#[prop(optional)] config: GraphConfig,
	#[prop(optional)] on_select: Option<Callback<NodeDetail>>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let surface: Rc<RefCell<Surface>> = Rc::new(RefCell::new(Surface::default()));
	let zoom_step = config.zoom.wheel_factor.powi(2);
	let props = SurfaceProps {
		fullscreen,
		width,
		height,
		focus,
		config,
		on_select: on_select.map(|cb| -> SelectCallback {
			Rc::new(move |detail: &NodeDetail| cb.run(detail.clone()))
		}),
	};

	let surface_init = surface.clone();
	Effect::new(move |_| {
		let data = data.get();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		surface_init.borrow_mut().teardown();
		match start(&canvas, data, props.clone()) {
			Ok(started) => *surface_init.borrow_mut() = started,
			Err(e) => warn!("graph surface unavailable: {e}"),
		}
	});

	let surface_cleanup = SendWrapper::new(surface.clone());
	on_cleanup(move || surface_cleanup.borrow_mut().teardown());

	let handle = {
		let surface = surface.clone();
		move || surface.borrow().handle.clone()
	};

	let h = handle.clone();
	let on_mousedown = move |ev: MouseEvent| {
		// primary button only
		if ev.button() != 0 {
			return;
		}
		if let Some((x, y)) = local_point(canvas_ref, &ev) {
			h().pointer_down(x, y);
		}
	};
	let h = handle.clone();
	let on_mousemove = move |ev: MouseEvent| {
		if let Some((x, y)) = local_point(canvas_ref, &ev) {
			h().pointer_move(x, y);
		}
	};
	let h = handle.clone();
	let on_mouseup = move |_: MouseEvent| {
		h().pointer_up();
	};
	let h = handle.clone();
	let on_mouseleave = move |_: MouseEvent| h().pointer_leave();
	let h = handle.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		if let Some((x, y)) = local_point(canvas_ref, &ev) {
			h().wheel(x, y, ev.delta_y());
		}
	};
	let h = handle.clone();
	let zoom_in = move |_| h().zoom_by(zoom_step);
	let h = handle.clone();
	let zoom_out = move |_| h().zoom_by(1.0 / zoom_step);
	let h = handle;
	let reset = move |_| h().reset_view();

	let legend = move || {
		let data = data.get();
		NodeKind::ALL
			.into_iter()
			.map(|kind| (kind, data.count_of(kind)))
			.filter(|&(_, count)| count > 0)
			.map(|(kind, count)| {
				view! {
					<li class="graph-legend-item">
						<span class="graph-legend-swatch" style:background=theme::kind_color(kind) />
						<span>{kind.name()}</span>
						<span class="graph-legend-count">{count}</span>
					</li>
				}
			})
			.collect_view()
	};

	view! {
		<div class="graph-surface" style="position: relative; width: 100%; height: 100%; overflow: hidden;">
			<canvas
				node_ref=canvas_ref
				class="knowledge-graph-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				style="display: block; cursor: grab;"
			/>
			<div class="graph-controls">
				<button title="Zoom in" on:click=zoom_in>"+"</button>
				<button title="Zoom out" on:click=zoom_out>"−"</button>
				<button title="Reset view" on:click=reset>"⟳"</button>
			</div>
			<ul class="graph-legend">{legend}</ul>
		</div>
	}
}
