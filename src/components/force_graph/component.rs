use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::error;
use wasm_bindgen::prelude::*;
use web_sys::{MouseEvent, WheelEvent, Window};

use super::config::{LayoutConfig, ViewportConfig};
use super::render::{self, CanvasScene};
use super::state::ForceGraphState;
use super::types::GraphModel;

type Session = Rc<RefCell<Option<(ForceGraphState, CanvasScene)>>>;

fn window_size(window: &Window) -> Option<(f64, f64)> {
	Some((
		window.inner_width().ok()?.as_f64()?,
		window.inner_height().ok()?.as_f64()?,
	))
}

fn pointer(canvas_id: &str, ev: &MouseEvent) -> Option<(f64, f64)> {
	let target = web_sys::window()?.document()?.get_element_by_id(canvas_id)?;
	let rect = target.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

/// Canvas hosting one layout session for `data`.
///
/// The session is aborted, with the reason logged, if the canvas cannot be
/// found by `canvas_id` or has no 2D context, or if `data` has dangling edges.
#[component]
pub fn ForceGraphCanvas(
	/// Graph to lay out. A new value starts a new session.
	#[prop(into)]
	data: Signal<GraphModel>,
	/// Element id of the canvas.
	#[prop(into, default = "reaction-graph".to_string())]
	canvas_id: String,
	/// Forces and cooling schedule.
	#[prop(default = LayoutConfig::default())]
	layout: LayoutConfig,
	/// Pan and zoom limits.
	#[prop(default = ViewportConfig::default())]
	viewport: ViewportConfig,
	/// Fill the window and follow its size.
	#[prop(default = false)]
	fullscreen: bool,
	/// Fixed width; defaults to the parent's.
	#[prop(default = None)]
	width: Option<f64>,
	/// Fixed height; defaults to the parent's.
	#[prop(default = None)]
	height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let session: Session = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (session_init, animate_init, resize_cb_init) =
		(session.clone(), animate.clone(), resize_cb.clone());
	let id = canvas_id.clone();

	Effect::new(move |_| {
		if canvas_ref.get().is_none() {
			return;
		}
		let (canvas, ctx) = match render::canvas_target(&id) {
			Ok(target) => target,
			Err(err) => {
				error!("{err}");
				return;
			}
		};
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = if fullscreen {
			window_size(&window).unwrap_or((800.0, 600.0))
		} else {
			(
				width.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_width() as f64)
						.unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_height() as f64)
						.unwrap_or(600.0)
				}),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let state = match ForceGraphState::new(data.get(), w, h, layout.clone(), viewport.clone()) {
			Ok(state) => state,
			Err(err) => {
				error!("cannot start layout: {err}");
				return;
			}
		};
		let mut scene = CanvasScene::new(ctx, w, h);
		state.mount(&mut scene);
		*session_init.borrow_mut() = Some((state, scene));

		if fullscreen {
			let (session_resize, canvas_resize) = (session_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some((nw, nh)) = web_sys::window().as_ref().and_then(window_size) else {
					return;
				};
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some((ref mut s, ref mut scene)) = *session_resize.borrow_mut() {
					s.resize(nw, nh);
					scene.resize(nw, nh);
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (session_anim, animate_inner) = (session_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Some((ref mut s, ref mut scene)) = *session_anim.borrow_mut() {
				s.step();
				if s.take_redraw() {
					render::render(s, scene);
				}
			}
			if let (Some(cb), Some(win)) = (animate_inner.borrow().as_ref(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let (session_md, id_md) = (session.clone(), canvas_id.clone());
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(&id_md, &ev) else {
			return;
		};
		if let Some((ref mut s, _)) = *session_md.borrow_mut() {
			s.pointer_down(x, y);
		}
	};

	let (session_mm, id_mm) = (session.clone(), canvas_id.clone());
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(&id_mm, &ev) else {
			return;
		};
		if let Some((ref mut s, _)) = *session_mm.borrow_mut() {
			s.pointer_move(x, y);
		}
	};

	let session_mu = session.clone();
	let on_mouseup = move |_: MouseEvent| {
		if let Some((ref mut s, _)) = *session_mu.borrow_mut() {
			s.pointer_up();
		}
	};

	let session_ml = session.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some((ref mut s, _)) = *session_ml.borrow_mut() {
			s.pointer_leave();
		}
	};

	let (session_wh, id_wh) = (session.clone(), canvas_id.clone());
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = pointer(&id_wh, &ev) else {
			return;
		};
		if let Some((ref mut s, _)) = *session_wh.borrow_mut() {
			s.wheel(x, y, ev.delta_y());
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			id=canvas_id
			class="force-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}
