use std::collections::HashSet;
use std::f64::consts::PI;

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::scene::Scene;
use super::simulation::NodeIdx;
use super::state::{ForceGraphState, NODE_RADIUS};
use super::types::GraphNode;
use super::viewport::ZoomTransform;
use crate::error::{Error, Result};
use crate::pipeline::equation::compound_id;

const BACKGROUND: &str = "#1a1a2e";
const NAMED: &str = "#1f77b4";
/// Nodes still labelled with a raw compound ID.
const UNNAMED: &str = "#7f7f7f";
/// Zoom level from which every label is drawn.
const LABEL_ZOOM: f64 = 4.0;

/// Look up the canvas called `id` and its 2D context.
pub fn canvas_target(id: &str) -> Result<(HtmlCanvasElement, CanvasRenderingContext2d)> {
	let missing = || Error::MissingRenderTarget { id: id.to_string() };
	let canvas: HtmlCanvasElement = web_sys::window()
		.and_then(|w| w.document())
		.and_then(|d| d.get_element_by_id(id))
		.and_then(|e| e.dyn_into().ok())
		.ok_or_else(missing)?;
	let ctx: CanvasRenderingContext2d = canvas
		.get_context("2d")
		.ok()
		.flatten()
		.and_then(|c| c.dyn_into().ok())
		.ok_or_else(missing)?;
	Ok((canvas, ctx))
}

struct NodeSprite {
	label: String,
	color: &'static str,
	x: f64,
	y: f64,
}

/// [`Scene`] drawn onto a canvas 2D context. Each tick repaints the frame.
pub struct CanvasScene {
	ctx: CanvasRenderingContext2d,
	width: f64,
	height: f64,
	transform: ZoomTransform,
	nodes: Vec<NodeSprite>,
	edges: Vec<(usize, usize)>,
	hovered: Option<NodeIdx>,
	highlighted: HashSet<NodeIdx>,
}

impl CanvasScene {
	/// Scene drawing into `ctx`, sized `width` by `height` pixels.
	pub fn new(ctx: CanvasRenderingContext2d, width: f64, height: f64) -> Self {
		Self {
			ctx,
			width,
			height,
			transform: ZoomTransform::IDENTITY,
			nodes: Vec::new(),
			edges: Vec::new(),
			hovered: None,
			highlighted: HashSet::new(),
		}
	}

	/// Track a new canvas size.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	fn sync_hover(&mut self, state: &ForceGraphState) {
		self.hovered = state.hover.node;
		self.highlighted.clear();
		self.highlighted.extend(state.hover.node);
		self.highlighted.extend(state.hover.neighbors.iter().copied());
	}

	fn draw(&self) {
		let ctx = &self.ctx;
		ctx.set_fill_style_str(BACKGROUND);
		ctx.fill_rect(0.0, 0.0, self.width, self.height);
		ctx.save();
		let _ = ctx.translate(self.transform.x, self.transform.y);
		let _ = ctx.scale(self.transform.k, self.transform.k);
		self.draw_edges();
		self.draw_nodes();
		ctx.restore();
	}

	fn draw_edges(&self) {
		let (ctx, k) = (&self.ctx, self.transform.k);
		let dim = self.hovered.is_some();
		ctx.set_line_width(1.0 / k);
		for &(s, t) in &self.edges {
			let (a, b) = (&self.nodes[s], &self.nodes[t]);
			let lit = self.highlighted.contains(&NodeIdx(s)) && self.highlighted.contains(&NodeIdx(t));
			let alpha = match (dim, lit) {
				(false, _) => 0.6,
				(true, true) => 0.9,
				(true, false) => 0.15,
			};
			ctx.set_stroke_style_str(&format!("rgba(153, 153, 153, {})", alpha));
			ctx.begin_path();
			ctx.move_to(a.x, a.y);
			ctx.line_to(b.x, b.y);
			ctx.stroke();
		}
	}

	fn draw_nodes(&self) {
		let (ctx, k) = (&self.ctx, self.transform.k);
		let dim = self.hovered.is_some();
		ctx.set_stroke_style_str("#fff");
		ctx.set_line_width(1.5 / k);
		ctx.set_font(&format!("{}px sans-serif", 10.0 / k.max(0.5)));

		for (i, node) in self.nodes.iter().enumerate() {
			let lit = self.highlighted.contains(&NodeIdx(i));
			let radius = if self.hovered == Some(NodeIdx(i)) {
				NODE_RADIUS * 1.35
			} else {
				NODE_RADIUS
			};

			ctx.set_global_alpha(if dim && !lit { 0.3 } else { 1.0 });
			ctx.begin_path();
			let _ = ctx.arc(node.x, node.y, radius, 0.0, 2.0 * PI);
			ctx.set_fill_style_str(node.color);
			ctx.fill();
			ctx.stroke();

			if lit || k >= LABEL_ZOOM {
				ctx.set_fill_style_str("white");
				let _ = ctx.fill_text(&node.label, node.x + radius + 3.0, node.y + 3.0);
			}
		}
		ctx.set_global_alpha(1.0);
	}
}

impl Scene for CanvasScene {
	fn add_node(&mut self, index: NodeIdx, node: &GraphNode) {
		let color = if compound_id(&node.label).is_some() {
			UNNAMED
		} else {
			NAMED
		};
		debug_assert_eq!(index.0, self.nodes.len());
		self.nodes.push(NodeSprite {
			label: node.label.clone(),
			color,
			x: node.x,
			y: node.y,
		});
	}

	fn add_edge(&mut self, source: NodeIdx, target: NodeIdx) {
		self.edges.push((source.0, target.0));
	}

	fn set_transform(&mut self, transform: ZoomTransform) {
		self.transform = transform;
	}

	fn tick(&mut self, nodes: &[GraphNode]) {
		for (sprite, node) in self.nodes.iter_mut().zip(nodes) {
			sprite.x = node.x;
			sprite.y = node.y;
		}
		self.draw();
	}
}

/// Repaint `scene` from the current session state.
pub fn render(state: &ForceGraphState, scene: &mut CanvasScene) {
	scene.sync_hover(state);
	state.present(scene);
}
