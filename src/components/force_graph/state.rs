//! Pointer and layout state for one canvas session.

use std::cell::Cell;
use std::collections::HashSet;
use std::rc::Rc;

use super::config::{LayoutConfig, ViewportConfig};
use super::scene::Scene;
use super::simulation::{LayoutState, NodeIdx, Simulation};
use super::types::GraphModel;
use super::viewport::Viewport;
use crate::error::Result;

/// Drawn node radius in graph units.
pub const NODE_RADIUS: f64 = 5.0;
/// Pointer pick radius in graph units.
pub const HIT_RADIUS: f64 = 12.0;

/// A node drag in progress.
#[derive(Clone, Debug, Default)]
pub struct DragState {
	/// Held node.
	pub node: Option<NodeIdx>,
	/// Pointer x at grab time.
	pub start_x: f64,
	/// Pointer y at grab time.
	pub start_y: f64,
	/// Node x at grab time.
	pub node_start_x: f64,
	/// Node y at grab time.
	pub node_start_y: f64,
}

/// A background pan in progress.
#[derive(Clone, Debug, Default)]
pub struct PanState {
	/// Whether the pointer is panning.
	pub active: bool,
	/// Pointer x at press time.
	pub start_x: f64,
	/// Pointer y at press time.
	pub start_y: f64,
	/// Horizontal shift applied so far.
	pub moved_x: f64,
	/// Vertical shift applied so far.
	pub moved_y: f64,
}

/// The node under the pointer and its neighbours.
#[derive(Clone, Debug, Default)]
pub struct HoverState {
	/// Hovered node.
	pub node: Option<NodeIdx>,
	/// Nodes sharing an edge with it.
	pub neighbors: HashSet<NodeIdx>,
}

/// One visualization session: the running layout plus pointer state. All
/// screen coordinates are canvas pixels.
pub struct ForceGraphState {
	/// The layout.
	pub simulation: Simulation,
	/// Pan and zoom.
	pub viewport: Viewport,
	/// Active node drag.
	pub drag: DragState,
	/// Active pan.
	pub pan: PanState,
	/// Hover highlight.
	pub hover: HoverState,
	/// Canvas width in pixels.
	pub width: f64,
	/// Canvas height in pixels.
	pub height: f64,
	/// Set by layout ticks and pointer input, cleared by [`Self::take_redraw`].
	redraw: Rc<Cell<bool>>,
}

impl ForceGraphState {
	/// Start a session for `model` on a `width` by `height` canvas. The layout
	/// starts running.
	pub fn new(
		model: GraphModel,
		width: f64,
		height: f64,
		layout: LayoutConfig,
		view: ViewportConfig,
	) -> Result<Self> {
		let mut simulation = Simulation::new(model, layout)?;
		let redraw = Rc::new(Cell::new(true));
		let ticked = redraw.clone();
		simulation.on_tick(move |_| ticked.set(true));
		simulation.start();
		Ok(Self {
			simulation,
			viewport: Viewport::new(width, height, view),
			drag: DragState::default(),
			pan: PanState::default(),
			hover: HoverState::default(),
			width,
			height,
			redraw,
		})
	}

	/// Node under the screen point, if any.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<NodeIdx> {
		let (gx, gy) = self.viewport.screen_to_graph(sx, sy);
		// HIT_RADIUS is in graph units, so it scales with zoom like the nodes
		self.simulation.find(gx, gy, HIT_RADIUS)
	}

	/// Grab the node under the pointer, or start panning.
	pub fn pointer_down(&mut self, sx: f64, sy: f64) {
		self.redraw.set(true);
		if let Some(idx) = self.node_at_position(sx, sy) {
			let node = self.simulation.node(idx);
			self.drag = DragState {
				node: Some(idx),
				start_x: sx,
				start_y: sy,
				node_start_x: node.x,
				node_start_y: node.y,
			};
			self.simulation.drag_start(idx);
		} else {
			self.pan = PanState {
				active: true,
				start_x: sx,
				start_y: sy,
				moved_x: 0.0,
				moved_y: 0.0,
			};
		}
	}

	/// Drag, pan, or update the hover, depending on what the pointer is doing.
	pub fn pointer_move(&mut self, sx: f64, sy: f64) {
		self.redraw.set(true);
		if let Some(idx) = self.drag.node {
			let k = self.viewport.transform().k;
			let (dx, dy) = ((sx - self.drag.start_x) / k, (sy - self.drag.start_y) / k);
			self.simulation
				.drag_move(idx, self.drag.node_start_x + dx, self.drag.node_start_y + dy);
		} else if self.pan.active {
			let (dx, dy) = (
				sx - self.pan.start_x - self.pan.moved_x,
				sy - self.pan.start_y - self.pan.moved_y,
			);
			self.viewport.pan_by(dx, dy);
			self.pan.moved_x += dx;
			self.pan.moved_y += dy;
		} else {
			let hovered = self.node_at_position(sx, sy);
			self.set_hover(hovered);
		}
	}

	/// Release any held node and end a pan.
	pub fn pointer_up(&mut self) {
		self.redraw.set(true);
		if let Some(idx) = self.drag.node.take() {
			self.simulation.drag_end(idx);
		}
		self.pan.active = false;
	}

	/// Pointer left the canvas.
	pub fn pointer_leave(&mut self) {
		self.pointer_up();
		self.set_hover(None);
	}

	/// Zoom one wheel notch about the pointer.
	pub fn wheel(&mut self, sx: f64, sy: f64, delta_y: f64) {
		self.redraw.set(true);
		self.viewport.wheel(sx, sy, delta_y);
	}

	/// Hover `node` and collect its neighbours.
	pub fn set_hover(&mut self, node: Option<NodeIdx>) {
		if self.hover.node == node {
			return;
		}
		self.hover.node = node;
		self.redraw.set(true);
		self.hover.neighbors.clear();
		if let Some(idx) = node {
			for (src, tgt) in self.simulation.links() {
				if src == idx {
					self.hover.neighbors.insert(tgt);
				} else if tgt == idx {
					self.hover.neighbors.insert(src);
				}
			}
		}
	}

	/// Whether `idx` is hovered or next to the hovered node.
	pub fn is_highlighted(&self, idx: NodeIdx) -> bool {
		self.hover.node == Some(idx) || self.hover.neighbors.contains(&idx)
	}

	/// Whether anything is hovered.
	pub fn has_active_highlight(&self) -> bool {
		self.hover.node.is_some()
	}

	/// One scheduler step of the layout.
	pub fn step(&mut self) -> LayoutState {
		self.simulation.step()
	}

	/// Whether anything changed since the last call. Layout ticks report
	/// through [`Simulation::on_tick`].
	pub fn take_redraw(&self) -> bool {
		self.redraw.replace(false)
	}

	/// Hand every node and edge to a fresh scene.
	pub fn mount<S: Scene>(&self, scene: &mut S) {
		for (i, node) in self.simulation.nodes().iter().enumerate() {
			scene.add_node(NodeIdx(i), node);
		}
		for (src, tgt) in self.simulation.links() {
			scene.add_edge(src, tgt);
		}
		self.present(scene);
	}

	/// Push the current transform and positions to `scene`.
	pub fn present<S: Scene>(&self, scene: &mut S) {
		scene.set_transform(self.viewport.transform());
		scene.tick(self.simulation.nodes());
	}

	/// Follow a canvas size change.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.redraw.set(true);
		self.width = width;
		self.height = height;
		self.viewport.resize(width, height);
	}
}

#[cfg(test)]
mod tests {
	use super::super::types::{GraphEdge, GraphNode};
	use super::super::viewport::ZoomTransform;
	use super::*;

	fn state() -> ForceGraphState {
		let model = GraphModel {
			nodes: vec![
				GraphNode::new("H2O", "H2O").at(0.0, 0.0),
				GraphNode::new("CO2", "CO2").at(40.0, 0.0),
				GraphNode::new("O2", "O2").at(0.0, 40.0),
			],
			edges: vec![
				GraphEdge { source: "H2O".into(), target: "CO2".into() },
				GraphEdge { source: "H2O".into(), target: "O2".into() },
			],
		};
		ForceGraphState::new(model, 800.0, 600.0, LayoutConfig::default(), ViewportConfig::default())
			.unwrap()
	}

	#[derive(Default)]
	struct Recorder {
		nodes: Vec<(NodeIdx, String)>,
		edges: Vec<(NodeIdx, NodeIdx)>,
		transforms: Vec<ZoomTransform>,
		ticks: usize,
	}

	impl Scene for Recorder {
		fn add_node(&mut self, index: NodeIdx, node: &GraphNode) {
			self.nodes.push((index, node.label.clone()));
		}
		fn add_edge(&mut self, source: NodeIdx, target: NodeIdx) {
			self.edges.push((source, target));
		}
		fn set_transform(&mut self, transform: ZoomTransform) {
			self.transforms.push(transform);
		}
		fn tick(&mut self, nodes: &[GraphNode]) {
			assert_eq!(nodes.len(), self.nodes.len());
			self.ticks += 1;
		}
	}

	#[test]
	fn starts_running() {
		assert_eq!(state().simulation.state(), LayoutState::Running);
	}

	#[test]
	fn dragging_follows_the_pointer_in_graph_units() {
		let mut s = state();
		s.viewport.zoom_at(400.0, 300.0, 2.0);
		// H2O sits at the origin, drawn at the canvas centre.
		s.pointer_down(401.0, 300.0);
		assert_eq!(s.simulation.state(), LayoutState::Dragging);

		s.pointer_move(421.0, 310.0);
		s.step();
		let h2o = s.simulation.node(NodeIdx(0));
		assert_eq!((h2o.x, h2o.y), (10.0, 5.0));

		s.pointer_up();
		assert_eq!(s.simulation.state(), LayoutState::Running);
		assert_eq!(s.simulation.node(NodeIdx(0)).fx, None);
	}

	#[test]
	fn background_drag_pans_without_moving_nodes() {
		let mut s = state();
		s.viewport.zoom_at(400.0, 300.0, 4.0);
		let before: Vec<(f64, f64)> = s.simulation.nodes().iter().map(|n| (n.x, n.y)).collect();

		s.pointer_down(10.0, 10.0);
		s.pointer_move(30.0, 15.0);
		s.pointer_move(50.0, 20.0);
		assert_eq!(s.viewport.transform().x, 440.0);
		assert_eq!(s.viewport.transform().y, 310.0);
		s.pointer_up();
		assert!(!s.pan.active);

		let after: Vec<(f64, f64)> = s.simulation.nodes().iter().map(|n| (n.x, n.y)).collect();
		assert_eq!(before, after);
	}

	#[test]
	fn hover_collects_neighbours() {
		let mut s = state();
		s.pointer_move(400.0, 300.0);
		assert_eq!(s.hover.node, Some(NodeIdx(0)));
		assert!(s.is_highlighted(NodeIdx(1)) && s.is_highlighted(NodeIdx(2)));

		s.pointer_move(440.0, 300.0);
		assert_eq!(s.hover.node, Some(NodeIdx(1)));
		assert!(s.is_highlighted(NodeIdx(0)));
		assert!(!s.is_highlighted(NodeIdx(2)));

		s.pointer_leave();
		assert!(!s.has_active_highlight());
	}

	#[test]
	fn redraw_follows_ticks_and_input() {
		let mut s = state();
		assert!(s.take_redraw());
		assert!(!s.take_redraw());

		s.step();
		assert!(s.take_redraw());

		while s.step() != LayoutState::Stopped {}
		s.take_redraw();
		s.step();
		assert!(!s.take_redraw());

		s.wheel(400.0, 300.0, -1.0);
		assert!(s.take_redraw());
		s.resize(1000.0, 700.0);
		assert!(s.take_redraw());
	}

	#[test]
	fn mount_then_present() {
		let mut s = state();
		let mut scene = Recorder::default();
		s.mount(&mut scene);
		assert_eq!(scene.nodes.len(), 3);
		assert_eq!(scene.nodes[1], (NodeIdx(1), "CO2".to_string()));
		assert_eq!(scene.edges, vec![(NodeIdx(0), NodeIdx(1)), (NodeIdx(0), NodeIdx(2))]);

		s.step();
		s.wheel(400.0, 300.0, -1.0);
		s.present(&mut scene);
		assert_eq!(scene.ticks, 2);
		assert_eq!(scene.transforms.last().map(|t| t.k), Some(1.1));
	}
}
