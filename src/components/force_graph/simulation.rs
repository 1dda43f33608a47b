//! Force-directed layout with an annealed `alpha`.
//!
//! Each tick moves `alpha` toward `alpha_target`, applies the link, many-body
//! and centering forces to node velocities (all scaled by `alpha`), then
//! decays velocities and advances positions. Nodes with `fx`/`fy` set stay
//! pinned. An external scheduler drives [`Simulation::step`] once per frame;
//! the simulation stops itself when `alpha` drops below `alpha_min`.

use std::f64::consts::PI;

use log::debug;

use super::config::LayoutConfig;
use super::quadtree::{Charge, QuadTree, pull};
use super::types::{GraphEdge, GraphModel, GraphNode};
use crate::error::{Error, Result};

const INITIAL_RADIUS: f64 = 10.0;

/// Position of a node in the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIdx(pub usize);

/// Scheduler-visible lifecycle of a [`Simulation`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutState {
	/// Loaded, never started.
	Idle,
	/// Ticking on every scheduled step.
	Running,
	/// Running with one node pinned by the pointer.
	Dragging,
	/// Settled or halted. Can be restarted.
	Stopped,
}

/// Deterministic linear congruential generator for jiggling coincident nodes.
#[derive(Clone, Debug)]
pub struct Lcg(u32);

impl Lcg {
	/// Generator starting from `seed`.
	pub fn new(seed: u32) -> Self {
		Self(seed)
	}

	/// Uniform in `[0, 1)`.
	pub fn next_f64(&mut self) -> f64 {
		self.0 = self.0.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
		self.0 as f64 / 4_294_967_296.0
	}

	/// A tiny offset around zero.
	pub fn jiggle(&mut self) -> f64 {
		(self.next_f64() - 0.5) * 1e-6
	}
}

#[derive(Clone, Debug)]
struct Link {
	source: usize,
	target: usize,
	strength: f64,
	bias: f64,
}

type TickListener = Box<dyn FnMut(&[GraphNode])>;

/// A running layout over one [`GraphModel`].
pub struct Simulation {
	nodes: Vec<GraphNode>,
	links: Vec<Link>,
	config: LayoutConfig,
	alpha: f64,
	alpha_target: f64,
	state: LayoutState,
	dragging: Option<usize>,
	random: Lcg,
	ticks: u64,
	listeners: Vec<TickListener>,
}

impl Simulation {
	/// Takes ownership of `model`, links edges to node indices and places any
	/// node without a position on a phyllotaxis spiral around the origin.
	pub fn new(model: GraphModel, config: LayoutConfig) -> Result<Self> {
		let (edges, node_count) = {
			let index = model.index();
			let mut edges = Vec::with_capacity(model.edges.len());
			for edge in &model.edges {
				let lookup = |name: &String| {
					index.get(name.as_str()).copied().ok_or_else(|| Error::MissingNode {
						name: name.clone(),
					})
				};
				edges.push((lookup(&edge.source)?, lookup(&edge.target)?));
			}
			(edges, model.nodes.len())
		};

		let mut degree = vec![0usize; node_count];
		for &(s, t) in &edges {
			degree[s] += 1;
			degree[t] += 1;
		}
		let links = edges
			.into_iter()
			.map(|(source, target)| {
				let (ds, dt) = (degree[source] as f64, degree[target] as f64);
				Link {
					source,
					target,
					strength: config.link.strength.unwrap_or(1.0 / ds.min(dt)),
					bias: ds / (ds + dt),
				}
			})
			.collect();

		let mut nodes = model.nodes;
		let initial_angle = PI * (3.0 - 5f64.sqrt());
		for (i, node) in nodes.iter_mut().enumerate() {
			if let Some(fx) = node.fx {
				node.x = fx;
			}
			if let Some(fy) = node.fy {
				node.y = fy;
			}
			if !node.is_placed() {
				let radius = INITIAL_RADIUS * (0.5 + i as f64).sqrt();
				let angle = i as f64 * initial_angle;
				node.x = radius * angle.cos();
				node.y = radius * angle.sin();
			}
			if !node.vx.is_finite() || !node.vy.is_finite() {
				node.vx = 0.0;
				node.vy = 0.0;
			}
		}

		Ok(Self {
			nodes,
			links,
			alpha: config.alpha,
			alpha_target: config.alpha_target,
			state: LayoutState::Idle,
			dragging: None,
			random: Lcg::new(config.seed),
			ticks: 0,
			listeners: Vec::new(),
			config,
		})
	}

	/// Current lifecycle state.
	pub fn state(&self) -> LayoutState {
		self.state
	}

	/// Current temperature.
	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	/// Temperature alpha is moving toward.
	pub fn alpha_target(&self) -> f64 {
		self.alpha_target
	}

	/// Set the temperature to move toward.
	pub fn set_alpha_target(&mut self, target: f64) {
		self.alpha_target = target;
	}

	/// Ticks run so far.
	pub fn ticks(&self) -> u64 {
		self.ticks
	}

	/// Configuration in use.
	pub fn config(&self) -> &LayoutConfig {
		&self.config
	}

	/// Nodes in model order, with current positions.
	pub fn nodes(&self) -> &[GraphNode] {
		&self.nodes
	}

	/// Node at `idx`. Panics if out of range.
	pub fn node(&self, idx: NodeIdx) -> &GraphNode {
		&self.nodes[idx.0]
	}

	/// Index of the node named `name`.
	pub fn index_of(&self, name: &str) -> Option<NodeIdx> {
		self.nodes.iter().position(|n| n.name == name).map(NodeIdx)
	}

	/// Edge endpoints, in model order.
	pub fn links(&self) -> impl Iterator<Item = (NodeIdx, NodeIdx)> + '_ {
		self.links
			.iter()
			.map(|l| (NodeIdx(l.source), NodeIdx(l.target)))
	}

	/// Closest node within `radius` of (`x`, `y`).
	pub fn find(&self, x: f64, y: f64, radius: f64) -> Option<NodeIdx> {
		let mut best = radius * radius;
		let mut found = None;
		for (i, node) in self.nodes.iter().enumerate() {
			let (dx, dy) = (node.x - x, node.y - y);
			let d2 = dx * dx + dy * dy;
			if d2 < best {
				best = d2;
				found = Some(NodeIdx(i));
			}
		}
		found
	}

	/// Called after every scheduled step with the updated nodes.
	pub fn on_tick(&mut self, listener: impl FnMut(&[GraphNode]) + 'static) {
		self.listeners.push(Box::new(listener));
	}

	/// Leave `Idle` and begin ticking. No-op once started.
	pub fn start(&mut self) {
		if self.state == LayoutState::Idle {
			debug!("layout started with {} nodes, {} links", self.nodes.len(), self.links.len());
			self.restart();
		}
	}

	/// Resume scheduled ticking without touching alpha.
	pub fn restart(&mut self) {
		self.state = if self.dragging.is_some() {
			LayoutState::Dragging
		} else {
			LayoutState::Running
		};
	}

	/// Halt scheduled ticking. [`Simulation::tick`] still works.
	pub fn stop(&mut self) {
		self.state = LayoutState::Stopped;
	}

	/// Set `alpha` and resume ticking.
	pub fn reheat(&mut self, alpha: f64) {
		self.alpha = alpha;
		self.restart();
	}

	/// Scheduler entry point: one tick if running, then stop once settled.
	pub fn step(&mut self) -> LayoutState {
		if matches!(self.state, LayoutState::Idle | LayoutState::Stopped) {
			return self.state;
		}
		self.tick();

		let mut listeners = std::mem::take(&mut self.listeners);
		for listener in &mut listeners {
			listener(&self.nodes);
		}
		listeners.append(&mut self.listeners);
		self.listeners = listeners;

		if self.alpha < self.config.alpha_min && self.dragging.is_none() {
			debug!("layout settled after {} ticks", self.ticks);
			self.state = LayoutState::Stopped;
		}
		self.state
	}

	/// Advance one tick regardless of state.
	pub fn tick(&mut self) {
		self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;
		let alpha = self.alpha;

		self.apply_links(alpha);
		self.apply_charge(alpha);
		self.apply_center(alpha);

		let keep = 1.0 - self.config.velocity_decay;
		for node in &mut self.nodes {
			match node.fx {
				Some(fx) => {
					node.x = fx;
					node.vx = 0.0;
				}
				None => {
					node.vx *= keep;
					node.x += node.vx;
				}
			}
			match node.fy {
				Some(fy) => {
					node.y = fy;
					node.vy = 0.0;
				}
				None => {
					node.vy *= keep;
					node.y += node.vy;
				}
			}
		}
		self.ticks += 1;
	}

	fn apply_links(&mut self, alpha: f64) {
		let distance = self.config.link.distance;
		let Self {
			nodes,
			links,
			random,
			..
		} = self;
		for link in links.iter() {
			// A self-loop would push and pull the same node equally.
			if link.source == link.target {
				continue;
			}
			let (s, t) = (&nodes[link.source], &nodes[link.target]);
			let mut x = t.x + t.vx - s.x - s.vx;
			let mut y = t.y + t.vy - s.y - s.vy;
			if x == 0.0 {
				x = random.jiggle();
			}
			if y == 0.0 {
				y = random.jiggle();
			}
			let l = (x * x + y * y).sqrt();
			let l = (l - distance) / l * alpha * link.strength;
			x *= l;
			y *= l;

			let t = &mut nodes[link.target];
			t.vx -= x * link.bias;
			t.vy -= y * link.bias;
			let s = &mut nodes[link.source];
			s.vx += x * (1.0 - link.bias);
			s.vy += y * (1.0 - link.bias);
		}
	}

	fn apply_charge(&mut self, alpha: f64) {
		if self.nodes.len() < 2 {
			return;
		}
		let cfg = &self.config.charge;
		let charge = Charge {
			strength: cfg.strength,
			alpha,
			theta2: cfg.theta.map_or(0.0, |t| t * t),
			distance_min2: cfg.distance_min * cfg.distance_min,
			distance_max2: cfg.distance_max.map_or(f64::INFINITY, |d| d * d),
		};
		let positions: Vec<(f64, f64)> = self.nodes.iter().map(|n| (n.x, n.y)).collect();

		if cfg.theta.is_some() {
			let tree = QuadTree::build(&positions, charge.strength);
			for i in 0..positions.len() {
				let (dvx, dvy) = tree.force_on(i, &charge, &mut self.random);
				self.nodes[i].vx += dvx;
				self.nodes[i].vy += dvy;
			}
			return;
		}

		for (i, &(xi, yi)) in positions.iter().enumerate() {
			for (j, &(xj, yj)) in positions.iter().enumerate() {
				if i == j {
					continue;
				}
				let (x, y) = (xj - xi, yj - yi);
				let l = x * x + y * y;
				if l >= charge.distance_max2 {
					continue;
				}
				let (dvx, dvy) = pull(x, y, l, charge.strength, &charge, &mut self.random);
				self.nodes[i].vx += dvx;
				self.nodes[i].vy += dvy;
			}
		}
	}

	fn apply_center(&mut self, alpha: f64) {
		let c = &self.config.center;
		let k = c.strength * alpha;
		for node in &mut self.nodes {
			node.vx += (c.x - node.x) * k;
			node.vy += (c.y - node.y) * k;
		}
	}

	/// Pin `idx` where it is and reheat so the layout responds to the drag.
	pub fn drag_start(&mut self, idx: NodeIdx) {
		let node = &mut self.nodes[idx.0];
		node.fx = Some(node.x);
		node.fy = Some(node.y);
		self.dragging = Some(idx.0);
		self.alpha_target = self.config.drag_alpha_target;
		self.restart();
	}

	/// Move the pinned node to (`x`, `y`).
	pub fn drag_move(&mut self, idx: NodeIdx, x: f64, y: f64) {
		let node = &mut self.nodes[idx.0];
		node.fx = Some(x);
		node.fy = Some(y);
	}

	/// Release `idx` back to the forces and let the layout cool again.
	pub fn drag_end(&mut self, idx: NodeIdx) {
		let node = &mut self.nodes[idx.0];
		node.fx = None;
		node.fy = None;
		if self.dragging == Some(idx.0) {
			self.dragging = None;
		}
		self.alpha_target = 0.0;
		if self.state == LayoutState::Dragging {
			self.state = LayoutState::Running;
		}
	}

	/// Node currently held by the pointer.
	pub fn dragged(&self) -> Option<NodeIdx> {
		self.dragging.map(NodeIdx)
	}

	/// Current nodes and edges, positions included.
	pub fn to_model(&self) -> GraphModel {
		let edges = self
			.links
			.iter()
			.map(|l| GraphEdge {
				source: self.nodes[l.source].name.clone(),
				target: self.nodes[l.target].name.clone(),
			})
			.collect();
		GraphModel {
			nodes: self.nodes.clone(),
			edges,
		}
	}
}

#[cfg(test)]
mod tests {
	use std::cell::Cell;
	use std::rc::Rc;

	use super::*;

	fn edge(s: &str, t: &str) -> GraphEdge {
		GraphEdge {
			source: s.into(),
			target: t.into(),
		}
	}

	fn triangle() -> GraphModel {
		GraphModel {
			nodes: vec![
				GraphNode::new("H2O", "H2O").at(0.0, 0.0),
				GraphNode::new("CO2", "CO2").at(50.0, 0.0),
				GraphNode::new("O2", "O2").at(0.0, 50.0),
			],
			edges: vec![edge("H2O", "CO2"), edge("H2O", "O2"), edge("CO2", "O2")],
		}
	}

	fn exact() -> LayoutConfig {
		let mut cfg = LayoutConfig::default();
		cfg.charge.theta = None;
		cfg
	}

	fn max_speed(sim: &Simulation) -> f64 {
		sim.nodes()
			.iter()
			.map(|n| n.vx.hypot(n.vy))
			.fold(0.0, f64::max)
	}

	fn run_until_stopped(sim: &mut Simulation, limit: usize) {
		for _ in 0..limit {
			if sim.step() == LayoutState::Stopped {
				break;
			}
		}
	}

	#[test]
	fn settles_as_alpha_decays() {
		let mut sim = Simulation::new(triangle(), exact()).unwrap();
		assert_eq!(sim.state(), LayoutState::Idle);
		assert_eq!(sim.step(), LayoutState::Idle);
		assert_eq!(sim.ticks(), 0);

		sim.start();
		run_until_stopped(&mut sim, 1000);
		assert_eq!(sim.state(), LayoutState::Stopped);
		assert!(sim.ticks() <= 301, "took {} ticks", sim.ticks());
		assert!(sim.alpha() < sim.config().alpha_min);
		assert!(max_speed(&sim) < 0.05, "max speed {}", max_speed(&sim));

		let ticks = sim.ticks();
		assert_eq!(sim.step(), LayoutState::Stopped);
		assert_eq!(sim.ticks(), ticks);
	}

	#[test]
	fn same_seed_same_layout() {
		let run = || {
			let mut sim = Simulation::new(triangle(), LayoutConfig::default()).unwrap();
			sim.start();
			run_until_stopped(&mut sim, 1000);
			sim.to_model()
		};
		assert_eq!(run(), run());
	}

	#[test]
	fn drag_pins_and_release_frees() {
		let mut sim = Simulation::new(triangle(), exact()).unwrap();
		sim.start();
		for _ in 0..20 {
			sim.step();
		}

		let h2o = sim.index_of("H2O").unwrap();
		sim.drag_start(h2o);
		assert_eq!(sim.state(), LayoutState::Dragging);
		assert_eq!(sim.alpha_target(), 0.4);

		sim.drag_move(h2o, 100.0, -40.0);
		for _ in 0..3 {
			sim.step();
			let node = sim.node(h2o);
			assert_eq!((node.x, node.y), (100.0, -40.0));
			assert_eq!((node.vx, node.vy), (0.0, 0.0));
		}

		sim.drag_end(h2o);
		assert_eq!(sim.state(), LayoutState::Running);
		assert_eq!(sim.alpha_target(), 0.0);
		assert_eq!(sim.node(h2o).fx, None);
		sim.step();
		let node = sim.node(h2o);
		assert_ne!((node.x, node.y), (100.0, -40.0));
	}

	#[test]
	fn drag_reheats_a_stopped_layout() {
		let mut sim = Simulation::new(triangle(), exact()).unwrap();
		sim.start();
		run_until_stopped(&mut sim, 1000);
		let cold = sim.alpha();

		let o2 = sim.index_of("O2").unwrap();
		sim.drag_start(o2);
		assert_eq!(sim.state(), LayoutState::Dragging);
		for _ in 0..50 {
			assert_eq!(sim.step(), LayoutState::Dragging);
		}
		assert!(sim.alpha() > cold * 10.0);
		assert_eq!(sim.dragged(), Some(o2));
	}

	#[test]
	fn stop_halts_scheduled_ticks_until_restart() {
		let mut sim = Simulation::new(triangle(), exact()).unwrap();
		sim.start();
		sim.step();
		sim.stop();
		assert_eq!(sim.step(), LayoutState::Stopped);
		assert_eq!(sim.ticks(), 1);
		sim.reheat(0.5);
		assert_eq!(sim.step(), LayoutState::Running);
		assert_eq!(sim.ticks(), 2);
	}

	#[test]
	fn repulsion_is_symmetric() {
		let model = GraphModel {
			nodes: vec![
				GraphNode::new("a", "a").at(-10.0, -5.0),
				GraphNode::new("b", "b").at(10.0, 5.0),
			],
			edges: vec![],
		};
		let mut sim = Simulation::new(model, exact()).unwrap();
		sim.tick();
		let (a, b) = (&sim.nodes()[0], &sim.nodes()[1]);
		assert!(a.vx < 0.0 && b.vx > 0.0);
		assert_eq!(a.vx, -b.vx);
		assert_eq!(a.x, -b.x);
	}

	#[test]
	fn barnes_hut_with_tiny_theta_matches_exact() {
		let mut random = Lcg::new(7);
		let nodes: Vec<GraphNode> = (0..40)
			.map(|i| {
				let (x, y) = (random.next_f64() * 400.0 - 200.0, random.next_f64() * 400.0 - 200.0);
				GraphNode::new(i.to_string(), i.to_string()).at(x, y)
			})
			.collect();
		let model = GraphModel {
			nodes,
			edges: vec![],
		};

		let mut approx = exact();
		approx.charge.theta = Some(1e-6);
		let mut a = Simulation::new(model.clone(), exact()).unwrap();
		let mut b = Simulation::new(model.clone(), approx).unwrap();
		a.tick();
		b.tick();
		for (na, nb) in a.nodes().iter().zip(b.nodes()) {
			assert!((na.vx - nb.vx).abs() < 1e-9);
			assert!((na.vy - nb.vy).abs() < 1e-9);
		}

		let mut loose = Simulation::new(model, LayoutConfig::default()).unwrap();
		loose.tick();
		let err = a
			.nodes()
			.iter()
			.zip(loose.nodes())
			.map(|(na, nl)| (na.vx - nl.vx).hypot(na.vy - nl.vy))
			.fold(0.0, f64::max);
		assert!(err < 0.5 * max_speed(&a), "theta 0.9 error {err}");
	}

	#[test]
	fn unplaced_nodes_get_distinct_positions() {
		let model = GraphModel {
			nodes: (0..5)
				.map(|i| GraphNode::new(i.to_string(), i.to_string()))
				.collect(),
			edges: vec![],
		};
		let sim = Simulation::new(model, LayoutConfig::default()).unwrap();
		let nodes = sim.nodes();
		assert!(nodes.iter().all(GraphNode::is_placed));
		for i in 0..nodes.len() {
			for j in i + 1..nodes.len() {
				assert!((nodes[i].x, nodes[i].y) != (nodes[j].x, nodes[j].y));
			}
		}
	}

	#[test]
	fn coincident_nodes_are_separated() {
		let model = GraphModel {
			nodes: vec![
				GraphNode::new("a", "a").at(3.0, 3.0),
				GraphNode::new("b", "b").at(3.0, 3.0),
			],
			edges: vec![edge("a", "b")],
		};
		let mut sim = Simulation::new(model, LayoutConfig::default()).unwrap();
		sim.start();
		for _ in 0..30 {
			sim.step();
		}
		let (a, b) = (&sim.nodes()[0], &sim.nodes()[1]);
		assert!((a.x - b.x).hypot(a.y - b.y) > 1.0);
	}

	#[test]
	fn self_loop_exerts_no_force() {
		let model = GraphModel {
			nodes: vec![GraphNode::new("X", "X").at(0.0, 0.0)],
			edges: vec![edge("X", "X")],
		};
		let mut sim = Simulation::new(model, LayoutConfig::default()).unwrap();
		sim.tick();
		assert_eq!((sim.nodes()[0].x, sim.nodes()[0].y), (0.0, 0.0));
		assert_eq!(sim.links().collect::<Vec<_>>(), vec![(NodeIdx(0), NodeIdx(0))]);
	}

	#[test]
	fn dangling_edge_is_rejected() {
		let mut model = triangle();
		model.edges.push(edge("H2O", "N2"));
		assert!(matches!(
			Simulation::new(model, LayoutConfig::default()),
			Err(Error::MissingNode { name }) if name == "N2"
		));
	}

	#[test]
	fn tick_listeners_fire_on_scheduled_steps() {
		let seen = Rc::new(Cell::new(0));
		let mut sim = Simulation::new(triangle(), LayoutConfig::default()).unwrap();
		let counter = seen.clone();
		sim.on_tick(move |nodes| {
			assert_eq!(nodes.len(), 3);
			counter.set(counter.get() + 1);
		});
		sim.step();
		assert_eq!(seen.get(), 0);
		sim.start();
		sim.step();
		sim.step();
		assert_eq!(seen.get(), 2);
	}

	#[test]
	fn find_picks_the_nearest_node_in_range() {
		let sim = Simulation::new(triangle(), LayoutConfig::default()).unwrap();
		assert_eq!(sim.find(48.0, 1.0, 12.0), sim.index_of("CO2"));
		assert_eq!(sim.find(25.0, 25.0, 12.0), None);
	}
}
