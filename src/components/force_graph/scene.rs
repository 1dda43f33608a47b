use super::simulation::NodeIdx;
use super::types::GraphNode;
use super::viewport::ZoomTransform;

/// A drawing backend for one layout session.
///
/// Nodes and edges are added once when the session mounts; afterwards the
/// scene only hears about transform changes and per-tick positions.
pub trait Scene {
	/// Register the node at `index`. Called in index order.
	fn add_node(&mut self, index: NodeIdx, node: &GraphNode);
	/// Register an edge between two registered nodes.
	fn add_edge(&mut self, source: NodeIdx, target: NodeIdx);
	/// The scene-wide pan and zoom changed.
	fn set_transform(&mut self, transform: ZoomTransform);
	/// Node positions after a tick, indexed like [`Scene::add_node`].
	fn tick(&mut self, nodes: &[GraphNode]);
}
