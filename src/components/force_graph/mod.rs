//! Force-directed layout of a [`GraphModel`] drawn on a canvas.

mod component;
mod config;
mod quadtree;
mod render;
mod scene;
mod simulation;
mod state;
mod types;
mod viewport;

pub use component::ForceGraphCanvas;
pub use config::{CenterForce, LayoutConfig, LinkForce, ManyBodyForce, ViewportConfig};
pub use render::{CanvasScene, canvas_target};
pub use scene::Scene;
pub use simulation::{LayoutState, Lcg, NodeIdx, Simulation};
pub use state::{ForceGraphState, HIT_RADIUS, NODE_RADIUS};
pub use types::{GraphEdge, GraphModel, GraphNode};
pub use viewport::{Viewport, ZoomTransform};
