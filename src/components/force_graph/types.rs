use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A compound node. `name` is the identity key edges refer to; `label` is
/// what gets drawn. Positions are NaN until the layout places the node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
	/// Identity key referenced by edges.
	pub name: String,
	/// Display text.
	pub label: String,
	/// Position, NaN while unplaced.
	#[serde(default = "unplaced", skip_serializing_if = "is_unplaced")]
	pub x: f64,
	/// Position, NaN while unplaced.
	#[serde(default = "unplaced", skip_serializing_if = "is_unplaced")]
	pub y: f64,
	/// Velocity.
	#[serde(default)]
	pub vx: f64,
	/// Velocity.
	#[serde(default)]
	pub vy: f64,
	/// Pinned x, if any.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub fx: Option<f64>,
	/// Pinned y, if any.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub fy: Option<f64>,
}

fn unplaced() -> f64 {
	f64::NAN
}

fn is_unplaced(v: &f64) -> bool {
	!v.is_finite()
}

impl GraphNode {
	/// An unplaced node.
	pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			label: label.into(),
			x: f64::NAN,
			y: f64::NAN,
			vx: 0.0,
			vy: 0.0,
			fx: None,
			fy: None,
		}
	}

	/// Place the node at (`x`, `y`).
	pub fn at(mut self, x: f64, y: f64) -> Self {
		self.x = x;
		self.y = y;
		self
	}

	/// Whether both coordinates are finite.
	pub fn is_placed(&self) -> bool {
		self.x.is_finite() && self.y.is_finite()
	}
}

/// An undirected link between two node names.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
	/// Name of one end.
	pub source: String,
	/// Name of the other end.
	pub target: String,
}

/// Nodes plus edges keyed by node name, as handed to the layout.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphModel {
	/// Nodes in insertion order.
	pub nodes: Vec<GraphNode>,
	/// Edges in insertion order, repeats kept.
	#[serde(rename = "links")]
	pub edges: Vec<GraphEdge>,
}

impl GraphModel {
	/// Node name → position in `nodes`.
	pub fn index(&self) -> HashMap<&str, usize> {
		self.nodes
			.iter()
			.enumerate()
			.map(|(i, n)| (n.name.as_str(), i))
			.collect()
	}

	/// Every edge endpoint must name a node.
	pub fn validate(&self) -> Result<()> {
		let index = self.index();
		for edge in &self.edges {
			for name in [&edge.source, &edge.target] {
				if !index.contains_key(name.as_str()) {
					return Err(Error::MissingNode { name: name.clone() });
				}
			}
		}
		Ok(())
	}

	/// Serialize as `{"nodes": [...], "links": [...]}`.
	pub fn to_json(&self) -> Result<String> {
		Ok(serde_json::to_string(self)?)
	}
}
