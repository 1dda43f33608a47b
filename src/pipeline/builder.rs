//! Graph construction from resolved pairs.

use std::collections::HashMap;

use serde::Deserialize;

use super::names::{Endpoint, ResolvedPair};
use crate::components::force_graph::{GraphEdge, GraphModel, GraphNode};
use crate::error::Result;

/// Which endpoint field becomes a node's identity.
///
/// `ResolvedName` is the default and collapses distinct compound IDs that
/// share a display name into one node. That merge is intended, but it can
/// join unrelated compounds; `CompoundId` keeps one node per ID and uses the
/// name only as the label.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityPolicy {
	/// One node per display name.
	#[default]
	ResolvedName,
	/// One node per compound ID.
	CompoundId,
}

impl IdentityPolicy {
	/// Identity key of `endpoint` under this policy.
	pub fn key<'a>(&self, endpoint: &'a Endpoint) -> &'a str {
		match self {
			Self::ResolvedName => &endpoint.name,
			Self::CompoundId => &endpoint.id,
		}
	}
}

/// Accumulates nodes and edges from resolved pairs.
pub struct GraphBuilder {
	policy: IdentityPolicy,
	model: GraphModel,
	index: HashMap<String, usize>,
}

impl GraphBuilder {
	/// Start from an empty model.
	pub fn new(policy: IdentityPolicy) -> Self {
		Self::with_model(policy, GraphModel::default())
	}

	/// Extend an existing model; its nodes keep their layout state.
	pub fn with_model(policy: IdentityPolicy, model: GraphModel) -> Self {
		let index = model
			.nodes
			.iter()
			.enumerate()
			.map(|(i, n)| (n.name.clone(), i))
			.collect();
		Self {
			policy,
			model,
			index,
		}
	}

	fn register(&mut self, endpoint: &Endpoint) -> String {
		let key = self.policy.key(endpoint);
		if !self.index.contains_key(key) {
			self.index.insert(key.to_string(), self.model.nodes.len());
			self.model
				.nodes
				.push(GraphNode::new(key, endpoint.name.as_str()));
		}
		key.to_string()
	}

	/// Registers both endpoints (first seen wins) and appends one edge.
	pub fn add_pair(&mut self, pair: &ResolvedPair) {
		let source = self.register(&pair.lhs);
		let target = self.register(&pair.rhs);
		self.model.edges.push(GraphEdge { source, target });
	}

	/// Nodes registered so far.
	pub fn node_count(&self) -> usize {
		self.model.nodes.len()
	}

	/// Validate and return the model.
	pub fn finish(self) -> Result<GraphModel> {
		self.model.validate()?;
		Ok(self.model)
	}
}

/// One node per distinct identity key and one edge per pair, in pair order.
/// Repeated and self-referencing edges are kept.
pub fn build(pairs: &[ResolvedPair], policy: IdentityPolicy) -> Result<GraphModel> {
	let mut builder = GraphBuilder::new(policy);
	for pair in pairs {
		builder.add_pair(pair);
	}
	builder.finish()
}
