//! Reaction equations in, compound graph out.
//!
//! Stages run in a fixed order: [`equation`] parses each row, [`oppose`]
//! expands it into opposing compound pairs, [`names`] relabels pair endpoints
//! and [`builder`] collects them into a [`GraphModel`]. Everything a stage
//! needs is carried by [`PipelineContext`].

pub mod builder;
pub mod equation;
pub mod load;
pub mod names;
pub mod oppose;

use std::collections::HashSet;

use futures::io::AsyncBufRead;
use log::info;

use crate::components::force_graph::GraphModel;
use crate::error::Result;

pub use builder::{GraphBuilder, IdentityPolicy, build};
pub use equation::{Direction, ReactionEquation, ReactionRecord, parse};
pub use names::{CompoundRecord, CompoundTable, Endpoint, NameMatch, ResolvedPair, resolve};
pub use oppose::{OpposePair, expand};

/// Counts gathered while running the pipeline.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PipelineReport {
	/// Reactions that parsed.
	pub reactions: usize,
	/// Reactions skipped as malformed.
	pub skipped: usize,
	/// Opposition pairs kept.
	pub pairs: usize,
	/// Distinct compound IDs that had no name and kept their ID as label.
	pub unresolved: usize,
	/// Nodes in the model.
	pub nodes: usize,
	/// Edges in the model.
	pub edges: usize,
}

/// Everything one run produces.
#[derive(Clone, Debug)]
pub struct PipelineOutput {
	/// The compound graph.
	pub model: GraphModel,
	/// Pairs the graph was built from, before name resolution.
	pub pairs: Vec<OpposePair>,
	/// Counts for the run.
	pub report: PipelineReport,
}

/// Inputs shared by every stage of one run.
#[derive(Clone, Debug, Default)]
pub struct PipelineContext {
	/// Names used to label compounds.
	pub table: CompoundTable,
	/// How nodes are keyed.
	pub policy: IdentityPolicy,
	/// When set, only pairs with both compounds in this set are kept.
	pub focus: Option<HashSet<String>>,
}

impl PipelineContext {
	/// Default policy, no focus.
	pub fn new(table: CompoundTable) -> Self {
		Self {
			table,
			..Default::default()
		}
	}

	/// Replace the identity policy.
	pub fn with_policy(mut self, policy: IdentityPolicy) -> Self {
		self.policy = policy;
		self
	}

	/// Keep only pairs between these compound IDs.
	pub fn with_focus<I, S>(mut self, ids: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.focus = Some(ids.into_iter().map(Into::into).collect());
		self
	}

	/// Parse, expand, resolve and build, in that order.
	pub fn run(&self, reactions: &[ReactionRecord]) -> Result<PipelineOutput> {
		let expansion = oppose::expand_all(reactions);
		let pairs = match &self.focus {
			Some(focus) => oppose::restrict(expansion.pairs, focus),
			None => expansion.pairs,
		};

		let resolved: Vec<ResolvedPair> = pairs.iter().map(|p| self.table.resolve(p)).collect();
		let unresolved: HashSet<&str> = resolved
			.iter()
			.flat_map(|p| [&p.lhs, &p.rhs])
			.filter(|e| !e.resolved)
			.map(|e| e.id.as_str())
			.collect();

		let model = build(&resolved, self.policy)?;
		let report = PipelineReport {
			reactions: expansion.parsed,
			skipped: expansion.skipped,
			pairs: pairs.len(),
			unresolved: unresolved.len(),
			nodes: model.nodes.len(),
			edges: model.edges.len(),
		};
		info!(
			"graph built: {} reactions ({} skipped), {} pairs, {} nodes, {} edges, {} unnamed compounds",
			report.reactions, report.skipped, report.pairs, report.nodes, report.edges, report.unresolved,
		);

		Ok(PipelineOutput {
			model,
			pairs,
			report,
		})
	}
}

/// Load both sources, then run the pipeline with default settings.
pub async fn from_sources<C, R>(compounds: C, reactions: R) -> Result<PipelineOutput>
where
	C: AsyncBufRead + Unpin,
	R: AsyncBufRead + Unpin,
{
	let table = load::compound_table(compounds).await?;
	let reactions = load::reactions(reactions).await?;
	PipelineContext::new(table).run(&reactions)
}
