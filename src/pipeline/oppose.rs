//! Expansion of reactions into opposing compound pairs.

use std::collections::HashSet;
use std::fmt::Write as _;

use log::warn;

use super::equation::{ReactionEquation, ReactionRecord};
use super::names::strip_namespace;

/// Two compounds found on opposite sides of the same reaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpposePair {
	/// Reaction the pair came from.
	pub reaction: String,
	/// Compound ID on the left side.
	pub lhs: String,
	/// Compound ID on the right side.
	pub rhs: String,
}

/// Every left compound is paired with every right compound, lhs outer and rhs
/// inner. This is a cross product, not a stoichiometric
/// matching.
pub fn expand(eq: &ReactionEquation) -> Vec<OpposePair> {
	eq.lhs_ids
		.iter()
		.flat_map(|lhs| {
			eq.rhs_ids.iter().map(move |rhs| OpposePair {
				reaction: eq.id.clone(),
				lhs: lhs.clone(),
				rhs: rhs.clone(),
			})
		})
		.collect()
}

/// Pairs for a whole batch, plus the number of equations that failed to parse.
#[derive(Clone, Debug, Default)]
pub struct Expansion {
	/// Pairs of every parsed equation, in record order.
	pub pairs: Vec<OpposePair>,
	/// Equations that parsed.
	pub parsed: usize,
	/// Equations that did not.
	pub skipped: usize,
}

/// [`expand`] every record, skipping and logging the ones that fail to parse.
pub fn expand_all(records: &[ReactionRecord]) -> Expansion {
	let mut out = Expansion::default();
	for record in records {
		match record.parse() {
			Ok(eq) => {
				out.parsed += 1;
				out.pairs.extend(expand(&eq));
			}
			Err(err) => {
				warn!("skipping reaction {}: {}", record.id, err);
				out.skipped += 1;
			}
		}
	}
	out
}

/// Keep only pairs whose endpoints are both in `focus`. IDs compare with any
/// namespace prefix removed.
pub fn restrict(pairs: Vec<OpposePair>, focus: &HashSet<String>) -> Vec<OpposePair> {
	let focus: HashSet<&str> = focus.iter().map(|id| strip_namespace(id)).collect();
	pairs
		.into_iter()
		.filter(|p| {
			focus.contains(strip_namespace(&p.lhs)) && focus.contains(strip_namespace(&p.rhs))
		})
		.collect()
}

/// Tab-separated dump with an `idReaction\tlhs\trhs` header.
pub fn to_tsv(pairs: &[OpposePair]) -> String {
	let mut out = String::from("idReaction\tlhs\trhs\n");
	for p in pairs {
		let _ = writeln!(out, "{}\t{}\t{}", p.reaction, p.lhs, p.rhs);
	}
	out
}
