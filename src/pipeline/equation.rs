//! Reaction equation parsing.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};

/// Separates the consumed side of an equation from the produced side.
pub const DELIMITER: char = '>';

/// `C` plus exactly five digits. A qualifier opened directly after the digits,
/// e.g. `C00001(side1)`, is dropped; it may be unterminated when the source
/// qualifier contained spaces and was split by the tokenizer.
static COMPOUND_TOKEN: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^(C\d{5})(?:\(.*)?$").unwrap());

/// Returns the compound ID carried by `token`, or `None` for coefficients,
/// plus signs, arrow fragments and anything else.
pub fn compound_id(token: &str) -> Option<&str> {
	COMPOUND_TOKEN
		.captures(token)
		.and_then(|caps| caps.get(1))
		.map(|m| m.as_str())
}

/// Arrow type read off the delimiter's shaft. Parsed, never used to orient or
/// filter edges.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Direction {
	/// `=>`, `->` or a bare `>`.
	#[default]
	Forward,
	/// `<=>` or `<->`.
	Reversible,
}

/// One row of the reaction source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReactionRecord {
	/// Reaction id, e.g. `R00004`.
	pub id: String,
	/// Unparsed equation text.
	pub equation: String,
}

impl ReactionRecord {
	/// Shorthand for [`parse`] on this row.
	pub fn parse(&self) -> Result<ReactionEquation> {
		parse(&self.id, &self.equation)
	}
}

/// Compound IDs found on each side of a reaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReactionEquation {
	/// Source reaction id.
	pub id: String,
	/// Left side, in encounter order.
	pub lhs_ids: Vec<String>,
	/// Right side, in encounter order.
	pub rhs_ids: Vec<String>,
	/// Arrow type. Not used by graph building.
	pub direction: Direction,
}

/// Split `equation` into its two sides and keep the compound IDs of each, in
/// encounter order and without deduplication.
pub fn parse(id: &str, equation: &str) -> Result<ReactionEquation> {
	let mut sides = equation.split(DELIMITER);
	let (Some(lhs), Some(rhs), None) = (sides.next(), sides.next(), sides.next()) else {
		return Err(Error::MalformedEquation {
			equation: equation.to_string(),
			found: equation.matches(DELIMITER).count(),
		});
	};

	// The shaft (`=`, `-`, `<=`, `<-`) belongs to the arrow, not the side.
	let body = lhs.trim_end_matches(['<', '=', '-']);
	let direction = if lhs[body.len()..].starts_with('<') {
		Direction::Reversible
	} else {
		Direction::Forward
	};

	Ok(ReactionEquation {
		id: id.to_string(),
		lhs_ids: side_ids(body),
		rhs_ids: side_ids(rhs),
		direction,
	})
}

fn side_ids(side: &str) -> Vec<String> {
	side.split_whitespace()
		.filter_map(compound_id)
		.map(str::to_owned)
		.collect()
}
