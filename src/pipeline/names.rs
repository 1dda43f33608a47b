//! Compound ID to display name resolution.

use indexmap::IndexMap;
use indexmap::map::Entry;
use regex::{Regex, RegexBuilder};

use super::oppose::OpposePair;
use crate::error::Result;

/// Namespace qualifier carried by KEGG list output, e.g. `cpd:C00001`.
pub const NAMESPACE_PREFIX: &str = "cpd:";

/// `id` without a leading [`NAMESPACE_PREFIX`].
pub fn strip_namespace(id: &str) -> &str {
	id.strip_prefix(NAMESPACE_PREFIX).unwrap_or(id)
}

/// A compound and its names, in source order. The first name is the display
/// name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompoundRecord {
	/// ID as read, prefix included.
	pub id: String,
	/// Names in source order.
	pub names: Vec<String>,
}

/// Read-only compound ID → names lookup for one session. Keys are stored
/// without the namespace prefix so prefixed and bare IDs both match.
#[derive(Clone, Debug, Default)]
pub struct CompoundTable {
	records: IndexMap<String, CompoundRecord>,
}

/// One resolved pair endpoint. `name` falls back to `id` when the table has
/// no entry for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
	/// Compound ID without the namespace prefix.
	pub id: String,
	/// Display name.
	pub name: String,
	/// Whether `name` came from the table.
	pub resolved: bool,
}

/// An [`OpposePair`] with both endpoints resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedPair {
	/// Reaction the pair came from.
	pub reaction: String,
	/// Left endpoint.
	pub lhs: Endpoint,
	/// Right endpoint.
	pub rhs: Endpoint,
}

/// A [`CompoundTable::search`] hit: the lowercased names that matched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NameMatch {
	/// ID of the matching record, as read.
	pub id: String,
	/// Matching names, lowercased.
	pub names: Vec<String>,
}

impl CompoundTable {
	/// An empty table.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds `record` unless its ID is already present; the first record for
	/// an ID wins. Returns whether it was added.
	pub fn insert(&mut self, record: CompoundRecord) -> bool {
		match self.records.entry(strip_namespace(&record.id).to_string()) {
			Entry::Occupied(_) => false,
			Entry::Vacant(slot) => {
				slot.insert(record);
				true
			}
		}
	}

	/// Number of distinct IDs.
	pub fn len(&self) -> usize {
		self.records.len()
	}

	/// True when no record was loaded.
	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}

	/// Record for `id`, with or without the prefix.
	pub fn get(&self, id: &str) -> Option<&CompoundRecord> {
		self.records.get(strip_namespace(id))
	}

	/// Records in load order.
	pub fn records(&self) -> impl Iterator<Item = &CompoundRecord> {
		self.records.values()
	}

	/// First listed name for `id`, if the table knows it.
	pub fn display_name(&self, id: &str) -> Option<&str> {
		self.get(id)
			.and_then(|r| r.names.first())
			.map(String::as_str)
	}

	/// Resolve one ID, falling back to the ID itself.
	pub fn resolve_id(&self, id: &str) -> Endpoint {
		let id = strip_namespace(id);
		match self.display_name(id) {
			Some(name) => Endpoint {
				id: id.to_string(),
				name: name.to_string(),
				resolved: true,
			},
			None => Endpoint {
				id: id.to_string(),
				name: id.to_string(),
				resolved: false,
			},
		}
	}

	/// Resolve both endpoints of `pair`.
	pub fn resolve(&self, pair: &OpposePair) -> ResolvedPair {
		ResolvedPair {
			reaction: pair.reaction.clone(),
			lhs: self.resolve_id(&pair.lhs),
			rhs: self.resolve_id(&pair.rhs),
		}
	}

	/// Records with a name equal to `name`, ignoring case, an optional `d-` or
	/// `l-` prefix, and the `-ate` / `-ic acid` ending (so "lactate" also
	/// finds "L-Lactic acid").
	pub fn search(&self, name: &str) -> Result<Vec<NameMatch>> {
		let pattern = name_pattern(name)?;
		Ok(self
			.records
			.values()
			.filter_map(|record| {
				let names: Vec<String> = record
					.names
					.iter()
					.map(|n| n.to_lowercase())
					.filter(|n| pattern.is_match(n))
					.collect();
				(!names.is_empty()).then(|| NameMatch {
					id: record.id.clone(),
					names,
				})
			})
			.collect())
	}
}

impl FromIterator<CompoundRecord> for CompoundTable {
	fn from_iter<I: IntoIterator<Item = CompoundRecord>>(iter: I) -> Self {
		let mut table = Self::new();
		for record in iter {
			table.insert(record);
		}
		table
	}
}

/// Relabel both endpoints of `pair` through `table`.
pub fn resolve(pair: &OpposePair, table: &CompoundTable) -> ResolvedPair {
	table.resolve(pair)
}

fn name_pattern(name: &str) -> Result<Regex> {
	let name = name.trim().to_lowercase();
	let body = ["ate", "ic acid"]
		.iter()
		.find_map(|ending| name.strip_suffix(*ending))
		.map(|stem| format!("{}(?:ate|ic acid)", regex::escape(stem)))
		.unwrap_or_else(|| regex::escape(&name));
	Ok(RegexBuilder::new(&format!("^(?:[dl]-)?{body}$"))
		.case_insensitive(true)
		.build()?)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn record(id: &str, names: &[&str]) -> CompoundRecord {
		CompoundRecord {
			id: id.into(),
			names: names.iter().map(|s| s.to_string()).collect(),
		}
	}

	fn table() -> CompoundTable {
		[
			record("cpd:C00001", &["H2O", "Water"]),
			record("cpd:C00011", &["CO2", "Carbon dioxide"]),
			record("C00186", &["(S)-Lactate", "L-Lactate", "L-Lactic acid"]),
			record("C00256", &["(R)-Lactate", "D-Lactate"]),
		]
		.into_iter()
		.collect()
	}

	#[test]
	fn first_name_with_prefix_stripped() {
		let t = table();
		let ep = t.resolve_id("cpd:C00001");
		assert_eq!(ep.name, "H2O");
		assert_eq!(ep.id, "C00001");
		assert!(ep.resolved);
		assert_eq!(t.resolve_id("C00001").name, "H2O");
		assert_eq!(t.resolve_id("cpd:C00186").name, "(S)-Lactate");
	}

	#[test]
	fn unknown_id_falls_back_to_itself() {
		let ep = table().resolve_id("C99999");
		assert_eq!(ep.name, "C99999");
		assert!(!ep.resolved);
	}

	#[test]
	fn resolves_both_endpoints() {
		let pair = OpposePair {
			reaction: "R1".into(),
			lhs: "C00001".into(),
			rhs: "C99999".into(),
		};
		let resolved = resolve(&pair, &table());
		assert_eq!(resolved.lhs.name, "H2O");
		assert_eq!(resolved.rhs.name, "C99999");
		assert_eq!(resolved.reaction, "R1");
	}

	#[test]
	fn first_record_for_an_id_wins() {
		let mut t = table();
		assert!(!t.insert(record("C00001", &["Dihydrogen oxide"])));
		assert_eq!(t.display_name("C00001"), Some("H2O"));
		assert_eq!(t.len(), 4);
	}

	#[test]
	fn record_without_names_is_unresolved() {
		let t: CompoundTable = [record("C00002", &[])].into_iter().collect();
		assert!(!t.resolve_id("C00002").resolved);
	}

	#[test]
	fn search_handles_chirality_and_acid_endings() {
		let t = table();
		let hits = t.search("Lactate").unwrap();
		let ids: Vec<&str> = hits.iter().map(|h| h.id.as_str()).collect();
		assert_eq!(ids, vec!["C00186", "C00256"]);
		assert_eq!(hits[0].names, vec!["l-lactate", "l-lactic acid"]);
		assert_eq!(hits[1].names, vec!["d-lactate"]);

		assert_eq!(t.search("water").unwrap()[0].id, "cpd:C00001");
		assert!(t.search("ethanol").unwrap().is_empty());
	}
}
