//! Readers for the two tab-delimited sources: the KEGG compound list and the
//! reaction equation table.

use futures::TryStreamExt;
use futures::io::{AsyncBufRead, AsyncBufReadExt};
use log::debug;

use super::equation::ReactionRecord;
use super::names::{CompoundRecord, CompoundTable};
use crate::error::{Error, Result};

/// Reads `ID<TAB>name; name; ...` lines. Blank lines are ignored and the first
/// record for a repeated ID wins.
pub async fn compound_table<R: AsyncBufRead + Unpin>(reader: R) -> Result<CompoundTable> {
	let mut lines = reader.lines();
	let mut table = CompoundTable::new();
	let mut line_no = 0;
	while let Some(line) = lines.try_next().await? {
		line_no += 1;
		if line.trim().is_empty() {
			continue;
		}
		table.insert(compound_record(line_no, &line)?);
	}
	debug!("loaded {} compounds from {} lines", table.len(), line_no);
	Ok(table)
}

fn compound_record(line: usize, text: &str) -> Result<CompoundRecord> {
	let Some((id, names)) = text.split_once('\t') else {
		return Err(Error::MalformedRecord {
			line,
			reason: "expected `id<TAB>names`".into(),
		});
	};
	let id = id.trim();
	if id.is_empty() {
		return Err(Error::MalformedRecord {
			line,
			reason: "empty compound id".into(),
		});
	}
	Ok(CompoundRecord {
		id: id.to_string(),
		names: names
			.split(';')
			.map(str::trim)
			.filter(|n| !n.is_empty())
			.map(str::to_owned)
			.collect(),
	})
}

/// Reads `id<TAB>equation[<TAB>...]` rows after a header row. Unescaped double
/// quotes are removed; the equation itself is not parsed here.
pub async fn reactions<R: AsyncBufRead + Unpin>(reader: R) -> Result<Vec<ReactionRecord>> {
	let mut lines = reader.lines();
	let mut out = Vec::new();
	let mut line_no = 0;
	let mut header_seen = false;
	while let Some(line) = lines.try_next().await? {
		line_no += 1;
		if line.trim().is_empty() {
			continue;
		}
		if !header_seen {
			header_seen = true;
			continue;
		}
		let line = strip_quotes(&line);
		let mut fields = line.split('\t');
		match (fields.next(), fields.next()) {
			(Some(id), Some(equation)) if !id.trim().is_empty() => out.push(ReactionRecord {
				id: id.trim().to_string(),
				equation: equation.to_string(),
			}),
			_ => {
				return Err(Error::MalformedRecord {
					line: line_no,
					reason: "expected `id<TAB>equation`".into(),
				});
			}
		}
	}
	debug!("loaded {} reactions", out.len());
	Ok(out)
}

fn strip_quotes(line: &str) -> String {
	let mut out = String::with_capacity(line.len());
	let mut prev = None;
	for c in line.chars() {
		if c != '"' || prev == Some('\\') {
			out.push(c);
		}
		prev = Some(c);
	}
	out
}

#[cfg(test)]
mod tests {
	use futures::executor::block_on;
	use futures::io::Cursor;

	use super::*;

	#[test]
	fn kegg_compound_list() {
		let raw = "cpd:C00001\tH2O; Water\ncpd:C00002\tATP; Adenosine 5'-triphosphate\n\n";
		let table = block_on(compound_table(Cursor::new(raw))).unwrap();
		assert_eq!(table.len(), 2);
		let water = table.get("C00001").unwrap();
		assert_eq!(water.id, "cpd:C00001");
		assert_eq!(water.names, vec!["H2O", "Water"]);
		assert_eq!(table.display_name("cpd:C00002"), Some("ATP"));
	}

	#[test]
	fn compound_line_without_names_is_rejected() {
		let raw = "cpd:C00001\tH2O\ncpd:C00002\n";
		match block_on(compound_table(Cursor::new(raw))) {
			Err(Error::MalformedRecord { line, .. }) => assert_eq!(line, 2),
			other => panic!("expected MalformedRecord, got {other:?}"),
		}
	}

	#[test]
	fn reaction_rows_skip_header_and_quotes() {
		let raw = "idReaction\tequation\n\
			\"R00001\"\t\"C00404 + n C00001 <=> (n+1) C02174\"\n\
			R00004\tC00013 + C00001 <=> 2 C00009\textra\r\n";
		let rows = block_on(reactions(Cursor::new(raw))).unwrap();
		assert_eq!(rows.len(), 2);
		assert_eq!(rows[0].id, "R00001");
		assert_eq!(rows[0].equation, "C00404 + n C00001 <=> (n+1) C02174");
		assert_eq!(rows[1].equation, "C00013 + C00001 <=> 2 C00009");
	}

	#[test]
	fn escaped_quotes_survive() {
		assert_eq!(strip_quotes(r#""a\"b""#), r#"a\"b"#);
	}

	#[test]
	fn reaction_row_without_equation_is_rejected() {
		let raw = "id\tequation\nR00001\n";
		assert!(matches!(
			block_on(reactions(Cursor::new(raw))),
			Err(Error::MalformedRecord { line: 2, .. })
		));
	}
}
