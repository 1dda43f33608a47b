//! Crate-wide error type.

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong between reading the source tables and
/// mounting a layout session.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// The equation does not split into exactly two sides.
	#[error("malformed equation `{equation}`: expected exactly one `>` delimiter, found {found}")]
	MalformedEquation {
		/// The raw equation text.
		equation: String,
		/// How many delimiters were found.
		found: usize,
	},

	/// A source line could not be read as a record.
	#[error("malformed record on line {line}: {reason}")]
	MalformedRecord {
		/// 1-based line number in the source.
		line: usize,
		/// What was wrong with it.
		reason: String,
	},

	/// An edge names a node the model does not have.
	#[error("edge references unknown node `{name}`")]
	MissingNode {
		/// The endpoint that has no node.
		name: String,
	},

	/// No canvas with this id, or it has no 2D context.
	#[error("render target `{id}` not found")]
	MissingRenderTarget {
		/// Element id that was looked up.
		id: String,
	},

	/// A search pattern failed to compile.
	#[error(transparent)]
	Pattern(#[from] regex::Error),

	/// Layout configuration JSON was rejected.
	#[error("invalid layout configuration: {0}")]
	Config(#[from] serde_json::Error),

	/// Reading a source failed.
	#[error(transparent)]
	Io(#[from] std::io::Error),
}
