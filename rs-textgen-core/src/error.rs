use thiserror::Error;

/// Errors raised while building, validating or loading an `NGramModel`.
///
/// A model that fails any of these checks is unusable: generation relies on
/// every invariant listed here.
#[derive(Error, Debug)]
pub enum ModelError {
	#[error("IO Error: {0}")]
	Io(#[from] std::io::Error),

	#[error("Decoding Error: {0}")]
	Postcard(#[from] postcard::Error),

	#[error("Model order must be >= 1, got {0}")]
	ZeroOrder(usize),

	#[error("Model vocabulary is empty")]
	EmptyVocabulary,

	#[error("Reserved marker '{0}' found in vocabulary")]
	MarkerInVocabulary(String),

	#[error("Context {context:?} has {found} tokens, expected {expected}")]
	ContextLength {
		context: Vec<String>,
		expected: usize,
		found: usize,
	},

	#[error("Context {context:?} records a zero count for '{token}'")]
	ZeroCount { context: Vec<String>, token: String },

	#[error("Count of '{token}' overflows")]
	CountOverflow { token: String },

	#[error("Context {context:?} total is {total}, but its counts sum to {sum}")]
	TotalMismatch {
		context: Vec<String>,
		total: u64,
		sum: u64,
	},
}

/// Fatal errors raised by the sampler loop.
///
/// Validation problems with the request itself are not errors: they come
/// back as a `GenerationResult` carrying a message.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum GenerationError {
	#[error("No end marker produced after {limit} sampling steps, the model is likely incomplete")]
	StepLimitExceeded { limit: usize },
}
