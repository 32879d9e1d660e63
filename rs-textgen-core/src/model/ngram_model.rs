use std::collections::HashMap;

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use super::state::State;
use crate::error::ModelError;

/// Begin marker, pads the context window when the input is shorter than it.
pub const BOS: &str = "<bos>";

/// End marker, terminates generation.
pub const EOS: &str = "<eos>";

/// Returns `true` for the reserved `<bos>` / `<eos>` tokens.
pub fn is_marker(token: &str) -> bool {
	token == BOS || token == EOS
}

/// Represents a word-level n-gram model.
///
/// The `NGramModel` stores one `State` per observed context of `order - 1`
/// tokens. It is consumed read-only by generation; nothing in this crate
/// mutates a model after construction.
///
/// # Invariants
/// - `order` is always >= 1
/// - `vocabulary` is non-empty, sorted, free of duplicates and markers
/// - Every key of `states` has exactly `order - 1` tokens
/// - Every state satisfies the `State` invariants (positive counts, matching total)
///
/// Deserializing goes through the same checks as `from_counts`, so a decoded
/// model is always valid.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(try_from = "RawNGramModel")]
pub struct NGramModel {
	/// The order of the model (number of tokens in the n-gram)
	order: usize,

	/// Known tokens, sorted so uniform sampling is reproducible
	vocabulary: Vec<String>,

	/// Mapping from a context (length order-1) to its observed transitions
	states: HashMap<Vec<String>, State>,
}

/// Wire form of `NGramModel`, checked before it becomes one.
#[derive(Deserialize)]
pub(crate) struct RawNGramModel {
	order: usize,
	vocabulary: Vec<String>,
	states: HashMap<Vec<String>, State>,
}

impl TryFrom<RawNGramModel> for NGramModel {
	type Error = ModelError;

	fn try_from(raw: RawNGramModel) -> Result<Self, Self::Error> {
		Self {
			order: raw.order,
			vocabulary: raw.vocabulary,
			states: raw.states,
		}
		.normalized()
	}
}

impl NGramModel {
	/// Creates a model of order `order` with no observed context.
	///
	/// Every context is unseen, so generation only ever uses the uniform
	/// fallback.
	///
	/// # Errors
	/// Returns an error if the model invariants do not hold.
	pub fn new<I, S>(order: usize, vocabulary: I) -> Result<Self, ModelError>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self::from_counts(order, vocabulary, std::iter::empty())
	}

	/// Creates a model from already computed counts.
	///
	/// Counts given twice for the same context are summed.
	///
	/// # Errors
	/// Returns an error if the model invariants do not hold.
	pub fn from_counts<I, S, C>(order: usize, vocabulary: I, counts: C) -> Result<Self, ModelError>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
		C: IntoIterator<Item = (Vec<String>, State)>,
	{
		let mut states: HashMap<Vec<String>, State> = HashMap::new();
		for (context, state) in counts {
			match states.get_mut(&context) {
				Some(existing) => existing.merge(&state)?,
				None => {
					states.insert(context, state);
				}
			}
		}

		Self {
			order,
			vocabulary: vocabulary.into_iter().map(Into::into).collect(),
			states,
		}
		.normalized()
	}

	/// Sorts the vocabulary and checks every invariant.
	///
	/// Applied to every model built in memory or deserialized.
	fn normalized(mut self) -> Result<Self, ModelError> {
		self.vocabulary.sort();
		self.vocabulary.dedup();
		self.validate()?;
		Ok(self)
	}

	/// Checks the model invariants.
	///
	/// # Errors
	/// Returns the first violated invariant.
	pub fn validate(&self) -> Result<(), ModelError> {
		if self.order == 0 {
			return Err(ModelError::ZeroOrder(self.order));
		}
		if self.vocabulary.is_empty() {
			return Err(ModelError::EmptyVocabulary);
		}
		if let Some(marker) = self.vocabulary.iter().find(|token| is_marker(token)) {
			return Err(ModelError::MarkerInVocabulary(marker.clone()));
		}

		let expected = self.context_len();
		for (context, state) in &self.states {
			if context.len() != expected {
				return Err(ModelError::ContextLength {
					context: context.clone(),
					expected,
					found: context.len(),
				});
			}
			state.check(context)?;
		}

		Ok(())
	}

	/// The order `n` of the model.
	pub fn order(&self) -> usize {
		self.order
	}

	/// Length of every context window, `order - 1`.
	pub fn context_len(&self) -> usize {
		self.order - 1
	}

	/// The sorted vocabulary.
	pub fn vocabulary(&self) -> &[String] {
		&self.vocabulary
	}

	/// Returns `true` if `token` is part of the vocabulary.
	pub fn contains(&self, token: &str) -> bool {
		self.vocabulary
			.binary_search_by(|known| known.as_str().cmp(token))
			.is_ok()
	}

	/// Number of observed contexts.
	pub fn context_count(&self) -> usize {
		self.states.len()
	}

	/// Returns the observed transitions of `context`, if any.
	///
	/// An empty state is reported as unseen.
	pub fn state(&self, context: &[String]) -> Option<&State> {
		self.states.get(context).filter(|state| !state.is_empty())
	}

	/// Conditional probability of `token` following `context`.
	///
	/// Returns `None` for an unseen context.
	pub fn probability(&self, context: &[String], token: &str) -> Option<f64> {
		self.state(context).map(|state| state.probability(token))
	}

	/// Draws one token uniformly from the vocabulary.
	pub(crate) fn random_token<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
		// Never empty once validated
		self.vocabulary
			.choose(rng)
			.map(String::as_str)
			.unwrap_or(EOS)
	}
}
