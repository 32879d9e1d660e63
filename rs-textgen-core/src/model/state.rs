use std::collections::BTreeMap;

use rand::Rng;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Represents one observed context of an n-gram model.
///
/// A `State` stores every token seen right after a given `order - 1` token
/// context, with how many times it was seen, and the running total of those
/// counts (the normalizing denominator).
///
/// Conceptually, this is a node in a Markov chain where outgoing edges
/// are weighted by their number of observations.
///
/// ## Invariants
/// - Each transition count is strictly positive
/// - `total` is the sum of all transition counts
/// - Transitions are key-ordered, so sampling with a seeded generator is
///   reproducible across processes
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct State {
	/// Outgoing transitions indexed by the next token.
	/// Example: { "ଘର" => 42, "<eos>" => 3 }
	transitions: BTreeMap<String, u64>,
	/// Sum of all transition counts.
	total: u64,
}

impl State {
	/// Creates a new empty state.
	pub fn new() -> Self {
		Self::default()
	}

	/// Builds a state from `(token, count)` pairs.
	///
	/// Repeated tokens have their counts summed.
	///
	/// # Errors
	/// Returns an error if the counts do not fit in a `u64`.
	pub fn from_counts<I, S>(counts: I) -> Result<Self, ModelError>
	where
		I: IntoIterator<Item = (S, u64)>,
		S: Into<String>,
	{
		let mut state = Self::new();
		for (token, occurrence) in counts {
			state.add_transition(token, occurrence)?;
		}
		Ok(state)
	}

	/// Records `occurrence` more observations of `next_token`.
	pub(crate) fn add_transition<S: Into<String>>(&mut self, next_token: S, occurrence: u64) -> Result<(), ModelError> {
		let next_token = next_token.into();
		let total = self.total.checked_add(occurrence);
		let count = self.count(&next_token).checked_add(occurrence);
		match (total, count) {
			(Some(total), Some(count)) => {
				self.transitions.insert(next_token, count);
				self.total = total;
				Ok(())
			}
			_ => Err(ModelError::CountOverflow { token: next_token }),
		}
	}

	/// Merges another state observed for the same context into this one.
	///
	/// Transition counts and totals are summed.
	///
	/// # Errors
	/// Returns an error if a summed count overflows. `self` is left unchanged.
	pub(crate) fn merge(&mut self, other: &Self) -> Result<(), ModelError> {
		let mut merged = self.clone();
		for (next_token, occurrence) in &other.transitions {
			merged.add_transition(next_token.as_str(), *occurrence)?;
		}
		*self = merged;
		Ok(())
	}

	/// Returns the normalizing denominator of this state.
	pub fn total(&self) -> u64 {
		self.total
	}

	/// Returns `true` if nothing was ever observed after this context.
	pub fn is_empty(&self) -> bool {
		self.total == 0
	}

	/// Number of times `token` was observed after this context.
	pub fn count(&self, token: &str) -> u64 {
		self.transitions.get(token).copied().unwrap_or(0)
	}

	/// Conditional probability `count(token) / total`, or 0.0 for an empty state.
	pub fn probability(&self, token: &str) -> f64 {
		if self.total == 0 {
			return 0.0;
		}
		self.count(token) as f64 / self.total as f64
	}

	/// Iterates over the categorical distribution of this state, in token order.
	pub fn probabilities(&self) -> impl Iterator<Item = (&str, f64)> {
		let total = self.total as f64;
		self.transitions
			.iter()
			.map(move |(token, occurrence)| (token.as_str(), *occurrence as f64 / total))
	}

	/// Predicts the next token using weighted random sampling.
	///
	/// The probability of selecting a token is proportional to its
	/// occurrence count. One uniform draw in `0..total` is walked down the
	/// cumulative counts to select a bucket.
	///
	/// Returns `None` if the state has no transitions.
	pub fn predict<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
		if self.total == 0 {
			return None;
		}

		let mut r = rng.random_range(0..self.total);

		let mut fallback: Option<&str> = None;
		for (next_token, occurrence) in &self.transitions {
			if r < *occurrence {
				return Some(next_token.as_str());
			}
			r -= occurrence;
			fallback = Some(next_token.as_str());
		}

		// Unreachable while `total` matches the counts
		fallback
	}

	/// Checks the state invariants for the given context.
	pub(crate) fn check(&self, context: &[String]) -> Result<(), ModelError> {
		if let Some((token, _)) = self.transitions.iter().find(|(_, occurrence)| **occurrence == 0) {
			return Err(ModelError::ZeroCount {
				context: context.to_vec(),
				token: token.clone(),
			});
		}

		let sum = self
			.transitions
			.values()
			.try_fold(0u64, |acc, occurrence| acc.checked_add(*occurrence))
			.unwrap_or(u64::MAX);
		if sum != self.total {
			return Err(ModelError::TotalMismatch {
				context: context.to_vec(),
				total: self.total,
				sum,
			});
		}

		Ok(())
	}
}
