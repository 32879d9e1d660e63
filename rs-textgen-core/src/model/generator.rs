use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::context::{ContextWindow, build_context};
use super::ngram_model::{EOS, NGramModel, is_marker};
use crate::error::GenerationError;
use crate::text::{IndicTokenizer, Tokenizer};

/// Default bound on sampling steps for a single generation.
pub const DEFAULT_MAX_STEPS: usize = 10_000;

/// A prefix to continue and the number of words to add to it.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct GenerationRequest {
	pub prefix_text: String,
	pub max_words: i64,
}

/// Outcome of a generation call.
///
/// `generation` holds the produced text on success, `message` explains why
/// the request was rejected otherwise.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct GenerationResult {
	pub generation: String,
	pub message: String,
}

impl GenerationResult {
	pub fn success(generation: String) -> Self {
		Self { generation, message: String::new() }
	}

	pub fn rejected(message: String) -> Self {
		Self { generation: String::new(), message }
	}

	pub fn is_rejected(&self) -> bool {
		!self.message.is_empty()
	}
}

/// Reasons a request is refused before sampling starts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
	#[error("The value of maximum number of words should be positive.")]
	InvalidWordBudget(i64),

	#[error(
		"The following words in the input are out of vocabulary: {}. Try with another input.",
		.0.join(", ")
	)]
	OutOfVocabulary(Vec<String>),
}

impl From<Rejection> for GenerationResult {
	fn from(rejection: Rejection) -> Self {
		Self::rejected(rejection.to_string())
	}
}

/// Tunables of the sampler loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GenerationOptions {
	/// Maximum number of sampled tokens before giving up on reaching `<eos>`.
	pub max_steps: usize,
}

impl Default for GenerationOptions {
	fn default() -> Self {
		Self { max_steps: DEFAULT_MAX_STEPS }
	}
}

/// Raw output of the sampler loop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sampled {
	/// Initial window followed by every sampled token, `<eos>` last.
	pub tokens: Vec<String>,
	/// Number of sampling steps taken.
	pub steps: usize,
	/// How many of those steps hit an unseen context.
	pub fallbacks: usize,
}

/// Tokenizes the prefix.
///
/// Returns `None` for blank input, along with the number of input tokens.
pub fn normalize<T: Tokenizer + ?Sized>(tokenizer: &T, prefix_text: &str) -> (Option<Vec<String>>, usize) {
	let tokens = tokenizer.tokenize(prefix_text);
	if tokens.is_empty() {
		(None, 0)
	} else {
		let count = tokens.len();
		(Some(tokens), count)
	}
}

/// Rejects the input if any token is unknown to the model.
///
/// Every offending token is reported once, in input order.
pub fn check_vocabulary(model: &NGramModel, tokens: &[String]) -> Result<(), Rejection> {
	let mut unknown: Vec<String> = Vec::new();
	for token in tokens {
		if !model.contains(token) && !unknown.contains(token) {
			unknown.push(token.clone());
		}
	}

	if unknown.is_empty() {
		Ok(())
	} else {
		Err(Rejection::OutOfVocabulary(unknown))
	}
}

/// Runs the Markov chain from `window` until `<eos>` is sampled.
///
/// Observed contexts are sampled proportionally to their counts; unseen
/// ones draw uniformly from the vocabulary.
///
/// # Errors
/// Returns `StepLimitExceeded` if `<eos>` is not reached within `max_steps`.
pub fn sample<R: Rng + ?Sized>(
	model: &NGramModel,
	window: ContextWindow,
	max_steps: usize,
	rng: &mut R,
) -> Result<Sampled, GenerationError> {
	let mut tokens: Vec<String> = window.as_slice().to_vec();
	let mut context = window;
	let mut fallbacks = 0;

	for step in 1..=max_steps {
		let next = match model.state(context.as_slice()).and_then(|state| state.predict(rng)) {
			Some(token) => token,
			None => {
				fallbacks += 1;
				model.random_token(rng)
			}
		}
		.to_owned();

		context.slide(&next);
		let done = next == EOS;
		tokens.push(next);

		if done {
			return Ok(Sampled { tokens, steps: step, fallbacks });
		}
	}

	Err(GenerationError::StepLimitExceeded { limit: max_steps })
}

/// Builds the display text from the sampler output.
///
/// The kept prefix replaces the initial window, markers are dropped and at
/// most `budget` tokens survive.
pub fn post_process<T: Tokenizer + ?Sized>(
	tokenizer: &T,
	prefix: Option<Vec<String>>,
	output: Vec<String>,
	context_len: usize,
	budget: usize,
) -> String {
	let tokens = match prefix {
		Some(mut prefix) => {
			prefix.extend(output.into_iter().skip(context_len));
			prefix
		}
		None => output,
	};

	let kept: Vec<String> = tokens
		.into_iter()
		.filter(|token| !is_marker(token))
		.take(budget)
		.collect();

	tokenizer.detokenize(&kept)
}

/// Continues `request.prefix_text` with at most `request.max_words` words.
///
/// # Returns
/// - `Ok` with the generation, or with a message if the request is rejected
/// - `Err` only if sampling exceeds `options.max_steps`
pub fn generate<T, R>(
	model: &NGramModel,
	tokenizer: &T,
	request: &GenerationRequest,
	options: GenerationOptions,
	rng: &mut R,
) -> Result<GenerationResult, GenerationError>
where
	T: Tokenizer + ?Sized,
	R: Rng + ?Sized,
{
	if request.max_words < 1 {
		return Ok(Rejection::InvalidWordBudget(request.max_words).into());
	}

	let (tokens, original_token_count) = normalize(tokenizer, &request.prefix_text);

	if let Some(tokens) = &tokens {
		if let Err(rejection) = check_vocabulary(model, tokens) {
			debug!(%rejection, "request rejected");
			return Ok(rejection.into());
		}
	}

	let initial = build_context(tokens.as_deref(), model.order());
	debug_assert_eq!(initial.window.len(), model.context_len());

	let sampled = sample(model, initial.window, options.max_steps, rng)?;
	debug!(
		steps = sampled.steps,
		fallbacks = sampled.fallbacks,
		prefix_kept = initial.prefix.is_some(),
		"sampling finished"
	);

	let max_words = usize::try_from(request.max_words).unwrap_or(usize::MAX);
	let budget = original_token_count.saturating_add(max_words);
	let generation = post_process(tokenizer, initial.prefix, sampled.tokens, model.context_len(), budget);

	Ok(GenerationResult::success(generation))
}

/// High-level generator bound to one shared, read-only model.
///
/// Cheap to clone; every clone reads the same model.
#[derive(Clone, Debug)]
pub struct Generator<T: Tokenizer = IndicTokenizer> {
	model: Arc<NGramModel>,
	tokenizer: T,
	options: GenerationOptions,
}

impl Generator<IndicTokenizer> {
	/// Creates a generator using the Indic tokenizer and default options.
	pub fn new(model: Arc<NGramModel>) -> Self {
		Self::with_tokenizer(model, IndicTokenizer)
	}
}

impl<T: Tokenizer> Generator<T> {
	pub fn with_tokenizer(model: Arc<NGramModel>, tokenizer: T) -> Self {
		Self {
			model,
			tokenizer,
			options: GenerationOptions::default(),
		}
	}

	pub fn with_options(mut self, options: GenerationOptions) -> Self {
		self.options = options;
		self
	}

	pub fn model(&self) -> &NGramModel {
		&self.model
	}

	pub fn options(&self) -> GenerationOptions {
		self.options
	}

	/// Continues `prefix_text` with at most `max_words` words.
	///
	/// See [`generate`].
	pub fn generate<R: Rng + ?Sized>(
		&self,
		prefix_text: &str,
		max_words: i64,
		rng: &mut R,
	) -> Result<GenerationResult, GenerationError> {
		let request = GenerationRequest {
			prefix_text: prefix_text.to_owned(),
			max_words,
		};
		generate(&self.model, &self.tokenizer, &request, self.options, rng)
	}
}
