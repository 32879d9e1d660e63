use std::cmp::Ordering;

use super::ngram_model::BOS;

/// The `order - 1` most recent tokens conditioning the next prediction.
///
/// Sliding (drop the oldest token, append the newest) is the only mutation,
/// so the length never changes after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextWindow {
	tokens: Vec<String>,
}

impl ContextWindow {
	/// A window of `len` begin markers.
	pub fn empty(len: usize) -> Self {
		Self { tokens: vec![BOS.to_owned(); len] }
	}

	/// Pushes `token` and drops the oldest entry.
	///
	/// A zero-length window (unigram model) stays empty.
	pub fn slide(&mut self, token: &str) {
		if self.tokens.is_empty() {
			return;
		}
		self.tokens.remove(0);
		self.tokens.push(token.to_owned());
	}

	pub fn len(&self) -> usize {
		self.tokens.len()
	}

	pub fn is_empty(&self) -> bool {
		self.tokens.is_empty()
	}

	pub fn as_slice(&self) -> &[String] {
		&self.tokens
	}
}

/// Result of fitting an input to the model's window size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitialContext {
	/// Window the sampler starts from.
	pub window: ContextWindow,
	/// Input tokens to restore in front of the generated ones, when the
	/// window alone does not represent the whole input.
	pub prefix: Option<Vec<String>>,
}

/// Builds the initial context window for a model of order `order`.
///
/// - No input: `order - 1` begin markers, nothing to restore.
/// - Shorter input: left-padded with begin markers, input restored later.
/// - Longer input: its last `order - 1` tokens, input restored later.
/// - Exact length: the input itself, nothing to restore.
pub fn build_context(tokens: Option<&[String]>, order: usize) -> InitialContext {
	let len = order.saturating_sub(1);

	let Some(tokens) = tokens else {
		return InitialContext {
			window: ContextWindow::empty(len),
			prefix: None,
		};
	};

	match tokens.len().cmp(&len) {
		Ordering::Less => {
			let mut window = vec![BOS.to_owned(); len - tokens.len()];
			window.extend_from_slice(tokens);
			InitialContext {
				window: ContextWindow { tokens: window },
				prefix: Some(tokens.to_vec()),
			}
		}
		Ordering::Greater => InitialContext {
			window: ContextWindow {
				tokens: tokens[tokens.len() - len..].to_vec(),
			},
			prefix: Some(tokens.to_vec()),
		},
		Ordering::Equal => InitialContext {
			window: ContextWindow { tokens: tokens.to_vec() },
			prefix: None,
		},
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn tokens(words: &[&str]) -> Vec<String> {
		words.iter().map(|w| w.to_string()).collect()
	}

	#[test]
	fn test_no_input_is_all_begin_markers() {
		let initial = build_context(None, 3);
		assert_eq!(initial.window.as_slice(), &[BOS, BOS]);
		assert_eq!(initial.prefix, None);
	}

	#[test]
	fn test_short_input_is_padded() {
		let input = tokens(&["a"]);
		let initial = build_context(Some(input.as_slice()), 4);
		assert_eq!(initial.window.as_slice(), &[BOS, BOS, "a"]);
		assert_eq!(initial.prefix, Some(input));
	}

	#[test]
	fn test_long_input_keeps_tail() {
		let input = tokens(&["a", "b", "c", "d"]);
		let initial = build_context(Some(input.as_slice()), 3);
		assert_eq!(initial.window.as_slice(), &["c", "d"]);
		assert_eq!(initial.prefix, Some(input));
	}

	#[test]
	fn test_exact_input_is_the_window() {
		let input = tokens(&["a", "b"]);
		let initial = build_context(Some(input.as_slice()), 3);
		assert_eq!(initial.window.as_slice(), &["a", "b"]);
		assert_eq!(initial.prefix, None);
	}

	#[test]
	fn test_unigram_window_is_empty() {
		let input = tokens(&["a"]);
		let initial = build_context(Some(input.as_slice()), 1);
		assert!(initial.window.is_empty());
		assert_eq!(initial.prefix, Some(input));
	}

	#[test]
	fn test_slide_keeps_length() {
		let mut window = ContextWindow::empty(2);
		window.slide("x");
		assert_eq!(window.as_slice(), &[BOS, "x"]);
		window.slide("y");
		assert_eq!(window.as_slice(), &["x", "y"]);
		assert_eq!(window.len(), 2);

		let mut unigram = ContextWindow::empty(0);
		unigram.slide("x");
		assert!(unigram.is_empty());
	}
}
