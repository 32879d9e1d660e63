use std::sync::LazyLock;

use regex::Regex;

/// Script-aware conversion between text and word tokens.
///
/// `detokenize` is expected to invert `tokenize` for well-formed text.
pub trait Tokenizer {
	fn tokenize(&self, text: &str) -> Vec<String>;
	fn detokenize(&self, tokens: &[String]) -> String;
}

/// Devanagari danda, the Odia/Hindi full stop.
const DANDA: char = '\u{0964}';
/// Devanagari double danda.
const DOUBLE_DANDA: char = '\u{0965}';

/// Tokens glued to the token before them.
const CLOSING: &[&str] = &[".", ",", ";", ":", "!", "?", ")", "]", "}", "%", "।", "॥"];
/// Tokens glued to the token after them.
const OPENING: &[&str] = &["(", "[", "{"];
/// Tokens alternating between opening and closing.
const QUOTES: &[&str] = &["\"", "'"];

/// Digit groups split apart on `, . : /`, as in "3 . 14" or "12 / 05 / 2020".
static NUMBER_SEQUENCE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"([0-9]+ [,.:/] )+[0-9]+").expect("number pattern is valid"));

/// Trivial tokenizer for Indic scripts.
///
/// Words are separated by whitespace and every punctuation mark (ASCII or
/// danda) becomes a token of its own. Script characters, including combining
/// vowel signs, are never split. Numbers and dates such as `3.14`, `1,000`
/// or `12/05/2020` are kept as one token.
#[derive(Debug, Default, Clone, Copy)]
pub struct IndicTokenizer;

impl IndicTokenizer {
	fn is_punctuation(c: char) -> bool {
		c.is_ascii_punctuation() || c == DANDA || c == DOUBLE_DANDA
	}
}

impl Tokenizer for IndicTokenizer {
	fn tokenize(&self, text: &str) -> Vec<String> {
		let mut tokens = Vec::new();

		for word in text.split_whitespace() {
			let mut current = String::new();
			for c in word.chars() {
				if Self::is_punctuation(c) {
					if !current.is_empty() {
						tokens.push(std::mem::take(&mut current));
					}
					tokens.push(c.to_string());
				} else {
					current.push(c);
				}
			}
			if !current.is_empty() {
				tokens.push(current);
			}
		}

		// Tokens hold no whitespace, so joining on spaces is lossless
		let spaced = tokens.join(" ");
		let rejoined = NUMBER_SEQUENCE.replace_all(&spaced, |caps: &regex::Captures| caps[0].replace(' ', ""));
		rejoined.split(' ').filter(|token| !token.is_empty()).map(str::to_owned).collect()
	}

	fn detokenize(&self, tokens: &[String]) -> String {
		let mut text = String::new();
		let mut glue_next = false;
		// One open/closed flag per quote kind
		let mut open_quotes = [false; 2];

		for token in tokens {
			let token = token.as_str();
			let quote = QUOTES.iter().position(|q| *q == token);

			let glue_left = CLOSING.contains(&token) || quote.is_some_and(|q| open_quotes[q]);
			if !text.is_empty() && !glue_next && !glue_left {
				text.push(' ');
			}
			text.push_str(token);

			glue_next = OPENING.contains(&token);
			if let Some(q) = quote {
				open_quotes[q] = !open_quotes[q];
				glue_next = open_quotes[q];
			}
		}

		text
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn tokens(words: &[&str]) -> Vec<String> {
		words.iter().map(|w| w.to_string()).collect()
	}

	#[test]
	fn test_blank_input_has_no_tokens() {
		assert!(IndicTokenizer.tokenize("").is_empty());
		assert!(IndicTokenizer.tokenize(" \t\n ").is_empty());
	}

	#[test]
	fn test_punctuation_is_split() {
		assert_eq!(
			IndicTokenizer.tokenize("ପାଖରେ ରାଜ୍ୟ, ଘର।"),
			tokens(&["ପାଖରେ", "ରାଜ୍ୟ", ",", "ଘର", "।"])
		);
		assert_eq!(IndicTokenizer.tokenize("(a)"), tokens(&["(", "a", ")"]));
	}

	#[test]
	fn test_numbers_and_dates_stay_whole() {
		assert_eq!(
			IndicTokenizer.tokenize("ମୁଁ 3.14 ଟଙ୍କା 1,000 12/05/2020"),
			tokens(&["ମୁଁ", "3.14", "ଟଙ୍କା", "1,000", "12/05/2020"])
		);
		assert_eq!(IndicTokenizer.tokenize("10:30 ରେ"), tokens(&["10:30", "ରେ"]));
		// Trailing punctuation after a number is still split
		assert_eq!(IndicTokenizer.tokenize("ଦାମ 25."), tokens(&["ଦାମ", "25", "."]));
	}

	#[test]
	fn test_detokenize_glues_punctuation() {
		let input = tokens(&["ପାଖରେ", "ରାଜ୍ୟ", ",", "ଘର", "।"]);
		assert_eq!(IndicTokenizer.detokenize(&input), "ପାଖରେ ରାଜ୍ୟ, ଘର।");
	}

	#[test]
	fn test_detokenize_brackets_and_quotes() {
		let input = tokens(&["he", "said", "\"", "go", "(", "now", ")", "\"", "."]);
		assert_eq!(IndicTokenizer.detokenize(&input), "he said \"go (now)\".");
	}

	#[test]
	fn test_detokenize_empty() {
		assert_eq!(IndicTokenizer.detokenize(&[]), "");
	}

	#[test]
	fn test_round_trip_well_formed_text() {
		for text in ["ଘର ଭଲ।", "a, b; c!", "x (y) z", "say \"hi\" now", "ଏକ ଦୁଇ॥", "ମୁଁ 3.14 ଟଙ୍କା ଦେଲି।"] {
			let tokenized = IndicTokenizer.tokenize(text);
			assert_eq!(IndicTokenizer.detokenize(&tokenized), text);
		}
	}
}
