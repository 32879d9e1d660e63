//! N-gram-based text continuation library.
//!
//! This crate provides a word-level n-gram generation system including:
//! - A fixed-order n-gram model built from sparse frequency counts
//! - Context windowing over an arbitrary-length prefix
//! - Weighted sampling with a uniform fallback for unseen contexts
//! - A script-aware tokenizer/detokenizer pair
//! - Binary model storage
//!
//! The model is immutable once built and the random source is always passed
//! in by the caller, so a seeded generator gives reproducible output.

/// Core n-gram model and generation logic.
pub mod model;

/// Tokenization seam and the default Indic tokenizer.
pub mod text;

/// Model and generation errors.
pub mod error;

/// I/O utilities (model files, path helpers).
pub mod io;
