//! Top-level module for the n-gram generation system.
//!
//! - Fixed-order n-gram model (`NGramModel`)
//! - Per-context transition counts (`State`)
//! - Initial context window construction (`context`)
//! - The generation pipeline (`Generator`)

/// High-level interface for continuing a prefix with a single n-gram model.
///
/// Validates the request, builds the context window, runs the sampler loop
/// and post-processes the output.
pub mod generator;

/// Fixed-order n-gram model (`n >= 1`) over word tokens.
///
/// Holds the vocabulary and the sparse context -> transitions table.
pub mod ngram_model;

/// Initial context window and its sliding behaviour.
pub mod context;

/// Internal representation of a single observed context.
///
/// Tracks outgoing transitions and supports weighted random sampling.
pub mod state;
