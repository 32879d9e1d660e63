use std::path::PathBuf;

use clap::Parser;
use rs_textgen_core::model::generator::DEFAULT_MAX_STEPS;
use tracing::Level;

/// Name of the request log inside `responses_dir`.
pub const RESPONSE_LOG_NAME: &str = "generate_logs.txt";

/// Command line configuration of the generation server.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Serve n-gram text generation over HTTP", long_about = None)]
pub struct ServerConfig {
	/// Binary n-gram model to serve
	#[arg(long, default_value = "ngram.lm.bin")]
	pub model: PathBuf,

	#[arg(long, default_value = "127.0.0.1")]
	pub host: String,

	#[arg(long, default_value_t = 31137)]
	pub port: u16,

	/// Folder receiving the request log
	#[arg(long, default_value = "responses")]
	pub responses_dir: PathBuf,

	/// Disable the request log
	#[arg(long, default_value_t = false)]
	pub no_response_log: bool,

	#[arg(long, default_value_t = num_cpus::get())]
	pub workers: usize,

	/// Sampling steps allowed before a generation is aborted
	#[arg(long, default_value_t = DEFAULT_MAX_STEPS)]
	pub max_steps: usize,

	/// Value pre-filled in the form
	#[arg(long, default_value_t = 50)]
	pub default_max_words: i64,

	#[arg(long, default_value_t = Level::INFO)]
	pub log_level: Level,
}

impl ServerConfig {
	/// Location of the request log, `None` when disabled.
	pub fn response_log_path(&self) -> Option<PathBuf> {
		if self.no_response_log {
			None
		} else {
			Some(self.responses_dir.join(RESPONSE_LOG_NAME))
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults() {
		let config = ServerConfig::parse_from(["rs-textgen-server"]);
		assert_eq!(config.model, PathBuf::from("ngram.lm.bin"));
		assert_eq!(config.port, 31137);
		assert_eq!(config.max_steps, DEFAULT_MAX_STEPS);
		assert_eq!(config.default_max_words, 50);
		assert_eq!(config.log_level, Level::INFO);
		assert_eq!(
			config.response_log_path(),
			Some(PathBuf::from("responses").join(RESPONSE_LOG_NAME))
		);
	}

	#[test]
	fn test_overrides() {
		let config = ServerConfig::parse_from([
			"rs-textgen-server",
			"--model",
			"data/odia.bin",
			"--port",
			"8080",
			"--no-response-log",
			"--log-level",
			"debug",
		]);
		assert_eq!(config.model, PathBuf::from("data/odia.bin"));
		assert_eq!(config.port, 8080);
		assert_eq!(config.log_level, Level::DEBUG);
		assert_eq!(config.response_log_path(), None);
	}
}
