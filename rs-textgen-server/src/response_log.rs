use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use actix_web::web;
use rs_textgen_core::io::append_to_file;
use rs_textgen_core::model::generator::GenerationResult;
use tracing::warn;

/// Append-only text log of handled form submissions.
///
/// Writes are serialized so that entries from concurrent workers never
/// interleave. A failed write is reported and otherwise ignored.
#[derive(Debug, Clone)]
pub struct ResponseLog {
	path: PathBuf,
	lock: Arc<Mutex<()>>,
}

impl ResponseLog {
	pub fn new(path: PathBuf) -> Self {
		Self {
			path,
			lock: Arc::new(Mutex::new(())),
		}
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Called once before the server starts accepting requests.
	pub fn record_startup(&self, lm: &str) {
		self.append(&format!("\nstarting app with {lm} LM.. [{}]\n", timestamp()));
	}

	/// Appends one request block from the blocking thread pool.
	pub async fn record_request(&self, prefix: &str, max_words: &str, result: &GenerationResult) {
		let entry = format!(
			"\n\tNEW REQUEST @{}\n\
			\t[INPUTS] Prefix: {prefix}, Maximum number of words to generate: {max_words}\n\
			\t[OUTPUTS] Generation: {}, Message: {}\n",
			timestamp(),
			result.generation,
			result.message,
		);

		let log = self.clone();
		if let Err(e) = web::block(move || log.append(&entry)).await {
			warn!(path = %self.path.display(), error = %e, "response log write was cancelled");
		}
	}

	fn append(&self, text: &str) {
		let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
		if let Err(e) = append_to_file(&self.path, text) {
			warn!(path = %self.path.display(), error = %e, "failed to write response log");
		}
	}
}

fn timestamp() -> String {
	chrono::Local::now().format("%m/%d/%Y %H:%M:%S").to_string()
}
