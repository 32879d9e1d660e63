use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::env;

use tracing::info;

use crate::error::ModelError;
use crate::model::ngram_model::{NGramModel, RawNGramModel};

/// Extension of binary model files.
pub const MODEL_EXTENSION: &str = "bin";

/// Loads and validates a binary (`postcard`) model file.
///
/// # Errors
/// Returns an error if the file cannot be read or decoded, or if the decoded
/// model breaks an invariant.
pub fn load_model<P: AsRef<Path>>(filepath: P) -> Result<NGramModel, ModelError> {
	let bytes = fs::read(&filepath)?;
	// Decoded raw so that a broken invariant keeps its own error
	let raw: RawNGramModel = postcard::from_bytes(&bytes)?;
	let model = NGramModel::try_from(raw)?;

	info!(
		path = %filepath.as_ref().display(),
		order = model.order(),
		vocabulary = model.vocabulary().len(),
		contexts = model.context_count(),
		"n-gram model loaded"
	);
	Ok(model)
}

/// Writes a model as a binary (`postcard`) file.
pub fn save_model<P: AsRef<Path>>(model: &NGramModel, filepath: P) -> Result<(), ModelError> {
	let bytes = postcard::to_stdvec(model)?;
	fs::write(filepath, bytes)?;
	Ok(())
}

/// Appends `text` to a file, creating it (and its parent folder) if needed.
pub fn append_to_file<P: AsRef<Path>>(filepath: P, text: &str) -> io::Result<()> {
	let filepath = filepath.as_ref();
	if let Some(parent) = filepath.parent() {
		if !parent.as_os_str().is_empty() {
			fs::create_dir_all(parent)?;
		}
	}
	let mut file = OpenOptions::new().create(true).append(true).open(filepath)?;
	file.write_all(text.as_bytes())
}

/// Extracts the base filename without extension.
///
/// Examples:
/// - `"./data/model.bin"` → `"model"`
/// - `"model.bin"` → `"model"`
pub fn get_filename<P: AsRef<Path>>(input_path: P) -> io::Result<String> {
	let stem = input_path
		.as_ref()
		.file_stem()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Path has no filename"))?;

	Ok(stem.to_string_lossy().to_string())
}

/// Returns the folder holding `filepath`.
///
/// - A bare file name resolves to the current working directory
pub fn parent_folder<P: AsRef<Path>>(filepath: P) -> PathBuf {
	match filepath.as_ref().parent() {
		Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
		_ => env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
	}
}

/// Lists all files with a given extension in a directory.
///
/// Returns file names only (no paths), sorted.
pub fn list_files<P: AsRef<Path>>(dir: P, extension: &str) -> io::Result<Vec<String>> {
	let mut files = Vec::new();

	for entry in fs::read_dir(dir)? {
		let entry = entry?;
		let path = entry.path();

		if path.is_file() && path.extension() == Some(std::ffi::OsStr::new(extension)) {
			if let Some(name) = path.file_name() {
				files.push(name.to_string_lossy().to_string());
			}
		}
	}

	files.sort();
	Ok(files)
}
