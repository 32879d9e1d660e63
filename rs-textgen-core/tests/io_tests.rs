use std::collections::{BTreeMap, HashMap};
use std::fs;

use serde::Serialize;
use tempfile::TempDir;

use rs_textgen_core::error::ModelError;
use rs_textgen_core::io::{append_to_file, get_filename, list_files, load_model, save_model};
use rs_textgen_core::model::ngram_model::{BOS, EOS, NGramModel};
use rs_textgen_core::model::state::State;

/// Same wire shape as `NGramModel`, without its invariants.
#[derive(Serialize)]
struct RawModel {
	order: usize,
	vocabulary: Vec<String>,
	states: HashMap<Vec<String>, RawState>,
}

#[derive(Serialize)]
struct RawState {
	transitions: BTreeMap<String, u64>,
	total: u64,
}

fn sample_model() -> NGramModel {
	let counts = vec![
		(vec![BOS.to_owned()], State::from_counts([("ଘର", 2), ("ଭଲ", 1)]).unwrap()),
		(vec!["ଘର".to_owned()], State::from_counts([(EOS, 1)]).unwrap()),
	];
	NGramModel::from_counts(2, ["ଭଲ", "ଘର"], counts).unwrap()
}

fn write_raw(dir: &TempDir, name: &str, raw: &RawModel) -> std::path::PathBuf {
	let path = dir.path().join(name);
	fs::write(&path, postcard::to_stdvec(raw).unwrap()).unwrap();
	path
}

#[test]
fn test_save_then_load() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("ngram.lm.bin");
	let model = sample_model();

	save_model(&model, &path).unwrap();
	let loaded = load_model(&path).unwrap();

	assert_eq!(loaded, model);
	assert_eq!(loaded.order(), 2);
}

#[test]
fn test_load_missing_file() {
	let dir = tempfile::tempdir().unwrap();
	assert!(matches!(load_model(dir.path().join("absent.bin")), Err(ModelError::Io(_))));
}

#[test]
fn test_load_garbage() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("garbage.bin");
	fs::write(&path, [0xff, 0xff, 0xff]).unwrap();
	assert!(matches!(load_model(&path), Err(ModelError::Postcard(_))));
}

#[test]
fn test_load_rejects_total_mismatch() {
	let dir = tempfile::tempdir().unwrap();
	let mut states = HashMap::new();
	states.insert(
		vec![BOS.to_owned()],
		RawState {
			transitions: BTreeMap::from([("a".to_owned(), 2)]),
			total: 3,
		},
	);
	let raw = RawModel {
		order: 2,
		vocabulary: vec!["a".to_owned()],
		states,
	};
	let path = write_raw(&dir, "mismatch.bin", &raw);

	assert!(matches!(
		load_model(&path),
		Err(ModelError::TotalMismatch { total: 3, sum: 2, .. })
	));
}

#[test]
fn test_load_sorts_vocabulary() {
	let dir = tempfile::tempdir().unwrap();
	let raw = RawModel {
		order: 3,
		vocabulary: vec!["z".to_owned(), "a".to_owned(), "m".to_owned()],
		states: HashMap::new(),
	};
	let path = write_raw(&dir, "unsorted.bin", &raw);

	let model = load_model(&path).unwrap();
	assert_eq!(model.vocabulary(), &["a", "m", "z"]);
	assert!(model.contains("z"));
}

#[test]
fn test_load_rejects_zero_order() {
	let dir = tempfile::tempdir().unwrap();
	let raw = RawModel {
		order: 0,
		vocabulary: vec!["a".to_owned()],
		states: HashMap::new(),
	};
	let path = write_raw(&dir, "zero.bin", &raw);
	assert!(matches!(load_model(&path), Err(ModelError::ZeroOrder(0))));
}

#[test]
fn test_deserialize_validates_model() {
	let raw = RawModel {
		order: 0,
		vocabulary: Vec::new(),
		states: HashMap::new(),
	};
	let bytes = postcard::to_stdvec(&raw).unwrap();
	assert!(postcard::from_bytes::<NGramModel>(&bytes).is_err());

	let raw = RawModel {
		order: 2,
		vocabulary: vec!["b".to_owned(), "a".to_owned()],
		states: HashMap::new(),
	};
	let bytes = postcard::to_stdvec(&raw).unwrap();
	let model = postcard::from_bytes::<NGramModel>(&bytes).unwrap();
	assert_eq!(model.vocabulary(), &["a", "b"]);
	assert_eq!(model.context_len(), 1);
}

#[test]
fn test_list_files_filters_extension() {
	let dir = tempfile::tempdir().unwrap();
	fs::write(dir.path().join("odia.bin"), b"").unwrap();
	fs::write(dir.path().join("english.bin"), b"").unwrap();
	fs::write(dir.path().join("notes.txt"), b"").unwrap();
	fs::create_dir(dir.path().join("nested.bin")).unwrap();

	assert_eq!(list_files(dir.path(), "bin").unwrap(), vec!["english.bin", "odia.bin"]);
}

#[test]
fn test_append_creates_parent_folder() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("responses").join("generate_logs.txt");

	append_to_file(&path, "first\n").unwrap();
	append_to_file(&path, "second\n").unwrap();

	assert_eq!(fs::read_to_string(&path).unwrap(), "first\nsecond\n");
}

#[test]
fn test_get_filename() {
	assert_eq!(get_filename("./data/ngram.bin").unwrap(), "ngram");
	assert_eq!(get_filename("odia.bin").unwrap(), "odia");
}
