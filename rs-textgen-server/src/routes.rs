use std::path::PathBuf;

use actix_web::http::header::ContentType;
use actix_web::{HttpResponse, Responder, get, post, web};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use rs_textgen_core::io::{MODEL_EXTENSION, get_filename, list_files};
use rs_textgen_core::model::generator::Generator;

use crate::pages::{FormErrors, Pages};
use crate::response_log::ResponseLog;

/// State shared by every worker.
pub struct AppState {
	pub generator: Generator,
	pub pages: Pages,
	pub model_name: String,
	pub model_dir: PathBuf,
	pub response_log: Option<ResponseLog>,
	pub default_max_words: i64,
}

/// Fields of the HTML form, kept raw so that invalid input can be echoed back.
#[derive(Deserialize)]
struct GenerateForm {
	prefix: Option<String>,
	max_words: Option<String>,
}

/// Query parameters of `/v1/generate`.
#[derive(Deserialize)]
struct GenerateParams {
	prefix: Option<String>,
	max_words: Option<i64>,
	seed: Option<u64>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct ModelSummary {
	pub name: String,
	pub order: usize,
	pub vocabulary_size: usize,
	pub contexts: usize,
}

const FIELD_REQUIRED: &str = "This field is required.";
const NOT_AN_INTEGER: &str = "Not a valid integer value.";

/// Registers every endpoint.
pub fn configure(cfg: &mut web::ServiceConfig) {
	cfg.service(get_form)
		.service(post_form)
		.service(get_generated)
		.service(get_model)
		.service(get_models);
}

/// HTTP GET endpoint `/generate`
///
/// Renders the empty form.
#[get("/generate")]
async fn get_form(data: web::Data<AppState>) -> impl Responder {
	let max_words = data.default_max_words.to_string();
	html_page(data.pages.generate_page(" ", &max_words, &FormErrors::default(), None))
}

/// HTTP POST endpoint `/generate`
///
/// Validates the form, generates, logs the request and renders the form
/// again with the result below it.
#[post("/generate")]
async fn post_form(data: web::Data<AppState>, form: web::Form<GenerateForm>) -> impl Responder {
	let form = form.into_inner();
	let raw_prefix = form.prefix.unwrap_or_default();
	let raw_max_words = form.max_words.unwrap_or_default();

	let mut errors = FormErrors::default();
	if raw_prefix.is_empty() {
		errors.prefix = Some(FIELD_REQUIRED);
	}
	let max_words = if raw_max_words.is_empty() {
		errors.max_words = Some(FIELD_REQUIRED);
		None
	} else {
		match raw_max_words.trim().parse::<i64>() {
			Ok(n) => Some(n),
			Err(_) => {
				errors.max_words = Some(NOT_AN_INTEGER);
				None
			}
		}
	};

	let result = match max_words {
		Some(max_words) if errors.is_empty() => {
			match data.generator.generate(raw_prefix.trim(), max_words, &mut rand::rng()) {
				Ok(result) => Some(result),
				Err(e) => {
					error!(error = %e, prefix = %raw_prefix, "generation aborted");
					return HttpResponse::InternalServerError().body(e.to_string());
				}
			}
		}
		_ => None,
	};

	if let (Some(result), Some(log)) = (&result, &data.response_log) {
		log.record_request(&raw_prefix, &raw_max_words, result).await;
	}

	html_page(data.pages.generate_page(&raw_prefix, &raw_max_words, &errors, result.as_ref()))
}

/// HTTP GET endpoint `/v1/generate`
///
/// Returns the `GenerationResult` as JSON. A `seed` makes the answer
/// reproducible.
#[get("/v1/generate")]
async fn get_generated(data: web::Data<AppState>, query: web::Query<GenerateParams>) -> impl Responder {
	let prefix = query.prefix.as_deref().unwrap_or("").trim();
	let max_words = query.max_words.unwrap_or(data.default_max_words);

	let generated = match query.seed {
		Some(seed) => data.generator.generate(prefix, max_words, &mut StdRng::seed_from_u64(seed)),
		None => data.generator.generate(prefix, max_words, &mut rand::rng()),
	};

	match generated {
		Ok(result) => {
			debug!(rejected = result.is_rejected(), "generation served");
			HttpResponse::Ok().json(result)
		}
		Err(e) => {
			error!(error = %e, prefix = %prefix, "generation aborted");
			HttpResponse::InternalServerError().body(e.to_string())
		}
	}
}

/// HTTP GET endpoint `/v1/model`
#[get("/v1/model")]
async fn get_model(data: web::Data<AppState>) -> impl Responder {
	let model = data.generator.model();
	HttpResponse::Ok().json(ModelSummary {
		name: data.model_name.clone(),
		order: model.order(),
		vocabulary_size: model.vocabulary().len(),
		contexts: model.context_count(),
	})
}

/// HTTP GET endpoint `/v1/models`
///
/// Lists the model files found next to the served model.
#[get("/v1/models")]
async fn get_models(data: web::Data<AppState>) -> impl Responder {
	match list_files(&data.model_dir, MODEL_EXTENSION) {
		Ok(files) => {
			let names: Vec<String> = files.iter().filter_map(|file| get_filename(file).ok()).collect();
			HttpResponse::Ok().body(names.join("\n"))
		}
		Err(_) => HttpResponse::InternalServerError().body("Failed to list models"),
	}
}

fn html_page(rendered: Result<String, minijinja::Error>) -> HttpResponse {
	match rendered {
		Ok(body) => HttpResponse::Ok().content_type(ContentType::html()).body(body),
		Err(e) => {
			error!(error = %e, "failed to render page");
			HttpResponse::InternalServerError().body("Failed to render page")
		}
	}
}
