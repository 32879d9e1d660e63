use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use clap::Parser;
use tracing::{error, info};

use rs_textgen_core::io::{get_filename, load_model, parent_folder};
use rs_textgen_core::model::generator::{GenerationOptions, Generator};

mod config;
mod pages;
mod response_log;
mod routes;

use config::ServerConfig;
use pages::Pages;
use response_log::ResponseLog;
use routes::AppState;

/// Main entry point for the server.
///
/// Loads the n-gram model once, shares it read-only between the workers
/// and starts an Actix-web HTTP server.
#[actix_web::main]
async fn main() -> io::Result<()> {
	let config = ServerConfig::parse();
	tracing_subscriber::fmt().with_max_level(config.log_level).init();

	let response_log = config.response_log_path().map(ResponseLog::new);
	if let Some(log) = &response_log {
		log.record_startup("ngram");
	}

	info!(path = %config.model.display(), "loading ngram language model");
	let model = match load_model(&config.model) {
		Ok(model) => model,
		Err(e) => {
			error!(path = %config.model.display(), error = %e, "failed to load model");
			return Err(io::Error::other(e));
		}
	};

	let generator = Generator::new(Arc::new(model)).with_options(GenerationOptions {
		max_steps: config.max_steps,
	});
	let pages = Pages::new().map_err(io::Error::other)?;
	let state = web::Data::new(AppState {
		generator,
		pages,
		model_name: get_filename(&config.model)?,
		model_dir: parent_folder(&config.model),
		response_log,
		default_max_words: config.default_max_words,
	});

	info!(host = %config.host, port = config.port, workers = config.workers, "starting server");
	HttpServer::new(move || {
		App::new()
			.wrap(Cors::permissive())
			.app_data(state.clone())
			.configure(routes::configure)
	})
		.workers(config.workers)
		.bind((config.host.as_str(), config.port))?
		.run()
		.await
}
