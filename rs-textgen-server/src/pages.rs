use minijinja::{AutoEscape, Environment, context};
use serde::Serialize;

use rs_textgen_core::model::generator::GenerationResult;

const GENERATE_TEMPLATE: &str = "generate.html";

/// Per-field validation errors of the form.
#[derive(Serialize, Default, Debug)]
pub struct FormErrors {
	pub prefix: Option<&'static str>,
	pub max_words: Option<&'static str>,
}

impl FormErrors {
	pub fn is_empty(&self) -> bool {
		self.prefix.is_none() && self.max_words.is_none()
	}
}

/// HTML pages served by the form endpoints.
///
/// Every template is rendered with HTML auto-escaping, whatever its name.
pub struct Pages {
	env: Environment<'static>,
}

impl Pages {
	/// Compiles the embedded templates.
	///
	/// # Errors
	/// Returns an error if a template has invalid syntax.
	pub fn new() -> Result<Self, minijinja::Error> {
		let mut env = Environment::new();
		env.set_auto_escape_callback(|_| AutoEscape::Html);
		env.add_template(GENERATE_TEMPLATE, include_str!("../templates/generate.html"))?;
		Ok(Self { env })
	}

	/// Renders the form, echoing the submitted fields, with the result below it.
	pub fn generate_page(
		&self,
		prefix: &str,
		max_words: &str,
		errors: &FormErrors,
		result: Option<&GenerationResult>,
	) -> Result<String, minijinja::Error> {
		self.env.get_template(GENERATE_TEMPLATE)?.render(context! {
			prefix => prefix,
			max_words => max_words,
			errors => errors,
			result => result,
		})
	}
}
