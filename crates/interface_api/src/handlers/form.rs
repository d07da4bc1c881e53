//! Intake form page

use axum::response::Html;

const INTAKE_FORM: &str = include_str!("../../static/index.html");

/// Serves the claim intake form
pub async fn intake_form() -> Html<&'static str> {
    Html(INTAKE_FORM)
}
