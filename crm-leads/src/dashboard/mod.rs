use axum::response::Html;

const INDEX_HTML: &str = include_str!("index.html");

/// The single-page lead dashboard. It talks only to `/api/leads`.
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}
