use axum::response::Html;

const LANDING_PAGE: &str = include_str!("../../../assets/index.html");

/// Static landing page: GET /
pub async fn landing_page() -> Html<&'static str> {
    Html(LANDING_PAGE)
}
