use async_graphql::http::GraphiQLSource;
use axum::{Json, extract::Extension, response::Html};

use crate::app::schema::CrmSchema;

/// GraphQL over JSON (`POST /graphql`).
pub async fn execute(
    Extension(schema): Extension<CrmSchema>,
    Json(request): Json<async_graphql::Request>,
) -> Json<async_graphql::Response> {
    Json(schema.execute(request).await)
}

/// Interactive explorer (`GET /graphql`).
pub async fn graphiql() -> Html<String> {
    Html(GraphiQLSource::build().endpoint("/graphql").finish())
}
