//! HTTP API application wiring (Axum router + GraphQL schema).
//!
//! - `services.rs`: store wiring and the blocking bridge to the updater
//! - `schema.rs`: GraphQL query/mutation roots
//! - `routes/`: HTTP handlers
//! - `dto.rs`: GraphQL output types
//! - `errors.rs`: consistent GraphQL error codes

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod schema;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(services: services::AppServices) -> Router {
    let schema = schema::build_schema(services);

    Router::new()
        .route("/health", get(routes::system::health))
        .route(
            "/graphql",
            get(routes::graphql::graphiql).post(routes::graphql::execute),
        )
        .route(
            "/graphql/",
            get(routes::graphql::graphiql).post(routes::graphql::execute),
        )
        .layer(ServiceBuilder::new().layer(Extension(schema)))
}
