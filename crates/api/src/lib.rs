//! HTTP API: server, routing, and the GraphQL schema.

pub mod app;
