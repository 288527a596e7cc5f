pub mod graphql;
pub mod system;
