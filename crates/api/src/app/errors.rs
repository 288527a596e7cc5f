use async_graphql::{Error, ErrorExtensions};

use crm_core::DomainError;
use crm_products::{StoreError, UpdateError};

use crate::app::services::ServiceError;

pub fn service_error_to_graphql(err: ServiceError) -> Error {
    match err {
        ServiceError::Domain(e) => domain_error(e),
        ServiceError::Store(e) => store_error(e),
        ServiceError::Update(UpdateError::Domain(e)) => domain_error(e),
        ServiceError::Update(UpdateError::Store(e)) => store_error(e),
        ServiceError::Internal(msg) => graphql_error("INTERNAL", msg),
    }
}

fn domain_error(err: DomainError) -> Error {
    let code = match &err {
        DomainError::Validation(_) | DomainError::InvalidId(_) => "VALIDATION",
        DomainError::InvariantViolation(_) => "INVARIANT",
    };
    graphql_error(code, err.to_string())
}

fn store_error(err: StoreError) -> Error {
    let code = match &err {
        StoreError::Query(_) => "STORE_QUERY",
        StoreError::Persist { .. } => "STORE_PERSIST",
        StoreError::NotFound(_) => "NOT_FOUND",
    };
    graphql_error(code, err.to_string())
}

pub fn graphql_error(code: &'static str, message: impl Into<String>) -> Error {
    Error::new(message.into()).extend_with(|_, ext| ext.set("code", code))
}
