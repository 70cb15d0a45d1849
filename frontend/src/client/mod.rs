//! HTTP clients for the backend API and the identity provider

pub mod backend;
pub mod keycloak;
pub mod oidc;
