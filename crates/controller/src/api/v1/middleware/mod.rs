//! Middleware guarding the v1 endpoints
pub mod token_auth;
