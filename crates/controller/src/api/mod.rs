//! The HTTP surface, REST endpoints and the GraphQL graph

pub mod graphql;
pub mod v1;
