#![allow(clippy::extra_unused_lifetimes)]

//! Database storage structs and queries of the RSVP service
//!
//! The models in here map directly onto the tables defined in
//! [`schema`](crate::schema) and carry all queries the API needs.
#[macro_use]
extern crate diesel;

#[macro_use]
mod macros;
mod schema;

pub mod migrations;
pub mod rsvps;
pub mod users;
