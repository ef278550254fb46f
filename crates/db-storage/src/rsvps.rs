//! Contains the RSVP database structs and queries
//!
//! An RSVP always belongs to exactly one event of the remote event service,
//! referenced by `event_id`. The optional `user_id` links the RSVP to the
//! local user it was created by.
use crate::schema::{rsvps, users};
use crate::users::{User, UserId};
use database::{DbConnection, Result};
use diesel::prelude::*;
use diesel::{
    BelongingToDsl, ExpressionMethods, GroupedBy, Identifiable, Insertable, QueryDsl, Queryable,
    RunQueryDsl,
};
use serde::Serialize;

diesel_newtype!(RsvpId, EventId);

/// Diesel RSVP struct
///
/// Is used as a result in various queries. Represents a rsvps row
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Identifiable, Associations, Serialize)]
#[table_name = "rsvps"]
#[belongs_to(User, foreign_key = "user_id")]
pub struct Rsvp {
    pub id: RsvpId,
    pub event_id: EventId,
    pub event_name: String,
    pub name: String,
    pub email: String,
    pub status: String,
    pub user_id: Option<UserId>,
}

impl Rsvp {
    /// Returns the RSVP with the given id
    #[tracing::instrument(err, skip_all)]
    pub fn get(conn: &DbConnection, rsvp_id: RsvpId) -> Result<Rsvp> {
        let query = rsvps::table.filter(rsvps::id.eq(rsvp_id));

        let rsvp = query.first(conn)?;

        Ok(rsvp)
    }

    /// Returns a page of the RSVPs of one event, ordered by their id
    #[tracing::instrument(err, skip_all, fields(skip = skip, limit = limit))]
    pub fn get_for_event_paginated(
        conn: &DbConnection,
        event_id: EventId,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Rsvp>> {
        let query = rsvps::table
            .filter(rsvps::event_id.eq(event_id))
            .order(rsvps::id.asc())
            .offset(skip)
            .limit(limit);

        let rsvps = query.load(conn)?;

        Ok(rsvps)
    }

    /// Returns the RSVP with the given id together with its user, if any
    #[tracing::instrument(err, skip_all)]
    pub fn get_with_user(conn: &DbConnection, rsvp_id: RsvpId) -> Result<(Rsvp, Option<User>)> {
        let query = rsvps::table
            .left_join(users::table)
            .filter(rsvps::id.eq(rsvp_id));

        let rsvp_with_user = query.first(conn)?;

        Ok(rsvp_with_user)
    }

    /// Returns all RSVPs with their user eagerly joined, ordered by id
    #[tracing::instrument(err, skip_all)]
    pub fn get_all_with_users(conn: &DbConnection) -> Result<Vec<(Rsvp, Option<User>)>> {
        let query = rsvps::table.left_join(users::table).order(rsvps::id.asc());

        let rsvps_with_users = query.load(conn)?;

        Ok(rsvps_with_users)
    }

    /// Returns the RSVPs of each of the given users
    ///
    /// The returned vector contains one entry per user, in the same order.
    #[tracing::instrument(err, skip_all)]
    pub fn get_for_users(conn: &DbConnection, users: &[User]) -> Result<Vec<Vec<Rsvp>>> {
        let rsvps = Rsvp::belonging_to(users)
            .order(rsvps::id.asc())
            .load::<Rsvp>(conn)?
            .grouped_by(users);

        Ok(rsvps)
    }

    /// Deletes the RSVP with the given id, returning the deleted row
    #[tracing::instrument(err, skip_all)]
    pub fn delete_by_id(conn: &DbConnection, rsvp_id: RsvpId) -> Result<Rsvp> {
        let query = diesel::delete(rsvps::table.filter(rsvps::id.eq(rsvp_id)))
            .returning(rsvps::all_columns);

        let rsvp = query.get_result(conn)?;

        Ok(rsvp)
    }
}

/// Diesel insertable RSVP struct
///
/// Represents fields that have to be provided on insertion.
#[derive(Debug, Insertable)]
#[table_name = "rsvps"]
pub struct NewRsvp {
    pub event_id: EventId,
    pub event_name: String,
    pub name: String,
    pub email: String,
    pub status: String,
    pub user_id: Option<UserId>,
}

impl NewRsvp {
    #[tracing::instrument(err, skip_all)]
    pub fn insert(self, conn: &DbConnection) -> Result<Rsvp> {
        let query = self.insert_into(rsvps::table);

        let rsvp = query.get_result(conn)?;

        Ok(rsvp)
    }
}

/// Diesel RSVP changeset
///
/// Every field is mandatory, applying it replaces the full mutable state of
/// the row. The event reference and user link are not part of it.
#[derive(Debug, AsChangeset)]
#[table_name = "rsvps"]
pub struct UpdateRsvp {
    pub event_name: String,
    pub name: String,
    pub email: String,
    pub status: String,
}

impl UpdateRsvp {
    #[tracing::instrument(err, skip_all)]
    pub fn apply(self, conn: &DbConnection, rsvp_id: RsvpId) -> Result<Rsvp> {
        let query = diesel::update(rsvps::table)
            .filter(rsvps::id.eq(rsvp_id))
            .set(self)
            .returning(rsvps::all_columns);

        let rsvp = query.get_result(conn)?;

        Ok(rsvp)
    }
}
