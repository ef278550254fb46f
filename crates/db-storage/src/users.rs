//! Contains the user specific database structs and queries
use crate::schema::users;
use database::{DbConnection, Result};
use diesel::prelude::*;
use diesel::{ExpressionMethods, QueryDsl, Queryable, RunQueryDsl};
use serde::Serialize;

diesel_newtype!(UserId);

/// A user known to the service
///
/// Users are created on their first auth callback and addressed by email.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Identifiable, Serialize)]
#[table_name = "users"]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

impl User {
    /// Returns the user with the given id
    #[tracing::instrument(err, skip_all)]
    pub fn get(conn: &DbConnection, user_id: UserId) -> Result<User> {
        let query = users::table.filter(users::id.eq(user_id));

        let user = query.first(conn)?;

        Ok(user)
    }

    /// Returns all users ordered by their id
    #[tracing::instrument(err, skip_all)]
    pub fn get_all(conn: &DbConnection) -> Result<Vec<User>> {
        let query = users::table.order(users::id.asc());

        let users = query.load(conn)?;

        Ok(users)
    }
}

/// Diesel insertable user struct
#[derive(Debug, Insertable)]
#[table_name = "users"]
pub struct NewUser {
    pub name: String,
    pub email: String,
}

impl NewUser {
    /// Inserts the user, refreshing the display name when the email is already known
    ///
    /// The row id stays stable across repeated logins with the same email.
    #[tracing::instrument(err, skip_all)]
    pub fn upsert_by_email(self, conn: &DbConnection) -> Result<User> {
        let query = diesel::insert_into(users::table)
            .values(&self)
            .on_conflict(users::email)
            .do_update()
            .set(users::name.eq(&self.name));

        let user = query.get_result(conn)?;

        Ok(user)
    }
}
