//! Read side of the service as a GraphQL graph
//!
//! Only queries are exposed. Mutations go through the REST endpoints
//! so that the event counter sync and notification publishing stay in
//! one place.
use actix_web::route;
use actix_web::web::Data;
use async_graphql::{
    Context, EmptyMutation, EmptySubscription, Object, Result, Schema, SimpleObject,
};
use async_graphql_actix_web::{GraphQLRequest, GraphQLResponse};
use database::{Db, OptionalExt};
use db_storage::rsvps::{Rsvp, RsvpId};
use db_storage::users::{User, UserId};
use std::sync::Arc;

/// The service wide GraphQL schema type
pub type RsvpSchema = Schema<Query, EmptyMutation, EmptySubscription>;

/// Builds the schema with its database handle attached
pub fn build_schema(db: Arc<Db>) -> RsvpSchema {
    Schema::build(Query, EmptyMutation, EmptySubscription)
        .data(db)
        .finish()
}

/// An RSVP together with the user it belongs to
#[derive(Debug, SimpleObject)]
pub struct RsvpNode {
    id: i64,
    event_id: i64,
    event_name: String,
    name: String,
    email: String,
    status: String,
    user: Option<UserInfo>,
}

impl RsvpNode {
    fn new(rsvp: Rsvp, user: Option<UserInfo>) -> Self {
        Self {
            id: rsvp.id.into_inner(),
            event_id: rsvp.event_id.into_inner(),
            event_name: rsvp.event_name,
            name: rsvp.name,
            email: rsvp.email,
            status: rsvp.status,
            user,
        }
    }
}

/// A user without its RSVP relation, embedded in other nodes
#[derive(Debug, Clone, SimpleObject)]
pub struct UserInfo {
    id: i64,
    name: String,
    email: String,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self {
            id: user.id.into_inner(),
            name: user.name,
            email: user.email,
        }
    }
}

/// A user with all of its RSVPs eagerly loaded
#[derive(Debug, SimpleObject)]
pub struct UserNode {
    id: i64,
    name: String,
    email: String,
    rsvps: Vec<RsvpNode>,
}

impl UserNode {
    fn new(user: User, rsvps: Vec<Rsvp>) -> Self {
        let info = UserInfo::from(user);

        let rsvps = rsvps
            .into_iter()
            .map(|rsvp| RsvpNode::new(rsvp, Some(info.clone())))
            .collect();

        Self {
            id: info.id,
            name: info.name,
            email: info.email,
            rsvps,
        }
    }
}

/// Query root of the service graph
pub struct Query;

#[Object]
impl Query {
    /// All RSVPs with their user
    async fn rsvps(&self, ctx: &Context<'_>) -> Result<Vec<RsvpNode>> {
        let db = ctx.data::<Arc<Db>>()?.clone();

        let rows = crate::block(move || {
            let conn = db.get_conn()?;

            Rsvp::get_all_with_users(&conn)
        })
        .await??;

        Ok(rows
            .into_iter()
            .map(|(rsvp, user)| RsvpNode::new(rsvp, user.map(UserInfo::from)))
            .collect())
    }

    /// A single RSVP by its id
    async fn rsvp(&self, ctx: &Context<'_>, id: i64) -> Result<Option<RsvpNode>> {
        let db = ctx.data::<Arc<Db>>()?.clone();

        let row = crate::block(move || {
            let conn = db.get_conn()?;

            Rsvp::get_with_user(&conn, RsvpId::from(id)).optional()
        })
        .await??;

        Ok(row.map(|(rsvp, user)| RsvpNode::new(rsvp, user.map(UserInfo::from))))
    }

    /// All users with their RSVPs
    async fn users(&self, ctx: &Context<'_>) -> Result<Vec<UserNode>> {
        let db = ctx.data::<Arc<Db>>()?.clone();

        let rows = crate::block(move || -> database::Result<Vec<(User, Vec<Rsvp>)>> {
            let conn = db.get_conn()?;

            let users = User::get_all(&conn)?;
            let rsvps = Rsvp::get_for_users(&conn, &users)?;

            Ok(users.into_iter().zip(rsvps).collect())
        })
        .await??;

        Ok(rows
            .into_iter()
            .map(|(user, rsvps)| UserNode::new(user, rsvps))
            .collect())
    }

    /// A single user by its id
    async fn user(&self, ctx: &Context<'_>, id: i64) -> Result<Option<UserNode>> {
        let db = ctx.data::<Arc<Db>>()?.clone();

        let row = crate::block(move || -> database::Result<Option<(User, Vec<Rsvp>)>> {
            let conn = db.get_conn()?;

            let user = match User::get(&conn, UserId::from(id)).optional()? {
                Some(user) => user,
                None => return Ok(None),
            };

            let rsvps = Rsvp::get_for_users(&conn, std::slice::from_ref(&user))?
                .pop()
                .unwrap_or_default();

            Ok(Some((user, rsvps)))
        })
        .await??;

        Ok(row.map(|(user, rsvps)| UserNode::new(user, rsvps)))
    }
}

/// API Endpoint *GET/POST /graphql*
///
/// GET requests carry the query in the url, POST requests as a JSON body.
#[route("/graphql", method = "GET", method = "POST")]
pub async fn endpoint(schema: Data<RsvpSchema>, request: GraphQLRequest) -> GraphQLResponse {
    schema.execute(request.into_inner()).await.into()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn schema_exposes_the_read_only_graph() {
        let schema = Schema::build(Query, EmptyMutation, EmptySubscription).finish();

        let sdl = schema.sdl();

        assert!(sdl.contains("rsvps: [RsvpNode!]!"));
        assert!(sdl.contains("rsvp(id: Int!): RsvpNode"));
        assert!(sdl.contains("users: [UserNode!]!"));
        assert!(sdl.contains("user(id: Int!): UserNode"));
        assert!(!sdl.contains("type Mutation"));
    }
}
