use crate::{DatabaseError, DbConnection, Result};
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::PgConnection;
use std::time::Duration;

/// Db container that uses a connection pool to hand out connections
pub struct Db {
    pool: Pool<ConnectionManager<PgConnection>>,
}

impl Db {
    /// Creates a new Db instance from the given postgres url
    #[tracing::instrument(skip(db_url))]
    pub fn connect_url(db_url: &str, max_conns: u32, min_idle: Option<u32>) -> Result<Self> {
        let manager = ConnectionManager::<PgConnection>::new(db_url);

        let pool = Pool::builder()
            .max_size(max_conns)
            .min_idle(min_idle)
            .connection_timeout(Duration::from_secs(10))
            .build(manager)
            .map_err(|e| {
                log::error!("Failed to create the database connection pool, {}", e);
                DatabaseError::R2D2Error(e.to_string())
            })?;

        Ok(Self { pool })
    }

    /// Returns an owned connection from the pool
    #[tracing::instrument(skip(self))]
    pub fn get_conn(&self) -> Result<DbConnection> {
        self.pool.get().map_err(|e| {
            let msg = format!(
                "Unable to get a connection from the pool, error: {}, pool state: {:?}",
                e,
                self.pool.state()
            );
            log::error!("{}", msg);
            DatabaseError::R2D2Error(msg)
        })
    }
}
