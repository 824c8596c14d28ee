use sqlx::{Connection, PgConnection};

use crate::config::Config;
use crate::error::Result;

mod clients;
mod schema;

pub use clients::ClientRepository;

/// Open a single connection to the database.
///
/// The caller owns the connection and is responsible for closing it.
pub async fn connect(config: &Config) -> Result<PgConnection> {
    let conn = PgConnection::connect(config.database_url()).await?;

    Ok(conn)
}
