use sqlx::PgConnection;

use crate::error::Result;

const CREATE_CLIENTS: &str = r#"
    CREATE TABLE IF NOT EXISTS clients (
        id SERIAL PRIMARY KEY,
        first_name VARCHAR(255) NOT NULL,
        last_name VARCHAR(255) NOT NULL,
        email VARCHAR(255) UNIQUE NOT NULL
    )
"#;

// client_id has no ON DELETE CASCADE; delete_client removes phones first.
const CREATE_PHONES: &str = r#"
    CREATE TABLE IF NOT EXISTS phones (
        id SERIAL PRIMARY KEY,
        client_id INTEGER NOT NULL REFERENCES clients(id),
        phone VARCHAR(255) UNIQUE NOT NULL
    )
"#;

/// Create both tables if they are missing
pub(crate) async fn create(conn: &mut PgConnection) -> Result<()> {
    sqlx::query(CREATE_CLIENTS).execute(&mut *conn).await?;
    sqlx::query(CREATE_PHONES).execute(&mut *conn).await?;

    Ok(())
}
