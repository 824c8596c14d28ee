use sqlx::{Connection, PgConnection, Postgres, Transaction};
use tracing::{debug, info, warn};

use super::schema;
use crate::error::{RepoError, Result};
use crate::models::{Client, ClientFilter, ClientQuery, ClientUpdate, FindResult, NewClient, Phone};

/// Client and phone operations over a borrowed connection.
///
/// The repository never opens or closes the connection. Operations that
/// issue more than one write run in a single transaction which is rolled
/// back before the error is returned.
pub struct ClientRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> ClientRepository<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    /// Create the `clients` and `phones` tables if they do not exist yet
    #[tracing::instrument(skip(self))]
    pub async fn initialize_schema(&mut self) -> Result<()> {
        let mut tx = self.conn.begin().await?;
        let outcome = schema::create(&mut *tx).await;
        finish(tx, outcome).await?;

        debug!("schema ready");
        Ok(())
    }

    /// Insert a client together with its phones, returning the new client id
    #[tracing::instrument(
        skip(self, client),
        fields(email = %client.email, phones = client.phones.len())
    )]
    pub async fn add_client(&mut self, client: &NewClient) -> Result<i32> {
        let mut tx = self.conn.begin().await?;
        let outcome = insert_client(&mut *tx, client).await;
        let id = finish(tx, outcome).await?;

        info!(client_id = id, "client added");
        Ok(id)
    }

    /// Attach one phone number to an existing client, returning the phone id
    #[tracing::instrument(skip(self))]
    pub async fn add_phone(&mut self, client_id: i32, phone: &str) -> Result<i32> {
        let id = insert_phone(&mut *self.conn, client_id, phone).await?;

        info!(phone_id = id, "phone added");
        Ok(id)
    }

    /// Apply a partial update to a client.
    ///
    /// A non-empty phone list replaces every phone the client owns.
    #[tracing::instrument(skip(self, update))]
    pub async fn update_client(&mut self, client_id: i32, update: &ClientUpdate) -> Result<()> {
        let mut tx = self.conn.begin().await?;
        let outcome = apply_update(&mut *tx, client_id, update).await;
        finish(tx, outcome).await
    }

    /// Remove a phone number from a client. Missing rows are not an error.
    #[tracing::instrument(skip(self))]
    pub async fn delete_phone(&mut self, client_id: i32, phone: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM phones WHERE client_id = $1 AND phone = $2")
            .bind(client_id)
            .bind(phone)
            .execute(&mut *self.conn)
            .await?;

        if result.rows_affected() == 0 {
            debug!("no matching phone to delete");
        } else {
            info!("phone deleted");
        }

        Ok(())
    }

    /// Delete a client and every phone it owns
    #[tracing::instrument(skip(self))]
    pub async fn delete_client(&mut self, client_id: i32) -> Result<()> {
        let mut tx = self.conn.begin().await?;
        let outcome = remove_client(&mut *tx, client_id).await;
        finish(tx, outcome).await
    }

    /// Look up clients using the first non-empty filter of `query`
    #[tracing::instrument(skip(self))]
    pub async fn find_clients(&mut self, query: &ClientQuery) -> Result<FindResult> {
        match query.filter() {
            Some(filter) => Ok(FindResult::Clients(self.find_clients_by(&filter).await?)),
            None => {
                debug!("find called without a filter");
                Ok(FindResult::NoFilter)
            }
        }
    }

    /// Exact-match lookup.
    ///
    /// A phone lookup yields one row per matching phone.
    #[tracing::instrument(skip(self))]
    pub async fn find_clients_by(&mut self, filter: &ClientFilter) -> Result<Vec<Client>> {
        let (sql, value) = match filter {
            ClientFilter::FirstName(v) => (
                r#"
                SELECT id, first_name, last_name, email FROM clients
                WHERE first_name = $1 ORDER BY id
                "#,
                v,
            ),
            ClientFilter::LastName(v) => (
                r#"
                SELECT id, first_name, last_name, email FROM clients
                WHERE last_name = $1 ORDER BY id
                "#,
                v,
            ),
            ClientFilter::Email(v) => (
                "SELECT id, first_name, last_name, email FROM clients WHERE email = $1 ORDER BY id",
                v,
            ),
            ClientFilter::Phone(v) => (
                r#"
                SELECT c.id, c.first_name, c.last_name, c.email
                FROM clients c
                INNER JOIN phones p ON c.id = p.client_id
                WHERE p.phone = $1
                ORDER BY p.id
                "#,
                v,
            ),
        };

        let clients = sqlx::query_as::<_, Client>(sql)
            .bind(value)
            .fetch_all(&mut *self.conn)
            .await?;

        debug!(matches = clients.len(), "find finished");
        Ok(clients)
    }

    pub async fn get_client(&mut self, client_id: i32) -> Result<Client> {
        sqlx::query_as::<_, Client>(
            "SELECT id, first_name, last_name, email FROM clients WHERE id = $1",
        )
        .bind(client_id)
        .fetch_optional(&mut *self.conn)
        .await?
        .ok_or(RepoError::NotFound(client_id))
    }

    pub async fn list_clients(&mut self) -> Result<Vec<Client>> {
        let clients = sqlx::query_as::<_, Client>(
            "SELECT id, first_name, last_name, email FROM clients ORDER BY id ASC",
        )
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(clients)
    }

    /// Phones owned by a client, oldest first
    pub async fn phones_of(&mut self, client_id: i32) -> Result<Vec<Phone>> {
        let phones = sqlx::query_as::<_, Phone>(
            "SELECT id, client_id, phone FROM phones WHERE client_id = $1 ORDER BY id ASC",
        )
        .bind(client_id)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(phones)
    }
}

/// Commit on success, roll back on failure. A failed rollback is logged and
/// the operation error is returned.
async fn finish<T>(tx: Transaction<'_, Postgres>, outcome: Result<T>) -> Result<T> {
    match outcome {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(error = %rollback_err, "rollback failed");
            } else {
                debug!(error = %err, "transaction rolled back");
            }
            Err(err)
        }
    }
}

async fn insert_client(conn: &mut PgConnection, client: &NewClient) -> Result<i32> {
    let id = sqlx::query_scalar::<_, i32>(
        r#"
        INSERT INTO clients (first_name, last_name, email)
        VALUES ($1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(&client.first_name)
    .bind(&client.last_name)
    .bind(&client.email)
    .fetch_one(&mut *conn)
    .await?;

    for phone in &client.phones {
        insert_phone(conn, id, phone).await?;
    }

    Ok(id)
}

async fn insert_phone(conn: &mut PgConnection, client_id: i32, phone: &str) -> Result<i32> {
    let id = sqlx::query_scalar::<_, i32>(
        "INSERT INTO phones (client_id, phone) VALUES ($1, $2) RETURNING id",
    )
    .bind(client_id)
    .bind(phone)
    .fetch_one(&mut *conn)
    .await?;

    Ok(id)
}

async fn apply_update(
    conn: &mut PgConnection,
    client_id: i32,
    update: &ClientUpdate,
) -> Result<()> {
    if update.is_empty() {
        debug!("nothing to update");
        return Ok(());
    }

    if update.touches_client_row() {
        let result = sqlx::query(
            r#"
            UPDATE clients
            SET first_name = COALESCE($1, first_name),
                last_name = COALESCE($2, last_name),
                email = COALESCE($3, email)
            WHERE id = $4
            "#,
        )
        .bind(update.supplied_first_name())
        .bind(update.supplied_last_name())
        .bind(update.supplied_email())
        .bind(client_id)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            warn!("client not found, nothing updated");
        }
    }

    if let Some(phones) = update.supplied_phones() {
        let removed = sqlx::query("DELETE FROM phones WHERE client_id = $1")
            .bind(client_id)
            .execute(&mut *conn)
            .await?
            .rows_affected();

        for phone in phones {
            insert_phone(conn, client_id, phone).await?;
        }

        debug!(removed, added = phones.len(), "phones replaced");
    }

    info!("client updated");
    Ok(())
}

async fn remove_client(conn: &mut PgConnection, client_id: i32) -> Result<()> {
    let phones = sqlx::query("DELETE FROM phones WHERE client_id = $1")
        .bind(client_id)
        .execute(&mut *conn)
        .await?
        .rows_affected();

    let clients = sqlx::query("DELETE FROM clients WHERE id = $1")
        .bind(client_id)
        .execute(&mut *conn)
        .await?
        .rows_affected();

    if clients == 0 {
        warn!("client not found, nothing deleted");
    } else {
        info!(phones, "client deleted");
    }

    Ok(())
}
