mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use sqlx::{Connection, PgConnection};
use tracing::{info, warn};

use client_book::{
    config, db, logging, Client, ClientQuery, ClientRepository, ClientUpdate, FindResult,
    NewClient,
};

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = config::init(cli.database_url.clone())?;
    logging::init(config.log_format);

    // The connection lives for the whole command and is closed on every path
    let mut conn = db::connect(&config)
        .await
        .context("failed to connect to the database")?;
    info!("database connection established");

    let result = run(&mut conn, cli.command).await;
    let closed = conn.close().await;

    settle(result, closed)
}

/// Combine the command outcome with the close outcome. A command error is
/// never replaced by a close error.
fn settle(result: Result<()>, closed: Result<(), sqlx::Error>) -> Result<()> {
    match (result, closed) {
        (Ok(()), Ok(())) => Ok(()),
        (Ok(()), Err(err)) => Err(err).context("failed to close the database connection"),
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(close_err)) => {
            warn!(error = %close_err, "failed to close the database connection");
            Err(err)
        }
    }
}

async fn run(conn: &mut PgConnection, command: Command) -> Result<()> {
    let mut repo = ClientRepository::new(conn);

    match command {
        Command::Init => {
            repo.initialize_schema().await?;
            println!("Schema ready");
        }
        Command::AddClient {
            first_name,
            last_name,
            email,
            phones,
        } => {
            let client = cli::new_client(first_name, last_name, email, phones);
            let id = repo.add_client(&client).await?;
            println!("{id}");
        }
        Command::AddPhone { client_id, phone } => {
            let id = repo.add_phone(client_id, &phone).await?;
            println!("{id}");
        }
        Command::UpdateClient {
            client_id,
            first_name,
            last_name,
            email,
            phones,
        } => {
            let update = cli::client_update(first_name, last_name, email, phones);
            repo.update_client(client_id, &update).await?;
        }
        Command::DeletePhone { client_id, phone } => {
            repo.delete_phone(client_id, &phone).await?;
        }
        Command::DeleteClient { client_id } => {
            repo.delete_client(client_id).await?;
        }
        Command::Find(args) => match repo.find_clients(&ClientQuery::from(args)).await? {
            FindResult::NoFilter => {
                anyhow::bail!("give one of --first-name, --last-name, --email or --phone")
            }
            FindResult::Clients(clients) => {
                for client in clients {
                    println!("{client}");
                }
            }
        },
        Command::List => {
            for client in repo.list_clients().await? {
                print_with_phones(&mut repo, &client).await?;
            }
        }
        Command::Demo => demo(&mut repo).await?,
    }

    Ok(())
}

async fn print_with_phones(repo: &mut ClientRepository<'_>, client: &Client) -> Result<()> {
    let phones: Vec<String> = repo
        .phones_of(client.id)
        .await?
        .into_iter()
        .map(|p| p.phone)
        .collect();

    println!("{client} [{}]", phones.join(", "));
    Ok(())
}

/// Walk through every operation once, printing the client before deleting it
async fn demo(repo: &mut ClientRepository<'_>) -> Result<()> {
    repo.initialize_schema().await?;

    let john = NewClient::new("John", "Doe", "john.doe@example.com")
        .with_phones(["555-1234", "555-5678"]);
    let id = repo.add_client(&john).await?;

    repo.add_phone(id, "555-9999").await?;
    repo.update_client(
        id,
        &ClientUpdate::new()
            .last_name("Smith")
            .email("john.smith@example.com"),
    )
    .await?;
    repo.delete_phone(id, "555-1234").await?;

    let found = repo
        .find_clients(&ClientQuery::new().last_name("Smith"))
        .await?
        .into_clients()
        .unwrap_or_default();
    for client in &found {
        print_with_phones(repo, client).await?;
    }

    repo.delete_client(id).await?;
    println!("Deleted client {id}");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn closed_badly() -> Result<(), sqlx::Error> {
        Err(sqlx::Error::Protocol("connection reset".into()))
    }

    #[test]
    fn command_error_survives_close_error() {
        let err = settle(Err(anyhow::anyhow!("duplicate email")), closed_badly()).unwrap_err();
        assert_eq!(err.to_string(), "duplicate email");
    }

    #[test]
    fn close_error_reported_after_success() {
        let err = settle(Ok(()), closed_badly()).unwrap_err();
        assert_eq!(err.to_string(), "failed to close the database connection");
    }

    #[test]
    fn clean_exit() {
        assert!(settle(Ok(()), Ok(())).is_ok());
    }
}
