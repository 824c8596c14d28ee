use clap::{Args, Parser, Subcommand};

use client_book::{ClientQuery, ClientUpdate, NewClient};

/// Manage clients and their phone numbers
#[derive(Debug, Parser)]
#[command(name = "client-book", version)]
pub struct Cli {
    /// Overrides DATABASE_URL from the environment
    #[arg(long, global = true)]
    pub database_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create the clients and phones tables
    Init,
    /// Add a client, optionally with phone numbers
    AddClient {
        first_name: String,
        last_name: String,
        email: String,
        /// May be repeated
        #[arg(long = "phone")]
        phones: Vec<String>,
    },
    /// Attach a phone number to a client
    AddPhone { client_id: i32, phone: String },
    /// Change a client's fields; --phone replaces all phones
    UpdateClient {
        client_id: i32,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long = "phone")]
        phones: Vec<String>,
    },
    /// Remove one phone number from a client
    DeletePhone { client_id: i32, phone: String },
    /// Remove a client and all its phones
    DeleteClient { client_id: i32 },
    /// Find clients by the first given filter
    Find(FindArgs),
    /// Print every client with its phones
    List,
    /// Run the sample scenario against an initialized database
    Demo,
}

#[derive(Debug, Args)]
pub struct FindArgs {
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
}

impl From<FindArgs> for ClientQuery {
    fn from(args: FindArgs) -> Self {
        ClientQuery {
            first_name: args.first_name,
            last_name: args.last_name,
            email: args.email,
            phone: args.phone,
        }
    }
}

pub fn new_client(
    first_name: String,
    last_name: String,
    email: String,
    phones: Vec<String>,
) -> NewClient {
    NewClient {
        first_name,
        last_name,
        email,
        phones,
    }
}

pub fn client_update(
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
    phones: Vec<String>,
) -> ClientUpdate {
    ClientUpdate {
        first_name,
        last_name,
        email,
        phones: (!phones.is_empty()).then_some(phones),
    }
}
