//! Client and phone record management over PostgreSQL.
//!
//! [`db::ClientRepository`] borrows a caller-owned [`sqlx::PgConnection`]
//! and exposes schema creation plus the client/phone operations.

pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;

pub use db::ClientRepository;
pub use error::{RepoError, Result};
pub use models::{Client, ClientFilter, ClientQuery, ClientUpdate, FindResult, NewClient, Phone};
