mod client;
mod phone;
mod query;

pub use client::{Client, ClientUpdate, NewClient};
pub use phone::Phone;
pub use query::{ClientFilter, ClientQuery, FindResult};
