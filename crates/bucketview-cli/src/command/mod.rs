//! Subcommand implementations.

mod query;
mod schema;

pub use query::query;
pub use schema::schema;
