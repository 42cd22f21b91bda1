//! `forgekit-db` — Postgres access for the kit.
//!
//! A generic single-table helper ([`repository`]) plus the concrete
//! [`store::UserStore`] the routes use. SQL beyond simple per-table
//! statements is out of scope here; anything richer belongs in hand-written
//! queries.

pub mod error;
pub mod pool;
pub mod repository;
pub mod schema;
pub mod store;

pub use error::DbError;
pub use pool::{MIGRATOR, connect_lazy};
pub use repository::{ColumnValues, Entity, Filter, FindOptions, Repository, SqlValue};
pub use schema::users::{User, UserPatch};
pub use store::{InMemoryUserStore, UserStore};

pub use sqlx::PgPool;
