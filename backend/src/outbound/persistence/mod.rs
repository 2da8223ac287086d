//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the channel and ledger repository ports,
//! backed by `diesel-async` with `bb8` pooling. Row structs (`models.rs`) and
//! table definitions (`schema.rs`) stay private to this module; adapters only
//! translate between them and domain types.
//!
//! # Example
//!
//! ```no_run
//! # async fn wire() -> Result<(), Box<dyn std::error::Error>> {
//! use moneysaver::outbound::persistence::{
//!     DbPool, DieselChannelRepository, DieselLedgerRepository, PoolConfig,
//!     run_pending_migrations,
//! };
//!
//! let url = "postgres://localhost/moneysaver";
//! run_pending_migrations(url).await?;
//! let pool = DbPool::new(PoolConfig::new(url)).await?;
//! let channels = DieselChannelRepository::new(pool.clone());
//! let ledger = DieselLedgerRepository::new(pool);
//! # let _ = (channels, ledger);
//! # Ok(())
//! # }
//! ```

mod diesel_channel_repository;
mod diesel_ledger_repository;
mod error_mapping;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_channel_repository::DieselChannelRepository;
pub use diesel_ledger_repository::DieselLedgerRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
