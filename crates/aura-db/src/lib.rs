//! # aura-db: Store Layer for Aura POS
//!
//! Every read and write against the store, plus the [`SaleEngine`] that
//! turns `aura_core` plans into atomic batches.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Aura POS Data Flow                               │
//! │                                                                         │
//! │  Presentation layer (checkout, partners, dashboard)                    │
//! │       │                      ▲                                          │
//! │       ▼                      │ Notice / StoreChange                     │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     aura-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐    │   │
//! │  │   │  SaleEngine   │───►│  trait Store  │    │  AuraConfig  │    │   │
//! │  │   │  (engine.rs)  │    │  (store.rs)   │    │  (config.rs) │    │   │
//! │  │   └───────────────┘    └───────┬───────┘    └──────────────┘    │   │
//! │  │                          ┌─────┴──────┐                          │   │
//! │  │                          ▼            ▼                          │   │
//! │  │                   Database       MemoryStore                     │   │
//! │  │                   (pool.rs)      (memory.rs)                     │   │
//! │  │                   repositories                                   │   │
//! │  │                   migrations                                     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   ~/.local/share/aura-pos/aura.db                               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`store`] - The `Store` trait and change notifications
//! - [`pool`] - SQLite `Database` and its configuration
//! - [`memory`] - In-process `MemoryStore` with failure injection
//! - [`repository`] - SQL for products, sales and withdrawals
//! - [`migrations`] - Embedded database migrations
//! - [`engine`] - `SaleEngine`
//! - [`config`] - `AuraConfig` loading
//! - [`notice`] - Error to notification mapping
//! - [`error`] - Store and engine error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use aura_db::{AuraConfig, Database, SaleEngine};
//!
//! let config = AuraConfig::load(None)?;
//! let db = Database::new(config.db_config()).await?;
//! let engine = SaleEngine::with_options(db, config.profit_split()?, config.engine_options());
//!
//! let sale = engine.commit_sale(&mut cart, Some("Ana"), None).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod engine;
pub mod error;
pub mod memory;
pub mod migrations;
pub mod notice;
pub mod pool;
pub mod repository;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{AuraConfig, ConfigError, ConfigResult};
pub use engine::{EngineOptions, ReversalReport, SaleEngine};
pub use error::{DbError, DbResult, EngineError, EngineResult};
pub use memory::MemoryStore;
pub use notice::{Notice, NoticeCode, NoticeLevel};
pub use pool::{Database, DbConfig};
pub use store::{ChangeFeed, Collection, Store, StoreChange};

// Repository re-exports for convenience
pub use repository::product::ProductRepository;
pub use repository::sale::SaleRepository;
pub use repository::withdrawal::WithdrawalRepository;

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "info,aura=debug,sqlx=warn";

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=aura_db=trace` - Show trace for the store layer only
/// - Default: [`DEFAULT_LOG_FILTER`]
///
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
