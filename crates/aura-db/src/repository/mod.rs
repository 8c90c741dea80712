//! # Repository Module
//!
//! SQLite repositories behind [`crate::Database`].
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Database (impl Store)                                                 │
//! │       │                                                                 │
//! │       │  db.products().list()              pool-level reads/writes     │
//! │       │  SaleRepository::insert(&mut tx)   batch steps on one tx       │
//! │       ▼                                                                 │
//! │  ProductRepository  ── list, get_by_id, insert, update, delete,        │
//! │                        adjust_stock                                     │
//! │  SaleRepository     ── list, get_by_id, update_status, insert, delete  │
//! │  WithdrawalRepository ─ list, insert, delete                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every repository is scoped to one `store_id`. Functions that take a
//! `&mut SqliteConnection` run on the caller's open transaction.

pub mod product;
pub mod sale;
pub mod withdrawal;
