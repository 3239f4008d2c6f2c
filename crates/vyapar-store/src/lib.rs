//! # vyapar-store: Storage Adapters + Stock Ledger
//!
//! Every read and write against the active backend goes through this
//! crate. Application code holds an `Arc<dyn RecordStore>` and never
//! learns which backend is behind it.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      vyapar-store Architecture                          │
//! │                                                                         │
//! │   Application / UI                                                      │
//! │        │                                                                │
//! │        ├──► StockLedger ──────────┐     posts invoices & purchases     │
//! │        ├──► LiveCollection<T> ────┤     typed snapshots per mutation   │
//! │        └──► backup::export/import ┤     whole-account JSON bundle      │
//! │                                   │                                     │
//! │                                   ▼                                     │
//! │   provider::connect(StoreProfile) ──► Arc<dyn RecordStore>             │
//! │                                   │                                     │
//! │          ┌────────────────────────┼────────────────────────┐           │
//! │          ▼                        ▼                        ▼           │
//! │    LocalStore               DocStore                 TableStore        │
//! │    SQLite file              Redis hashes             Postgres jsonb    │
//! │    broadcast bus            pub/sub channel          LISTEN/NOTIFY     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`adapter`] - The `RecordStore` trait and `ChangeFeed`
//! - [`local`] / [`document`] / [`table`] - The three backends
//! - [`provider`] - Profile persistence and the single connect point
//! - [`subscription`] - `LiveCollection<T>` typed snapshots
//! - [`ledger`] - Stock ledger: sale allocation and purchase receipt
//! - [`backup`] - Whole-account export/import between backends
//! - [`error`] - `StoreError` / `StoreResult`

// =============================================================================
// Module Declarations
// =============================================================================

pub mod adapter;
pub mod backup;
pub mod document;
pub mod error;
pub mod ledger;
pub mod local;
pub mod provider;
pub mod subscription;
pub mod table;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use adapter::{ChangeFeed, RecordStore, StoredRecord};
pub use error::{StoreError, StoreResult};
pub use ledger::{PostOutcome, StockLedger};
pub use provider::{connect, Provider, StoreProfile};
pub use subscription::LiveCollection;

// =============================================================================
// Test Support
// =============================================================================
