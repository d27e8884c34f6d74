#![doc(test(attr(deny(warnings))))]

//! Fee Ledger tracks tuition fees and payments for students grouped by class,
//! and derives balances and payment status from that record.

pub mod config;
pub mod core;
pub mod errors;
pub mod ledger;
pub mod roster;
pub mod storage;
pub mod utils;

pub use crate::core::{LedgerStore, DEFAULT_STORAGE_KEY};
pub use errors::LedgerError;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Fee Ledger tracing initialized.");
    });
}
