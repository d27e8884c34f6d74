pub mod ledger_store;
pub mod services;
pub mod time;
pub mod utils;

pub use ledger_store::{LedgerStore, DEFAULT_STORAGE_KEY};
pub use time::{Clock, FixedClock, SystemClock};
