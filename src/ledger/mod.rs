//! Ledger domain models, derived values, and normalization helpers.

pub mod ids;
#[allow(clippy::module_inception)]
pub mod ledger;
pub mod normalize;
pub mod payment;
pub mod student;

pub use ledger::Ledger;
pub use payment::{NewPayment, Payment};
pub use student::{NewStudent, PaymentStatus, Student, StudentPatch};
