pub mod payment_service;
pub mod report_service;
pub mod student_service;
pub mod transfer_service;

pub use payment_service::{PaymentService, RecordedPayment};
pub use report_service::{ReportFilter, ReportRow, ReportService, ReportTotals};
pub use student_service::StudentService;
pub use transfer_service::TransferService;

use crate::errors::LedgerError;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0}")]
    Invalid(String),
}
