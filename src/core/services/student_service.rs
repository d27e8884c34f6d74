//! Registration rules applied before students reach the store.

use crate::core::ledger_store::LedgerStore;
use crate::ledger::{NewStudent, Student, StudentPatch};

use super::{ServiceError, ServiceResult};

/// Validated wrappers over the store's student operations.
pub struct StudentService;

impl StudentService {
    /// Trims name and class, rejects blanks and negative fees, and zeroes the
    /// fee of exempt students before adding.
    pub fn register(store: &mut LedgerStore, input: NewStudent) -> ServiceResult<Student> {
        let name = Self::required("Name", &input.name)?;
        let class_name = Self::required("Class", &input.class_name)?;
        let total_fee = if input.free {
            0.0
        } else {
            Self::validate_fee(input.total_fee)?
        };
        let student = store.add_student(NewStudent {
            name,
            class_name,
            total_fee,
            free: input.free,
        })?;
        Ok(student)
    }

    /// Applies the same rules to whichever fields the patch carries.
    pub fn edit(store: &mut LedgerStore, id: &str, patch: StudentPatch) -> ServiceResult<Student> {
        let mut cleaned = StudentPatch::default();
        if let Some(name) = patch.name.as_deref() {
            cleaned.name = Some(Self::required("Name", name)?);
        }
        if let Some(class_name) = patch.class_name.as_deref() {
            cleaned.class_name = Some(Self::required("Class", class_name)?);
        }
        if let Some(total_fee) = patch.total_fee {
            cleaned.total_fee = Some(Self::validate_fee(total_fee)?);
        }
        cleaned.free = patch.free;
        if cleaned.free == Some(true) {
            cleaned.total_fee = Some(0.0);
        }
        store
            .update_student(id, cleaned)?
            .ok_or_else(|| ServiceError::NotFound(format!("Student `{id}`")))
    }

    fn required(label: &str, value: &str) -> ServiceResult<String> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            Err(ServiceError::Invalid(format!("{label} is required")))
        } else {
            Ok(trimmed.to_string())
        }
    }

    fn validate_fee(total_fee: f64) -> ServiceResult<f64> {
        if !total_fee.is_finite() || total_fee < 0.0 {
            return Err(ServiceError::Invalid(
                "Total fee must be a non-negative number".into(),
            ));
        }
        Ok(total_fee)
    }
}
