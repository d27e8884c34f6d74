//! Interactive payment entry: positivity checks and the overpayment clamp.

use tracing::info;

use crate::core::ledger_store::LedgerStore;
use crate::ledger::{NewPayment, Payment};

use super::{ServiceError, ServiceResult};

/// Note attached to payments created by [`PaymentService::pay_remaining`].
pub const REMAINING_BALANCE_NOTE: &str = "Remaining balance";

/// Outcome of a validated payment.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedPayment {
    pub payment: Payment,
    /// Set when the requested amount exceeded the balance and was reduced.
    pub clamped: bool,
}

pub struct PaymentService;

impl PaymentService {
    /// Records a payment after rejecting non-positive amounts. Amounts above the
    /// remaining balance are reduced to it; nothing is recorded once the
    /// balance is settled or the student is exempt.
    pub fn record(
        store: &mut LedgerStore,
        student_id: &str,
        mut input: NewPayment,
    ) -> ServiceResult<RecordedPayment> {
        if !input.amount.is_finite() || input.amount <= 0.0 {
            return Err(ServiceError::Invalid(
                "Payment amount must be greater than zero".into(),
            ));
        }
        let student = store
            .student(student_id)
            .ok_or_else(|| ServiceError::NotFound(format!("Student `{student_id}`")))?;
        if student.free {
            return Err(ServiceError::Invalid(format!(
                "Student `{}` is fee-exempt",
                student.name
            )));
        }
        let remaining = student.remaining();
        if remaining <= 0.0 {
            return Err(ServiceError::Invalid(format!(
                "Student `{}` has no remaining balance",
                student.name
            )));
        }
        let clamped = input.amount > remaining;
        if clamped {
            info!(
                student_id,
                requested = input.amount,
                remaining,
                "payment exceeds remaining balance, clamping"
            );
            input.amount = remaining;
        }
        let payment = store
            .record_payment(student_id, input)?
            .ok_or_else(|| ServiceError::NotFound(format!("Student `{student_id}`")))?;
        Ok(RecordedPayment { payment, clamped })
    }

    /// Settles the full remaining balance in one payment.
    pub fn pay_remaining(
        store: &mut LedgerStore,
        student_id: &str,
        date: Option<String>,
    ) -> ServiceResult<RecordedPayment> {
        let remaining = store
            .student(student_id)
            .map(|student| student.remaining())
            .ok_or_else(|| ServiceError::NotFound(format!("Student `{student_id}`")))?;
        let input = NewPayment {
            amount: remaining,
            date,
            note: Some(REMAINING_BALANCE_NOTE.to_string()),
        };
        Self::record(store, student_id, input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{NewStudent, PaymentStatus};
    use crate::storage::MemoryStore;

    fn store_with_student(fee: f64) -> (LedgerStore, String) {
        let mut store = LedgerStore::new(Box::new(MemoryStore::new()));
        let id = store
            .add_student(NewStudent::new("Amina", "Grade 5").with_fee(fee))
            .unwrap()
            .id;
        (store, id)
    }

    #[test]
    fn rejects_non_positive_amounts() {
        let (mut store, id) = store_with_student(100.0);
        for amount in [0.0, -5.0, f64::NAN] {
            let err = PaymentService::record(&mut store, &id, NewPayment::new(amount))
                .expect_err("amount rejected");
            assert!(matches!(err, ServiceError::Invalid(_)));
        }
        assert!(store.student(&id).unwrap().payments.is_empty());
    }

    #[test]
    fn clamps_to_remaining_balance() {
        let (mut store, id) = store_with_student(100.0);
        PaymentService::record(&mut store, &id, NewPayment::new(60.0)).unwrap();
        let recorded = PaymentService::record(&mut store, &id, NewPayment::new(80.0)).unwrap();
        assert!(recorded.clamped);
        assert_eq!(recorded.payment.amount, 40.0);
        assert_eq!(store.student(&id).unwrap().status(), PaymentStatus::Paid);

        let err = PaymentService::record(&mut store, &id, NewPayment::new(1.0))
            .expect_err("nothing left to pay");
        assert!(format!("{err}").contains("no remaining balance"));
    }

    #[test]
    fn pay_remaining_settles_balance() {
        let (mut store, id) = store_with_student(250.0);
        PaymentService::record(&mut store, &id, NewPayment::new(100.0)).unwrap();
        let recorded =
            PaymentService::pay_remaining(&mut store, &id, Some("2024-06-01".into())).unwrap();
        assert!(!recorded.clamped);
        assert_eq!(recorded.payment.amount, 150.0);
        assert_eq!(recorded.payment.note, REMAINING_BALANCE_NOTE);
        assert_eq!(store.student(&id).unwrap().remaining(), 0.0);
    }

    #[test]
    fn exempt_and_unknown_students_are_rejected() {
        let mut store = LedgerStore::new(Box::new(MemoryStore::new()));
        let exempt = store
            .add_student(NewStudent::new("B", "C").with_fee(10.0).exempt())
            .unwrap();
        assert!(matches!(
            PaymentService::record(&mut store, &exempt.id, NewPayment::new(5.0)),
            Err(ServiceError::Invalid(_))
        ));
        assert!(matches!(
            PaymentService::pay_remaining(&mut store, "missing", None),
            Err(ServiceError::NotFound(_))
        ));
    }
}
