use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::payment::Payment;

/// A fee-bearing (or fee-exempt) party and the payments recorded against it.
///
/// Paid, remaining and status are always derived from `payments`; they are
/// never stored on the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    pub class_name: String,
    pub total_fee: f64,
    #[serde(default)]
    pub free: bool,
    #[serde(default)]
    pub payments: Vec<Payment>,
}

impl Student {
    /// Sum of every recorded payment amount.
    pub fn amount_paid(&self) -> f64 {
        self.payments.iter().map(|payment| payment.amount).sum()
    }

    /// Amount still owed. Zero for exempt students; negative on overpayment.
    pub fn remaining(&self) -> f64 {
        if self.free {
            return 0.0;
        }
        self.total_fee - self.amount_paid()
    }

    /// Classifies the student. The paid check runs before the unpaid check, so a
    /// zero fee with no payments reports [`PaymentStatus::Paid`].
    pub fn status(&self) -> PaymentStatus {
        if self.free {
            return PaymentStatus::Free;
        }
        let remaining = self.remaining();
        if remaining <= 0.0 {
            PaymentStatus::Paid
        } else if remaining >= self.total_fee {
            PaymentStatus::Unpaid
        } else {
            PaymentStatus::Partial
        }
    }

    pub fn payment(&self, id: &str) -> Option<&Payment> {
        self.payments.iter().find(|payment| payment.id == id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Free,
    Paid,
    Partial,
    Unpaid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Free => "free",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Partial => "partial",
            PaymentStatus::Unpaid => "unpaid",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(PaymentStatus::Free),
            "paid" => Ok(PaymentStatus::Paid),
            "partial" => Ok(PaymentStatus::Partial),
            "unpaid" => Ok(PaymentStatus::Unpaid),
            other => Err(format!("unknown payment status `{other}`")),
        }
    }
}

/// Fields accepted when adding a student.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewStudent {
    pub name: String,
    pub class_name: String,
    pub total_fee: f64,
    pub free: bool,
}

impl NewStudent {
    pub fn new(name: impl Into<String>, class_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            class_name: class_name.into(),
            ..Self::default()
        }
    }

    pub fn with_fee(mut self, total_fee: f64) -> Self {
        self.total_fee = total_fee;
        self
    }

    pub fn exempt(mut self) -> Self {
        self.free = true;
        self
    }
}

/// Sparse update: only `Some` fields are written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudentPatch {
    pub name: Option<String>,
    pub class_name: Option<String>,
    pub total_fee: Option<f64>,
    pub free: Option<bool>,
}

impl StudentPatch {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    pub fn total_fee(mut self, total_fee: f64) -> Self {
        self.total_fee = Some(total_fee);
        self
    }

    pub fn free(mut self, free: bool) -> Self {
        self.free = Some(free);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.class_name.is_none()
            && self.total_fee.is_none()
            && self.free.is_none()
    }

    pub(crate) fn apply(self, student: &mut Student) {
        if let Some(name) = self.name {
            student.name = name;
        }
        if let Some(class_name) = self.class_name {
            student.class_name = class_name;
        }
        if let Some(total_fee) = self.total_fee {
            student.total_fee = super::normalize::finite_or_zero(total_fee);
        }
        if let Some(free) = self.free {
            student.free = free;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(total_fee: f64, free: bool, amounts: &[f64]) -> Student {
        Student {
            id: "s1".into(),
            name: "Amina".into(),
            class_name: "Grade 5".into(),
            total_fee,
            free,
            payments: amounts
                .iter()
                .enumerate()
                .map(|(idx, amount)| Payment {
                    id: format!("p{idx}"),
                    amount: *amount,
                    date: "2024-01-01".into(),
                    note: String::new(),
                })
                .collect(),
        }
    }

    #[test]
    fn unpaid_when_nothing_recorded() {
        let s = student(100.0, false, &[]);
        assert_eq!(s.amount_paid(), 0.0);
        assert_eq!(s.remaining(), 100.0);
        assert_eq!(s.status(), PaymentStatus::Unpaid);
    }

    #[test]
    fn partial_then_paid() {
        assert_eq!(student(100.0, false, &[40.0, 30.0]).status(), PaymentStatus::Partial);
        assert_eq!(student(100.0, false, &[100.0]).status(), PaymentStatus::Paid);
    }

    #[test]
    fn overpayment_keeps_signed_remaining() {
        let s = student(100.0, false, &[80.0, 50.0]);
        assert_eq!(s.remaining(), -30.0);
        assert_eq!(s.status(), PaymentStatus::Paid);
    }

    #[test]
    fn exempt_students_owe_nothing() {
        let s = student(500.0, true, &[]);
        assert_eq!(s.remaining(), 0.0);
        assert_eq!(s.status(), PaymentStatus::Free);
    }

    #[test]
    fn zero_fee_without_payments_is_paid() {
        let s = student(0.0, false, &[]);
        assert_eq!(s.remaining(), 0.0);
        assert_eq!(s.status(), PaymentStatus::Paid);
    }

    #[test]
    fn patch_only_touches_present_fields() {
        let mut s = student(100.0, false, &[]);
        StudentPatch::default().total_fee(200.0).apply(&mut s);
        assert_eq!(s.total_fee, 200.0);
        assert_eq!(s.name, "Amina");
        assert_eq!(s.class_name, "Grade 5");
        assert!(!s.free);
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("Partial".parse::<PaymentStatus>(), Ok(PaymentStatus::Partial));
        assert!("settled".parse::<PaymentStatus>().is_err());
    }
}
