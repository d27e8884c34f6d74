use std::collections::BTreeSet;

use serde::Serialize;

use crate::ledger::{PaymentStatus, Student};

/// Narrowing applied to report and lookup screens. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportFilter {
    /// Exact class name match.
    pub class_name: Option<String>,
    pub status: Option<PaymentStatus>,
    /// Case-insensitive substring over name and class.
    pub search: Option<String>,
}

impl ReportFilter {
    pub fn class(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    pub fn status(mut self, status: PaymentStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn search(mut self, query: impl Into<String>) -> Self {
        self.search = Some(query.into());
        self
    }

    pub fn matches(&self, student: &Student) -> bool {
        if let Some(class_name) = self.class_name.as_deref().filter(|c| !c.is_empty()) {
            if student.class_name != class_name {
                return false;
            }
        }
        if let Some(status) = self.status {
            if student.status() != status {
                return false;
            }
        }
        let query = self
            .search
            .as_deref()
            .map(|q| q.trim().to_lowercase())
            .unwrap_or_default();
        if !query.is_empty() {
            let in_name = student.name.to_lowercase().contains(&query);
            let in_class = student.class_name.to_lowercase().contains(&query);
            if !in_name && !in_class {
                return false;
            }
        }
        true
    }
}

/// One line of the fee report, with every derived value computed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub student_id: String,
    pub name: String,
    pub class_name: String,
    pub total_fee: f64,
    pub paid: f64,
    pub remaining: f64,
    pub status: PaymentStatus,
}

impl From<&Student> for ReportRow {
    fn from(student: &Student) -> Self {
        Self {
            student_id: student.id.clone(),
            name: student.name.clone(),
            class_name: student.class_name.clone(),
            total_fee: student.total_fee,
            paid: student.amount_paid(),
            remaining: student.remaining(),
            status: student.status(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportTotals {
    pub students: usize,
    pub total_fee: f64,
    pub paid: f64,
    pub remaining: f64,
    pub free: usize,
    pub fully_paid: usize,
    pub partial: usize,
    pub unpaid: usize,
}

pub struct ReportService;

impl ReportService {
    /// Distinct non-empty class names in sorted order.
    pub fn class_names(students: &[Student]) -> Vec<String> {
        students
            .iter()
            .map(|student| student.class_name.as_str())
            .filter(|class_name| !class_name.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    pub fn filter<'a>(students: &'a [Student], filter: &ReportFilter) -> Vec<&'a Student> {
        students
            .iter()
            .filter(|student| filter.matches(student))
            .collect()
    }

    pub fn rows(students: &[Student], filter: &ReportFilter) -> Vec<ReportRow> {
        Self::filter(students, filter)
            .into_iter()
            .map(ReportRow::from)
            .collect()
    }

    pub fn totals(rows: &[ReportRow]) -> ReportTotals {
        rows.iter().fold(ReportTotals::default(), |mut acc, row| {
            acc.students += 1;
            acc.total_fee += row.total_fee;
            acc.paid += row.paid;
            acc.remaining += row.remaining;
            match row.status {
                PaymentStatus::Free => acc.free += 1,
                PaymentStatus::Paid => acc.fully_paid += 1,
                PaymentStatus::Partial => acc.partial += 1,
                PaymentStatus::Unpaid => acc.unpaid += 1,
            }
            acc
        })
    }
}
