use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{ids::new_id, Student};

/// Root aggregate: every student in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    #[serde(default)]
    pub students: Vec<Student>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn student(&self, id: &str) -> Option<&Student> {
        self.students.iter().find(|student| student.id == id)
    }

    pub fn student_mut(&mut self, id: &str) -> Option<&mut Student> {
        self.students.iter_mut().find(|student| student.id == id)
    }

    pub fn add_student(&mut self, student: Student) -> &Student {
        self.students.push(student);
        &self.students[self.students.len() - 1]
    }

    /// Removes the student and, with it, every payment it owns.
    pub fn remove_student(&mut self, id: &str) -> Option<Student> {
        let index = self.students.iter().position(|student| student.id == id)?;
        Some(self.students.remove(index))
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    /// Re-keys duplicate or blank ids with fresh ones. Student ids must be
    /// unique across the ledger, payment ids within their student.
    /// Returns how many records were re-keyed.
    pub fn ensure_unique_ids(&mut self) -> usize {
        let mut rekeyed = 0;
        let mut student_ids = HashSet::new();
        for student in &mut self.students {
            if student.id.is_empty() || !student_ids.insert(student.id.clone()) {
                let fresh = new_id();
                warn!(old = %student.id, new = %fresh, "assigning id to student with missing or duplicate id");
                student.id = fresh.clone();
                student_ids.insert(fresh);
                rekeyed += 1;
            }
            let mut payment_ids = HashSet::new();
            for payment in &mut student.payments {
                if payment.id.is_empty() || !payment_ids.insert(payment.id.clone()) {
                    let fresh = new_id();
                    warn!(student = %student.id, old = %payment.id, new = %fresh, "assigning id to payment with missing or duplicate id");
                    payment.id = fresh.clone();
                    payment_ids.insert(fresh);
                    rekeyed += 1;
                }
            }
        }
        rekeyed
    }
}
