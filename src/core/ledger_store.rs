use serde_json::Value;
use tracing::{debug, info, warn};

use crate::errors::LedgerError;
use crate::ledger::{
    ids::new_id, normalize, Ledger, NewPayment, NewStudent, Payment, PaymentStatus, Student,
    StudentPatch,
};
use crate::storage::BlobStore;

use super::time::{Clock, SystemClock};

/// Key the ledger document is stored under unless overridden.
pub const DEFAULT_STORAGE_KEY: &str = "fees_app_v1";

/// Sole authority over the student/payment collection.
///
/// Every query reloads from the backend and every mutation is one
/// read-mutate-persist cycle writing the whole document. Mutations take
/// `&mut self`, so a cycle can never interleave with another one; share a
/// store across threads behind a `Mutex`.
pub struct LedgerStore {
    backend: Box<dyn BlobStore>,
    key: String,
    clock: Box<dyn Clock>,
}

impl LedgerStore {
    pub fn new(backend: Box<dyn BlobStore>) -> Self {
        Self {
            backend,
            key: DEFAULT_STORAGE_KEY.to_string(),
            clock: Box::new(SystemClock),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn backend(&self) -> &dyn BlobStore {
        self.backend.as_ref()
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Reads and normalizes the persisted ledger. Missing, unreadable or
    /// malformed state yields an empty ledger instead of an error. Ids
    /// assigned during normalization are written back so they stay stable
    /// across reads.
    pub fn load(&self) -> Ledger {
        let bytes = match self.backend.get(&self.key) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                debug!(key = %self.key, "no persisted ledger, starting empty");
                return Ledger::default();
            }
            Err(err) => {
                warn!(key = %self.key, error = %err, "failed to read persisted ledger, starting empty");
                return Ledger::default();
            }
        };
        match serde_json::from_slice::<Value>(&bytes) {
            Ok(root) => {
                let (ledger, rekeyed) = normalize::lenient_with_rekeys(&root);
                if rekeyed > 0 {
                    match self.persist(&ledger) {
                        Ok(()) => info!(key = %self.key, rekeyed, "persisted assigned ids"),
                        Err(err) => {
                            warn!(key = %self.key, error = %err, "failed to persist assigned ids")
                        }
                    }
                }
                ledger
            }
            Err(err) => {
                warn!(key = %self.key, error = %err, "persisted ledger is not valid JSON, starting empty");
                Ledger::default()
            }
        }
    }

    /// Writes the full ledger in a single `set`.
    pub fn persist(&self, ledger: &Ledger) -> Result<(), LedgerError> {
        let bytes = serde_json::to_vec(ledger)?;
        self.backend.set(&self.key, &bytes)?;
        debug!(key = %self.key, students = ledger.len(), "persisted ledger");
        Ok(())
    }

    pub fn students(&self) -> Vec<Student> {
        self.load().students
    }

    pub fn student(&self, id: &str) -> Option<Student> {
        self.load().student(id).cloned()
    }

    /// Adds a student with a fresh id and no payments. Name and class are not
    /// validated here; see `StudentService::register`.
    pub fn add_student(&mut self, input: NewStudent) -> Result<Student, LedgerError> {
        let mut ledger = self.load();
        let created = ledger.add_student(Self::build_student(input)).clone();
        self.persist(&ledger)?;
        info!(id = %created.id, class = %created.class_name, "student added");
        Ok(created)
    }

    /// Adds several students in one read-mutate-persist cycle. Either all of
    /// them are stored or, when the write fails, none are.
    pub fn add_students(
        &mut self,
        inputs: impl IntoIterator<Item = NewStudent>,
    ) -> Result<Vec<Student>, LedgerError> {
        let mut ledger = self.load();
        let created: Vec<Student> = inputs
            .into_iter()
            .map(|input| ledger.add_student(Self::build_student(input)).clone())
            .collect();
        if created.is_empty() {
            return Ok(created);
        }
        self.persist(&ledger)?;
        info!(added = created.len(), "students added");
        Ok(created)
    }

    fn build_student(input: NewStudent) -> Student {
        Student {
            id: new_id(),
            name: input.name,
            class_name: input.class_name,
            total_fee: normalize::finite_or_zero(input.total_fee),
            free: input.free,
            payments: Vec::new(),
        }
    }

    /// Applies a sparse patch. Returns `None` without writing when `id` is unknown.
    pub fn update_student(
        &mut self,
        id: &str,
        patch: StudentPatch,
    ) -> Result<Option<Student>, LedgerError> {
        let mut ledger = self.load();
        let Some(student) = ledger.student_mut(id) else {
            debug!(id, "update for unknown student ignored");
            return Ok(None);
        };
        patch.apply(student);
        let updated = student.clone();
        self.persist(&ledger)?;
        info!(id, "student updated");
        Ok(Some(updated))
    }

    /// Deletes the student and its payments. Unknown ids still persist the
    /// unchanged ledger.
    pub fn remove_student(&mut self, id: &str) -> Result<(), LedgerError> {
        let mut ledger = self.load();
        let removed = ledger.remove_student(id);
        self.persist(&ledger)?;
        match removed {
            Some(student) => info!(id, payments = student.payments.len(), "student removed"),
            None => debug!(id, "remove for unknown student"),
        }
        Ok(())
    }

    /// Appends a payment. The amount is coerced but not range-checked; a
    /// missing or blank date resolves to the clock's current date.
    pub fn record_payment(
        &mut self,
        student_id: &str,
        input: NewPayment,
    ) -> Result<Option<Payment>, LedgerError> {
        let mut ledger = self.load();
        let today = self.clock.today_string();
        let Some(student) = ledger.student_mut(student_id) else {
            debug!(student_id, "payment for unknown student ignored");
            return Ok(None);
        };
        let payment = Payment {
            id: new_id(),
            amount: normalize::finite_or_zero(input.amount),
            date: input
                .date
                .filter(|date| !date.trim().is_empty())
                .unwrap_or(today),
            note: input.note.unwrap_or_default(),
        };
        student.payments.push(payment.clone());
        self.persist(&ledger)?;
        info!(student_id, payment_id = %payment.id, amount = payment.amount, "payment recorded");
        Ok(Some(payment))
    }

    /// Removes one payment. Unknown students are a no-op without a write.
    pub fn delete_payment(&mut self, student_id: &str, payment_id: &str) -> Result<(), LedgerError> {
        let mut ledger = self.load();
        let Some(student) = ledger.student_mut(student_id) else {
            debug!(student_id, "payment delete for unknown student ignored");
            return Ok(());
        };
        student.payments.retain(|payment| payment.id != payment_id);
        self.persist(&ledger)?;
        info!(student_id, payment_id, "payment deleted");
        Ok(())
    }

    pub fn amount_paid(student: &Student) -> f64 {
        student.amount_paid()
    }

    pub fn remaining(student: &Student) -> f64 {
        student.remaining()
    }

    pub fn status(student: &Student) -> PaymentStatus {
        student.status()
    }

    /// Pretty-printed persisted representation.
    pub fn export(&self) -> Result<String, LedgerError> {
        Ok(serde_json::to_string_pretty(&self.load())?)
    }

    /// Parses and imports a JSON document. See [`LedgerStore::import_value`].
    pub fn import_json(&mut self, text: &str) -> Result<Ledger, LedgerError> {
        let root: Value = serde_json::from_str(text)
            .map_err(|err| LedgerError::InvalidImport(format!("not valid JSON: {err}")))?;
        self.import_value(&root)
    }

    /// Replaces the whole ledger with `root` after validating its shape. An
    /// invalid payload leaves the stored ledger untouched.
    pub fn import_value(&mut self, root: &Value) -> Result<Ledger, LedgerError> {
        let ledger = normalize::strict(root).map_err(|err| {
            warn!(error = %err, "import rejected");
            err
        })?;
        self.persist(&ledger)?;
        info!(students = ledger.len(), "ledger imported");
        Ok(ledger)
    }

    /// Replaces the whole ledger with an already typed one.
    pub fn replace(&mut self, mut ledger: Ledger) -> Result<(), LedgerError> {
        for student in &mut ledger.students {
            student.total_fee = normalize::finite_or_zero(student.total_fee);
            for payment in &mut student.payments {
                payment.amount = normalize::finite_or_zero(payment.amount);
            }
        }
        ledger.ensure_unique_ids();
        self.persist(&ledger)
    }
}
