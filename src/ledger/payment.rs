use serde::{Deserialize, Serialize};

/// A single amount recorded against a student's fee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: String,
    pub amount: f64,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub note: String,
}

/// Input accepted when recording a payment. Missing dates resolve to the store clock.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewPayment {
    pub amount: f64,
    pub date: Option<String>,
    pub note: Option<String>,
}

impl NewPayment {
    pub fn new(amount: f64) -> Self {
        Self {
            amount,
            ..Self::default()
        }
    }

    pub fn on(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}
