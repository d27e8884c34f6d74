use uuid::Uuid;

/// Generates a fresh opaque identifier for students and payments.
pub fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}
