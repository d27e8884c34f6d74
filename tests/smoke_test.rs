use fee_ledger::{
    init,
    ledger::{NewPayment, NewStudent, PaymentStatus},
    storage::MemoryStore,
    LedgerStore,
};

#[test]
fn ledger_smoke() {
    init();

    let mut store = LedgerStore::new(Box::new(MemoryStore::new()));
    let student = store
        .add_student(NewStudent::new("Amina", "Grade 5").with_fee(100.0))
        .unwrap();
    store
        .record_payment(&student.id, NewPayment::new(100.0))
        .unwrap();

    let reloaded = store.student(&student.id).expect("student persisted");
    assert_eq!(reloaded.status(), PaymentStatus::Paid);
    assert!(store.export().unwrap().contains("\"totalFee\""));
}
