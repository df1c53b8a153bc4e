mod common;

use common::{day, fixture};
use vaxsched::{SchedulerError, SessionContext};

#[tokio::test]
async fn reserve_picks_the_lowest_username_caregiver() {
    let f = fixture("lowest-caregiver").await;
    let d = day("2022-05-01");

    f.calendar.upload("bob", d).await.unwrap();
    f.calendar.upload("alice", d).await.unwrap();
    f.inventory.create("vaxA", 5).await.unwrap();

    let session = SessionContext::patient("pat");
    let first = f.engine.reserve(&session, d, "vaxA").await.unwrap();
    assert_eq!(first.caregiver, "alice");

    let second = f.engine.reserve(&session, d, "vaxA").await.unwrap();
    assert_eq!(second.caregiver, "bob");
    assert_ne!(first.appointment_id, second.appointment_id);
}

#[tokio::test]
async fn reserve_consumes_slot_and_dose_and_records_the_appointment() {
    let f = fixture("reserve-effects").await;
    let d = day("2022-05-01");

    f.calendar.upload("alice", d).await.unwrap();
    f.inventory.create("vaxA", 5).await.unwrap();

    let session = SessionContext::patient("pat");
    let booked = f.engine.reserve(&session, d, "vaxA").await.unwrap();

    assert!(f.calendar.caregivers_on(d).await.unwrap().is_empty());
    assert_eq!(f.doses("vaxA").await, 4);

    let appointment = f
        .registry
        .fetch(&booked.appointment_id)
        .await
        .unwrap()
        .expect("appointment missing");
    assert_eq!(appointment.day, d);
    assert_eq!(appointment.patient, "pat");
    assert_eq!(appointment.caregiver, "alice");
    assert_eq!(appointment.vaccine, "vaxA");
}

#[tokio::test]
async fn last_dose_goes_to_exactly_one_reservation() {
    let f = fixture("last-dose").await;
    let d = day("2022-05-01");

    f.calendar.upload("alice", d).await.unwrap();
    f.calendar.upload("bob", d).await.unwrap();
    f.inventory.create("vaxA", 1).await.unwrap();

    let session = SessionContext::patient("pat");
    f.engine.reserve(&session, d, "vaxA").await.unwrap();
    assert_eq!(f.doses("vaxA").await, 0);

    let err = f.engine.reserve(&session, d, "vaxA").await.unwrap_err();
    assert!(matches!(err, SchedulerError::InsufficientStock(_)));

    // the failed attempt must not eat bob's slot
    assert_eq!(f.calendar.caregivers_on(d).await.unwrap(), vec!["bob"]);
    assert_eq!(f.doses("vaxA").await, 0);
}

#[tokio::test]
async fn reserve_without_slots_leaves_the_ledger_untouched() {
    let f = fixture("no-slot").await;
    let d = day("2022-05-01");

    f.inventory.create("vaxA", 3).await.unwrap();

    let session = SessionContext::patient("pat");
    let err = f.engine.reserve(&session, d, "vaxA").await.unwrap_err();
    assert!(matches!(err, SchedulerError::NoSlot(_)));

    assert_eq!(f.doses("vaxA").await, 3);
    assert!(f.registry.for_patient("pat").await.unwrap().is_empty());
}

#[tokio::test]
async fn reserve_of_an_unknown_vaccine_restores_the_slot() {
    let f = fixture("unknown-vaccine").await;
    let d = day("2022-05-01");

    f.calendar.upload("alice", d).await.unwrap();

    let session = SessionContext::patient("pat");
    let err = f.engine.reserve(&session, d, "mystery").await.unwrap_err();
    assert!(matches!(err, SchedulerError::UnknownVaccine(_)));

    assert_eq!(f.calendar.caregivers_on(d).await.unwrap(), vec!["alice"]);
}

#[tokio::test]
async fn reserve_requires_an_authenticated_patient() {
    let f = fixture("reserve-role").await;
    let d = day("2022-05-01");

    f.calendar.upload("alice", d).await.unwrap();
    f.inventory.create("vaxA", 5).await.unwrap();

    let err = f
        .engine
        .reserve(&SessionContext::Anonymous, d, "vaxA")
        .await
        .unwrap_err();
    assert!(matches!(err, SchedulerError::LoginRequired));

    let err = f
        .engine
        .reserve(&SessionContext::caregiver("alice"), d, "vaxA")
        .await
        .unwrap_err();
    assert!(matches!(err, SchedulerError::WrongRole(_)));

    assert_eq!(f.calendar.caregivers_on(d).await.unwrap(), vec!["alice"]);
    assert_eq!(f.doses("vaxA").await, 5);
}

#[tokio::test]
async fn cancel_is_the_exact_inverse_of_reserve() {
    let f = fixture("cancel-inverse").await;
    let d = day("2022-05-01");

    f.calendar.upload("alice", d).await.unwrap();
    f.inventory.create("vaxA", 2).await.unwrap();

    let session = SessionContext::patient("pat");
    let booked = f.engine.reserve(&session, d, "vaxA").await.unwrap();
    f.engine
        .cancel(&session, &booked.appointment_id)
        .await
        .unwrap();

    assert_eq!(f.calendar.caregivers_on(d).await.unwrap(), vec!["alice"]);
    assert_eq!(f.doses("vaxA").await, 2);
    assert!(
        f.registry
            .fetch(&booked.appointment_id)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn the_assigned_caregiver_may_cancel() {
    let f = fixture("cancel-caregiver").await;
    let d = day("2022-05-01");

    f.calendar.upload("alice", d).await.unwrap();
    f.inventory.create("vaxA", 1).await.unwrap();

    let booked = f
        .engine
        .reserve(&SessionContext::patient("pat"), d, "vaxA")
        .await
        .unwrap();
    f.engine
        .cancel(&SessionContext::caregiver("alice"), &booked.appointment_id)
        .await
        .unwrap();

    assert_eq!(f.doses("vaxA").await, 1);
}

#[tokio::test]
async fn cancel_by_an_unrelated_user_is_denied() {
    let f = fixture("cancel-denied").await;
    let d = day("2022-05-01");

    f.calendar.upload("alice", d).await.unwrap();
    f.inventory.create("vaxA", 1).await.unwrap();

    let booked = f
        .engine
        .reserve(&SessionContext::patient("pat"), d, "vaxA")
        .await
        .unwrap();

    for session in [
        SessionContext::patient("someone_else"),
        SessionContext::caregiver("bob"),
    ] {
        let err = f
            .engine
            .cancel(&session, &booked.appointment_id)
            .await
            .unwrap_err();
        assert!(matches!(err, SchedulerError::Permission));
    }

    // the appointment and its consumed resources are untouched
    assert!(
        f.registry
            .fetch(&booked.appointment_id)
            .await
            .unwrap()
            .is_some()
    );
    assert_eq!(f.doses("vaxA").await, 0);
}

#[tokio::test]
async fn a_second_cancel_of_the_same_id_is_not_found() {
    let f = fixture("double-cancel").await;
    let d = day("2022-05-01");

    f.calendar.upload("alice", d).await.unwrap();
    f.inventory.create("vaxA", 1).await.unwrap();

    let session = SessionContext::patient("pat");
    let booked = f.engine.reserve(&session, d, "vaxA").await.unwrap();

    f.engine
        .cancel(&session, &booked.appointment_id)
        .await
        .unwrap();
    let err = f
        .engine
        .cancel(&session, &booked.appointment_id)
        .await
        .unwrap_err();
    assert!(matches!(err, SchedulerError::AppointmentNotFound(_)));

    // the second cancel must not restore anything twice
    assert_eq!(f.doses("vaxA").await, 1);
    assert_eq!(f.calendar.caregivers_on(d).await.unwrap(), vec!["alice"]);
}

#[tokio::test]
async fn cancel_merges_with_a_slot_reuploaded_in_the_meantime() {
    let f = fixture("cancel-merge").await;
    let d = day("2022-05-01");

    f.calendar.upload("alice", d).await.unwrap();
    f.inventory.create("vaxA", 1).await.unwrap();

    let session = SessionContext::patient("pat");
    let booked = f.engine.reserve(&session, d, "vaxA").await.unwrap();

    // the reservation freed alice's (caregiver, day) key, so she may upload again
    f.calendar.upload("alice", d).await.unwrap();

    f.engine
        .cancel(&session, &booked.appointment_id)
        .await
        .unwrap();
    assert_eq!(f.calendar.caregivers_on(d).await.unwrap(), vec!["alice"]);
}

#[tokio::test]
async fn duplicate_slot_upload_is_a_conflict() {
    let f = fixture("duplicate-upload").await;
    let d = day("2022-05-01");

    f.calendar.upload("alice", d).await.unwrap();
    let err = f.calendar.upload("alice", d).await.unwrap_err();
    assert!(matches!(err, SchedulerError::Conflict(_)));

    // a different day is fine
    f.calendar.upload("alice", day("2022-05-02")).await.unwrap();
}

#[tokio::test]
async fn appointments_are_listed_in_id_order() {
    let f = fixture("listing-order").await;
    let d = day("2022-05-01");

    for caregiver in ["a", "b", "c"] {
        f.calendar.upload(caregiver, d).await.unwrap();
    }
    f.inventory.create("vaxA", 3).await.unwrap();

    let session = SessionContext::patient("pat");
    for _ in 0..3 {
        f.engine.reserve(&session, d, "vaxA").await.unwrap();
    }

    let listed = f.registry.for_patient("pat").await.unwrap();
    assert_eq!(listed.len(), 3);
    let ids: Vec<&str> = listed.iter().map(|a| a.id.as_str()).collect();
    let mut sorted = ids.clone();
    sorted.sort_unstable();
    assert_eq!(ids, sorted);

    assert!(f.registry.for_caregiver("a").await.unwrap().len() == 1);
    assert!(f.registry.for_patient("nobody").await.unwrap().is_empty());
}

#[tokio::test]
async fn inventory_guards_reject_bad_input() {
    let f = fixture("inventory-guards").await;

    f.inventory.create("vaxA", 0).await.unwrap();
    let err = f.inventory.create("vaxA", 5).await.unwrap_err();
    assert!(matches!(err, SchedulerError::Conflict(_)));

    let err = f.inventory.create("vaxB", -1).await.unwrap_err();
    assert!(matches!(err, SchedulerError::Validation(_)));

    let err = f.inventory.increase("missing", 5).await.unwrap_err();
    assert!(matches!(err, SchedulerError::UnknownVaccine(_)));

    f.inventory.increase("vaxA", 7).await.unwrap();
    assert_eq!(f.doses("vaxA").await, 7);
}
