mod common;

use std::sync::atomic::Ordering;

use privacy_checkin_core::failure::{
    MSG_ALREADY_ON_CHAIN, MSG_CONNECT_WALLET, MSG_CREATE_CANCELLED, MSG_CREATE_DONE,
    MSG_DECRYPT_DONE, MSG_FHE_INIT_FAILED, MSG_LOAD_FAILED,
};
use privacy_checkin_core::{
    CheckInController, CheckInService, DecryptOutcome, Dashboard, LatitudeView, RecordId, Refusal,
    StatusPhase,
};

use common::{
    fill_draft, new_controller, other_user, user, FakeContract, FakeFhe, FakeProvider, TestClock,
    START_MS,
};

#[test]
fn connecting_with_no_records_yields_empty_dashboard() {
    let mut c = new_controller();
    assert!(c.connect_wallet());

    assert_eq!(c.dashboard.account, Some(user()));
    assert!(c.dashboard.fhe_ready);
    assert!(!c.dashboard.initial_load);
    assert!(c.dashboard.records().is_empty());
    assert_eq!(c.dashboard.stats(), Default::default());
    assert!(!c.dashboard.toast.is_visible());
}

#[test]
fn created_check_in_appears_after_reload_with_redacted_latitude() {
    let mut c = new_controller();
    c.connect_wallet();
    c.dashboard.show_create = true;
    fill_draft(&mut c, "Forbidden City", "39.9042", "116.4074");

    c.create_check_in().expect("create accepted");

    let id = RecordId(format!("checkin-{START_MS}"));
    let record = c.dashboard.record(&id).expect("new record listed");
    assert_eq!(record.name, "Forbidden City");
    assert_eq!(record.public_value2, 116_407_400);
    assert_eq!(record.creator, user());
    assert!(!record.is_verified);
    assert_eq!(c.dashboard.latitude_view(&id), LatitudeView::Redacted);

    assert_eq!(c.dashboard.stats().user_total, 1);
    assert_eq!(c.dashboard.history().len(), 1);
    assert_eq!(c.dashboard.toast.phase(), StatusPhase::Success);
    assert_eq!(c.dashboard.toast.message(), MSG_CREATE_DONE);
    assert!(!c.dashboard.show_create);
    assert!(c.dashboard.draft.name.is_empty());
    assert!(!c.dashboard.is_creating());
    assert_eq!(c.service.fhe.encrypt_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn decrypt_round_trip_reveals_latitude() {
    let mut c = new_controller();
    c.connect_wallet();
    fill_draft(&mut c, "Forbidden City", "39.9042", "116.4074");
    c.create_check_in().expect("create accepted");
    let id = RecordId(format!("checkin-{START_MS}"));

    let value = c.decrypt_data(&id);
    assert_eq!(value, Some(39_904_200));
    assert_eq!(c.dashboard.latitude_view(&id).degrees(), Some(39.9042));
    assert_eq!(c.dashboard.toast.message(), MSG_DECRYPT_DONE);
    assert_eq!(c.dashboard.stats().verified, 1);
    assert!(!c.dashboard.is_decrypting());
    assert_eq!(c.service.fhe.verify_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn verified_record_returns_stored_value_without_fhe_call() {
    let mut c = new_controller();
    c.service
        .contract
        .seed("checkin-1", "Temple of Heaven", other_user(), Some(39_882_200));
    c.connect_wallet();

    let id = RecordId::from("checkin-1");
    assert_eq!(c.decrypt_data(&id), Some(39_882_200));
    assert_eq!(
        c.dashboard.latitude_view(&id),
        LatitudeView::Verified(39.8822)
    );
    assert_eq!(c.service.fhe.verify_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn stale_cache_still_short_circuits_on_chain_verification() {
    let c = new_controller();
    c.service
        .contract
        .seed("checkin-7", "Summer Palace", other_user(), Some(40_000_000));

    let outcome = c
        .service
        .decrypt_record(Some(user()), &RecordId::from("checkin-7"), &mut |_| {})
        .expect("decrypt");
    assert_eq!(outcome, DecryptOutcome::AlreadyOnChain { value: 40_000_000 });
    assert_eq!(c.service.fhe.verify_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn concurrent_verification_reloads_instead_of_failing() {
    let mut c = new_controller();
    c.service
        .contract
        .seed("checkin-2", "Lama Temple", other_user(), None);
    c.connect_wallet();
    {
        let mut g = c.service.contract.state.lock().expect("lock");
        g.verify_error = Some("execution reverted: Data already verified".to_owned());
    }

    let id = RecordId::from("checkin-2");
    c.service
        .fhe
        .plaintexts
        .lock()
        .expect("lock")
        .insert(c.service.contract.get_handle(&id), 39_947_000);

    assert_eq!(c.decrypt_data(&id), None);
    assert_eq!(c.dashboard.toast.phase(), StatusPhase::Success);
    assert_eq!(c.dashboard.toast.message(), MSG_ALREADY_ON_CHAIN);
    assert_eq!(c.dashboard.latitude_view(&id), LatitudeView::Redacted);
}

#[test]
fn failed_decryption_surfaces_error_and_keeps_latitude_hidden() {
    let mut c = new_controller();
    c.service
        .contract
        .seed("checkin-3", "Hutong", other_user(), None);
    c.connect_wallet();

    // The fake FHE client has no plaintext for a seeded handle.
    let id = RecordId::from("checkin-3");
    assert_eq!(c.decrypt_data(&id), None);
    assert_eq!(c.dashboard.toast.phase(), StatusPhase::Error);
    assert!(c.dashboard.toast.message().starts_with("Decryption failed: "));
    assert_eq!(c.dashboard.latitude_view(&id), LatitudeView::Redacted);
    assert!(!c.dashboard.is_decrypting());
}

#[test]
fn rejected_wallet_prompt_shows_cancellation_message() {
    let mut c = new_controller();
    c.connect_wallet();
    c.service.contract.state.lock().expect("lock").reject_next = true;
    fill_draft(&mut c, "Jingshan Park", "39.9255", "116.3903");

    c.create_check_in().expect("create accepted");
    assert_eq!(c.dashboard.toast.phase(), StatusPhase::Error);
    assert_eq!(c.dashboard.toast.message(), MSG_CREATE_CANCELLED);
    assert!(c.dashboard.records().is_empty());
    assert_eq!(c.dashboard.draft.name, "Jingshan Park");
}

#[test]
fn other_create_failures_use_generic_message() {
    let mut c = new_controller();
    c.connect_wallet();
    fill_draft(&mut c, "Sydney Opera House", "-33.8568", "151.2153");

    c.create_check_in().expect("create accepted");
    let message = c.dashboard.toast.message().to_owned();
    assert!(message.starts_with("Submission failed: "), "{message}");
    assert_ne!(message, MSG_CREATE_CANCELLED);
    assert_eq!(c.service.fhe.encrypt_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn listing_failure_keeps_previous_records() {
    let mut c = new_controller();
    c.service
        .contract
        .seed("checkin-1", "Houhai", user(), None);
    c.connect_wallet();
    assert_eq!(c.dashboard.records().len(), 1);

    c.service.contract.state.lock().expect("lock").fail_listing = true;
    c.load_data();
    assert_eq!(c.dashboard.records().len(), 1);
    assert_eq!(c.dashboard.toast.message(), MSG_LOAD_FAILED);
    assert!(!c.dashboard.is_refreshing());
}

#[test]
fn broken_record_is_skipped_during_load() {
    let c = new_controller();
    c.service.contract.seed("checkin-1", "A", user(), None);
    c.service.contract.seed("checkin-2", "B", user(), None);
    c.service
        .contract
        .state
        .lock()
        .expect("lock")
        .broken
        .push(RecordId::from("checkin-1"));

    let outcome = c.service.load_records().expect("load");
    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].id, RecordId::from("checkin-2"));
    assert_eq!(outcome.skipped.len(), 1);
}

#[test]
fn actions_require_a_connected_wallet() {
    let mut c = new_controller();
    fill_draft(&mut c, "A", "1", "2");
    assert_eq!(c.create_check_in(), Err(Refusal::NotConnected));
    assert_eq!(c.dashboard.toast.message(), MSG_CONNECT_WALLET);
    assert_eq!(c.decrypt_data(&RecordId::from("checkin-1")), None);
}

#[test]
fn second_create_is_refused_while_one_is_in_flight() {
    let mut dashboard = Dashboard::default();
    dashboard.account = Some(user());
    dashboard.fhe_ready = true;
    dashboard.draft.name = "A".to_owned();
    dashboard.draft.latitude = "1".to_owned();
    dashboard.draft.longitude = "2".to_owned();

    let now = privacy_checkin_core::TimestampMs(START_MS);
    dashboard.begin_create(now).expect("first create");
    assert_eq!(dashboard.toast.phase(), StatusPhase::Pending);
    assert!(!dashboard.can_submit_create());
    assert_eq!(dashboard.begin_create(now), Err(Refusal::Busy));
}

#[test]
fn second_decrypt_is_refused_while_one_is_in_flight() {
    let mut c = new_controller();
    c.connect_wallet();
    fill_draft(&mut c, "Cafe", "31.2304", "121.4737");
    c.create_check_in().expect("create accepted");
    let id = c.dashboard.records()[0].id.clone();
    assert!(c.dashboard.can_decrypt(&id));

    let now = privacy_checkin_core::TimestampMs(START_MS);
    c.dashboard.begin_decrypt(&id, now).expect("first decrypt");
    assert!(c.dashboard.is_decrypting());
    assert!(!c.dashboard.can_decrypt(&id));
    assert_eq!(c.dashboard.begin_decrypt(&id, now), Err(Refusal::Busy));
}

#[test]
fn fhe_init_failure_is_reported() {
    let mut c = CheckInController::new(
        CheckInService::new(
            FakeProvider {
                accounts: vec![user()],
            },
            FakeContract::default(),
            FakeFhe {
                fail_init: true,
                ..FakeFhe::default()
            },
            TestClock::default(),
        ),
        Dashboard::default(),
    );
    c.connect_wallet();
    assert!(!c.dashboard.fhe_ready);
    assert_eq!(c.dashboard.toast.message(), MSG_FHE_INIT_FAILED);
}

#[test]
fn create_is_disabled_until_fhe_is_ready() {
    let mut c = CheckInController::new(
        CheckInService::new(
            FakeProvider {
                accounts: vec![user()],
            },
            FakeContract::default(),
            FakeFhe {
                fail_init: true,
                ..FakeFhe::default()
            },
            TestClock::default(),
        ),
        Dashboard::default(),
    );
    c.connect_wallet();
    fill_draft(&mut c, "Cafe", "31.2304", "121.4737");

    assert!(!c.dashboard.can_open_create());
    assert!(!c.dashboard.can_submit_create());
    assert_eq!(c.create_check_in(), Err(Refusal::FheNotReady));
    assert!(!c.dashboard.is_creating());
    assert_eq!(c.dashboard.toast.phase(), StatusPhase::Error);
    assert_eq!(c.dashboard.toast.message(), MSG_FHE_INIT_FAILED);
    assert!(c.dashboard.records().is_empty());
}

#[test]
fn toast_clears_after_clock_advances() {
    let mut c = new_controller();
    c.test_availability();
    assert_eq!(c.dashboard.toast.phase(), StatusPhase::Success);
    c.service.clock.advance(1_999);
    assert!(!c.tick());
    c.service.clock.advance(1);
    assert!(c.tick());
    assert!(!c.dashboard.toast.is_visible());
}
