use privacy_checkin_core::{status_transition, StatusAction, StatusPhase, StatusToast, TimestampMs};

#[test]
fn toast_happy_path_transitions() {
    let (s1, _) =
        status_transition(StatusPhase::Idle, StatusAction::Begin).expect("idle -> pending");
    assert_eq!(s1, StatusPhase::Pending);
    let (s2, _) = status_transition(s1, StatusAction::Succeed).expect("pending -> success");
    assert_eq!(s2, StatusPhase::Success);
    let (s3, _) = status_transition(s2, StatusAction::Dismiss).expect("success -> idle");
    assert_eq!(s3, StatusPhase::Idle);
}

#[test]
fn dismissing_pending_or_idle_is_rejected() {
    let err =
        status_transition(StatusPhase::Pending, StatusAction::Dismiss).expect_err("must fail");
    assert!(err.to_string().contains("illegal status transition"));
    status_transition(StatusPhase::Idle, StatusAction::Dismiss).expect_err("must fail");
}

#[test]
fn settled_toasts_expire_after_their_delay() {
    let mut toast = StatusToast::default();
    toast.success("done", TimestampMs(1_000));
    assert!(toast.is_visible());
    assert!(!toast.tick(TimestampMs(2_999)));
    assert!(toast.tick(TimestampMs(3_000)));
    assert_eq!(toast.phase(), StatusPhase::Idle);
    assert!(toast.message().is_empty());

    toast.error("boom", TimestampMs(10_000));
    assert!(!toast.tick(TimestampMs(12_000)));
    assert!(toast.tick(TimestampMs(13_000)));
}

#[test]
fn pending_toast_never_auto_dismisses() {
    let mut toast = StatusToast::default();
    toast.pending("working");
    assert_eq!(toast.dismiss_at(), None);
    assert!(!toast.tick(TimestampMs(u64::MAX)));
    assert_eq!(toast.phase(), StatusPhase::Pending);
    assert!(toast.dismiss().is_err());
}

#[test]
fn new_operation_replaces_settled_toast() {
    let mut toast = StatusToast::with_timeouts(100, 200);
    toast.error("first", TimestampMs(0));
    toast.pending("second");
    assert_eq!(toast.phase(), StatusPhase::Pending);
    assert_eq!(toast.message(), "second");
    assert!(!toast.tick(TimestampMs(500)));
}
