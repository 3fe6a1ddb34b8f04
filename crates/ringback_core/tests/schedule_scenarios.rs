use chrono::NaiveDate;
use ringback_core::{
    AmbientZone, Instant, RejectionReason, ScheduleDecision, ScheduleDraft, ScheduleField,
    ScheduleValidator, TimeResolver, WallClockSelection,
};

fn validator() -> ScheduleValidator {
    ScheduleValidator::new(TimeResolver::new(AmbientZone::Fixed(chrono_tz::UTC)))
}

fn june_first_new_york() -> ScheduleDraft {
    ScheduleDraft::on(
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        Some("14:00"),
        Some("America/New_York"),
    )
}

#[test]
fn summer_new_york_selection_is_accepted_at_edt_offset() {
    let now = Instant::parse("2025-01-01T00:00:00Z").unwrap();
    match validator().validate(&june_first_new_york(), now) {
        ScheduleDecision::Accepted(resolution) => {
            assert_eq!(resolution.instant.to_rfc3339(), "2025-06-01T18:00:00Z");
            assert!(!resolution.is_degraded());
        }
        other => panic!("expected acceptance, got {other:?}"),
    }
}

#[test]
fn same_selection_after_the_date_is_rejected_on_date_field() {
    let now = Instant::parse("2025-07-01T00:00:00Z").unwrap();
    let decision = validator().validate(&june_first_new_york(), now);
    let rejection = decision.rejection().expect("selection should be rejected");
    assert_eq!(rejection.field, ScheduleField::Date);
    assert_eq!(rejection.reason, RejectionReason::Past);
    assert_eq!(rejection.to_string(), "scheduled time must be in the future");
}

#[test]
fn rejection_matches_resolved_instant_comparison() {
    let resolver = TimeResolver::new(AmbientZone::Fixed(chrono_tz::UTC));
    let draft = june_first_new_york();
    let resolved = resolver
        .resolve(&draft.selection().unwrap())
        .unwrap()
        .instant;

    for now in [
        "2025-06-01T17:59:59Z",
        "2025-06-01T18:00:00Z",
        "2025-06-01T18:00:01Z",
        "2024-12-31T23:59:59Z",
        "2030-01-01T00:00:00Z",
    ] {
        let now = Instant::parse(now).unwrap();
        let rejected = validator().validate(&draft, now).is_rejected();
        assert_eq!(rejected, resolved <= now, "now={now}");
    }
}

#[test]
fn missing_date_is_accepted_without_instant() {
    let now = Instant::parse("2025-07-01T00:00:00Z").unwrap();
    let decision = validator().validate(&ScheduleDraft::unscheduled(), now);
    assert_eq!(decision, ScheduleDecision::Unscheduled);
    assert_eq!(decision.instant(), None);
}

#[test]
fn selection_serializes_with_plain_date_fields() {
    let selection = WallClockSelection::new(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap())
        .at("14:00")
        .in_zone("America/New_York");
    let json = serde_json::to_value(&selection).unwrap();
    assert_eq!(json["date"], "2025-06-01");
    assert_eq!(json["time_of_day"], "14:00");
    assert_eq!(json["timezone"], "America/New_York");
}
