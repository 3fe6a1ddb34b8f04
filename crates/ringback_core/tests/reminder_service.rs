use chrono::NaiveDate;
use ringback_core::db::open_db_in_memory;
use ringback_core::{
    AmbientZone, Instant, PhoneChoice, ReminderDraft, ReminderListQuery, ReminderService,
    ReminderServiceError, ReminderStatus, ScheduleDraft, ScheduleField, ScheduleValidator,
    SqliteReminderRepository, TimeResolver,
};
use rusqlite::Connection;

fn service(conn: &Connection) -> ReminderService<SqliteReminderRepository<'_>> {
    ReminderService::with_validator(
        SqliteReminderRepository::new(conn),
        ScheduleValidator::new(TimeResolver::new(AmbientZone::Fixed(chrono_tz::UTC))),
    )
}

fn now() -> Instant {
    Instant::parse("2025-01-01T00:00:00Z").unwrap()
}

fn draft(title: &str, schedule: ScheduleDraft) -> ReminderDraft {
    ReminderDraft {
        title: title.to_string(),
        description: None,
        schedule,
        phone: PhoneChoice::Own("+15551110000".to_string()),
    }
}

fn on(year: i32, month: u32, day: u32, time: &str, zone: &str) -> ScheduleDraft {
    ScheduleDraft::on(
        NaiveDate::from_ymd_opt(year, month, day).unwrap(),
        Some(time),
        Some(zone),
    )
}

#[test]
fn create_resolves_schedule_in_selected_zone() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let reminder = service
        .create_reminder(
            &draft("call the bank", on(2025, 6, 1, "14:00", "America/New_York")),
            now(),
        )
        .unwrap();

    assert_eq!(
        reminder.scheduled_time.map(|at| at.to_rfc3339()),
        Some("2025-06-01T18:00:00Z".to_string())
    );
    assert_eq!(reminder.created_at, now());
    assert_eq!(reminder.phone_to_call, "+15551110000");
}

#[test]
fn past_schedule_is_rejected_and_not_stored() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let err = service
        .create_reminder(
            &draft("too late", on(2024, 12, 31, "23:00", "UTC")),
            now(),
        )
        .unwrap_err();

    match err {
        ReminderServiceError::Schedule(rejection) => {
            assert_eq!(rejection.field, ScheduleField::Date);
        }
        other => panic!("expected schedule rejection, got {other:?}"),
    }
    assert!(service.timeline(now()).unwrap().is_empty());
}

#[test]
fn custom_phone_and_unscheduled_draft_are_stored() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let mut input = draft("whenever", ScheduleDraft::unscheduled());
    input.phone = PhoneChoice::Custom(" +447700900000 ".to_string());
    let reminder = service.create_reminder(&input, now()).unwrap();

    assert_eq!(reminder.scheduled_time, None);
    assert_eq!(reminder.phone_to_call, "+447700900000");
}

#[test]
fn blank_title_is_an_invalid_field_error() {
    let conn = open_db_in_memory().unwrap();
    let err = service(&conn)
        .create_reminder(&draft(" ", ScheduleDraft::unscheduled()), now())
        .unwrap_err();
    assert!(matches!(err, ReminderServiceError::Invalid(_)));
}

#[test]
fn update_revalidates_and_replaces() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let created = service
        .create_reminder(&draft("move me", on(2025, 6, 1, "09:00", "Europe/Paris")), now())
        .unwrap();
    service.mark_failed(created.id, now()).unwrap();

    let later_now = Instant::parse("2025-05-01T00:00:00Z").unwrap();
    let err = service
        .update_reminder(
            created.id,
            &draft("move me", on(2025, 4, 1, "09:00", "Europe/Paris")),
            later_now,
        )
        .unwrap_err();
    assert!(matches!(err, ReminderServiceError::Schedule(_)));

    let updated = service
        .update_reminder(
            created.id,
            &draft("moved", on(2025, 7, 1, "09:00", "Europe/Paris")),
            later_now,
        )
        .unwrap();
    assert_eq!(updated.title, "moved");
    assert_eq!(
        updated.scheduled_time.map(|at| at.to_rfc3339()),
        Some("2025-07-01T07:00:00Z".to_string())
    );
    assert_eq!(updated.status, ReminderStatus::Scheduled);
}

#[test]
fn update_of_missing_reminder_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let err = service(&conn)
        .update_reminder(99, &draft("ghost", ScheduleDraft::unscheduled()), now())
        .unwrap_err();
    assert!(matches!(err, ReminderServiceError::NotFound(99)));
}

#[test]
fn timeline_partitions_against_supplied_now() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let early = service
        .create_reminder(&draft("early", on(2025, 2, 1, "08:00", "UTC")), now())
        .unwrap();
    let loose = service
        .create_reminder(&draft("loose", ScheduleDraft::unscheduled()), now())
        .unwrap();
    let late = service
        .create_reminder(&draft("late", on(2025, 3, 1, "08:00", "UTC")), now())
        .unwrap();

    let ids = |items: &[ringback_core::Reminder]| items.iter().map(|r| r.id).collect::<Vec<_>>();

    let before = service.timeline(now()).unwrap();
    assert_eq!(ids(&before.upcoming), vec![early.id, late.id, loose.id]);
    assert!(before.past.is_empty());

    let after_both = service
        .timeline(Instant::parse("2025-03-02T00:00:00Z").unwrap())
        .unwrap();
    assert_eq!(ids(&after_both.upcoming), vec![loose.id]);
    assert_eq!(ids(&after_both.past), vec![late.id, early.id]);
}

#[test]
fn status_changes_are_visible_in_filtered_lists() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let done = service
        .create_reminder(&draft("done", ScheduleDraft::unscheduled()), now())
        .unwrap();
    service
        .create_reminder(&draft("pending", ScheduleDraft::unscheduled()), now())
        .unwrap();
    service.mark_completed(done.id, now()).unwrap();

    let completed = service
        .list_reminders(&ReminderListQuery {
            status: Some(ReminderStatus::Completed),
            ..ReminderListQuery::default()
        })
        .unwrap();
    assert_eq!(completed.total, 1);
    assert_eq!(completed.items[0].id, done.id);

    service.delete_reminder(done.id).unwrap();
    assert!(matches!(
        service.get_reminder(done.id),
        Err(ReminderServiceError::NotFound(_))
    ));
}
