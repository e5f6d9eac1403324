use jiff::{
    civil::{date, time},
    Timestamp,
};
use roster_core::{
    availability::BookingWindow,
    db::appointment_queries::BookingRules,
    models::{
        AppointmentFilter, AppointmentStatus, DayOfWeek, NewAppointment, NewSlot, PenaltyKind,
        ProfileUpdate, SlotState, UpdateSlotRequest,
    },
    BookingError, Database,
};
use tempfile::NamedTempFile;

/// Helper function to create a temporary database for testing
fn create_test_db() -> (NamedTempFile, Database) {
    let temp_file = NamedTempFile::new().expect("Failed to create temporary file");
    let db = Database::new(temp_file.path()).expect("Failed to create test database");
    (temp_file, db)
}

fn now() -> Timestamp {
    "2025-01-01T08:00:00Z".parse().unwrap()
}

/// Wednesday 2025-01-01 08:00 with a 15:00 cutoff and a cap of three.
fn rules() -> BookingRules {
    BookingRules {
        window: BookingWindow::new(date(2025, 1, 1).at(8, 0, 0, 0), 15),
        max_scheduled: 3,
    }
}

fn person(db: &mut Database, id: u64, name: &str) {
    db.upsert_profile(
        &ProfileUpdate {
            id,
            full_name: name.to_string(),
            email: None,
            phone: None,
            location: None,
        },
        now(),
    )
    .expect("Failed to save profile");
}

fn monday_slot(db: &mut Database, start: i8, end: i8) -> u64 {
    db.add_slot(
        &NewSlot {
            provider_id: 1,
            day_of_week: DayOfWeek::Monday,
            start_time: time(start, 0, 0, 0),
            end_time: time(end, 0, 0, 0),
        },
        now(),
    )
    .expect("Failed to add slot")
    .id
}

fn booking(customer_id: u64, day: i8, hour: i8) -> NewAppointment {
    NewAppointment {
        customer_id,
        provider_id: 1,
        service_id: 7,
        date: date(2025, 1, day),
        time: time(hour, 0, 0, 0),
        description: None,
        auto_accept: false,
    }
}

fn setup() -> (NamedTempFile, Database) {
    let (file, mut db) = create_test_db();
    person(&mut db, 1, "Alice Reyes");
    person(&mut db, 2, "Bob Cruz");
    person(&mut db, 3, "Carol Santos");
    (file, db)
}

#[test]
fn test_database_initialization() {
    let (temp_file, _db) = create_test_db();
    assert!(temp_file.path().exists());

    // reopening runs the idempotent schema again
    Database::new(temp_file.path()).expect("Failed to reopen database");
}

#[test]
fn test_open_skips_schema_setup() {
    let fresh = NamedTempFile::new().unwrap();
    Database::open(fresh.path()).expect("Failed to open database");
    let raw = rusqlite::Connection::open(fresh.path()).unwrap();
    let version: i64 = raw
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .unwrap();
    let tables: i64 = raw
        .query_row("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!((version, tables), (0, 0));

    let (file, mut db) = create_test_db();
    let slot = db
        .add_slot(
            &NewSlot {
                provider_id: 1,
                day_of_week: DayOfWeek::Monday,
                start_time: time(9, 0, 0, 0),
                end_time: time(10, 0, 0, 0),
            },
            now(),
        )
        .unwrap();

    let reopened = Database::open(file.path()).unwrap();
    assert_eq!(reopened.get_slot(slot.id).unwrap(), Some(slot));
}

#[test]
fn test_slot_crud() {
    let (_file, mut db) = setup();

    let id = monday_slot(&mut db, 9, 10);
    let slot = db.get_slot(id).unwrap().expect("Slot should exist");
    assert_eq!(slot.day_of_week, DayOfWeek::Monday);
    assert!(slot.active);

    let updated = db
        .update_slot(
            id,
            1,
            &UpdateSlotRequest {
                end_time: Some(time(11, 0, 0, 0)),
                ..Default::default()
            },
            now(),
        )
        .unwrap();
    assert_eq!(updated.end_time, time(11, 0, 0, 0));
    assert_eq!(db.get_slot(id).unwrap().unwrap().end_time, time(11, 0, 0, 0));

    let err = db
        .update_slot(
            id,
            2,
            &UpdateSlotRequest {
                active: Some(false),
                ..Default::default()
            },
            now(),
        )
        .unwrap_err();
    assert!(matches!(err, BookingError::Forbidden { actor_id: 2, .. }));

    db.delete_slot(id, 1).unwrap();
    assert!(db.get_slot(id).unwrap().is_none());
    assert!(matches!(
        db.delete_slot(id, 1),
        Err(BookingError::NotFound { entity: "Slot", .. })
    ));
}

#[test]
fn test_booking_and_availability() {
    let (_file, mut db) = setup();
    let slot_id = monday_slot(&mut db, 9, 10);

    let appt = db
        .create_appointment(&booking(2, 6, 9), &rules(), now())
        .unwrap();
    assert!(appt.id > 0);
    assert_eq!(appt.availability_slot_id, Some(slot_id));
    assert_eq!(appt.status, AppointmentStatus::Pending);
    assert_eq!(appt.scheduled_date, date(2025, 1, 6).at(9, 0, 0, 0));

    let monday = db
        .resolve_availability(1, date(2025, 1, 6), &rules().window)
        .unwrap();
    assert_eq!(monday[0].status, SlotState::Booked);

    let next = db
        .resolve_availability(1, date(2025, 1, 13), &rules().window)
        .unwrap();
    assert_eq!(next[0].status, SlotState::Available);

    let err = db
        .create_appointment(&booking(3, 6, 9), &rules(), now())
        .unwrap_err();
    assert!(matches!(err, BookingError::SlotAlreadyBooked { .. }));

    let fetched = db.get_appointment(appt.id).unwrap();
    assert_eq!(fetched, appt);
}

#[test]
fn test_unique_index_rejects_second_active_row() {
    let (file, mut db) = setup();
    let slot_id = monday_slot(&mut db, 9, 10);
    db.create_appointment(&booking(2, 6, 9), &rules(), now())
        .unwrap();

    // bypass the application checks entirely
    let raw = rusqlite::Connection::open(file.path()).unwrap();
    let insert = |status: &str| {
        raw.execute(
            "INSERT INTO appointments (customer_id, provider_id, availability_slot_id, service_id, scheduled_date, scheduled_day, status, created_at, updated_at) VALUES (3, 1, ?1, 7, '2025-01-06T09:00:00', '2025-01-06', ?2, 'x', 'x')",
            rusqlite::params![slot_id as i64, status],
        )
    };

    let err = insert("accepted").unwrap_err();
    assert_eq!(
        err.sqlite_error_code(),
        Some(rusqlite::ErrorCode::ConstraintViolation)
    );

    // inactive rows never collide
    insert("cancelled").unwrap();
    insert("completed").unwrap();
}

#[test]
fn test_cancel_frees_the_slot() {
    let (_file, mut db) = setup();
    monday_slot(&mut db, 9, 10);
    let appt = db
        .create_appointment(&booking(2, 6, 9), &rules(), now())
        .unwrap();

    let cancelled = db
        .cancel_appointment(appt.id, 2, Some("sick"), now())
        .unwrap();
    assert_eq!(cancelled.status, AppointmentStatus::Cancelled);
    assert_eq!(cancelled.cancellation_reason.as_deref(), Some("sick"));
    assert_eq!(cancelled.cancelled_at, Some(now()));

    let rebooked = db
        .create_appointment(&booking(3, 6, 9), &rules(), now())
        .unwrap();
    assert_eq!(rebooked.customer_id, 3);

    let cancellations = db
        .cancellations_since(2, 0, "2024-12-31T00:00:00Z".parse().unwrap())
        .unwrap();
    assert_eq!(cancellations, vec![now()]);
    assert!(db.cancellations_since(2, appt.id, now()).unwrap().is_empty());
}

#[test]
fn test_list_appointments_filters() {
    let (_file, mut db) = setup();
    monday_slot(&mut db, 9, 10);
    monday_slot(&mut db, 11, 12);

    let later = db
        .create_appointment(&booking(2, 13, 9), &rules(), now())
        .unwrap();
    let sooner = db
        .create_appointment(&booking(3, 6, 11), &rules(), now())
        .unwrap();

    let all = db.list_appointments(&AppointmentFilter::default()).unwrap();
    let ids: Vec<u64> = all.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![sooner.id, later.id]);

    let bob = db
        .list_appointments(&AppointmentFilter {
            customer_id: Some(2),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(bob.len(), 1);
    assert_eq!(bob[0].id, later.id);

    let cancelled = db
        .list_appointments(&AppointmentFilter {
            status: Some(AppointmentStatus::Cancelled),
            ..Default::default()
        })
        .unwrap();
    assert!(cancelled.is_empty());
}

#[test]
fn test_penalties_are_unique_per_kind() {
    let (_file, mut db) = setup();

    assert!(db
        .record_penalty(2, 9, PenaltyKind::LateCancellation, "late", now())
        .unwrap());
    assert!(!db
        .record_penalty(2, 9, PenaltyKind::LateCancellation, "late again", now())
        .unwrap());
    assert!(db
        .record_penalty(2, 9, PenaltyKind::SameDayCancellations, "twice", now())
        .unwrap());

    let penalties = db.list_penalties(2).unwrap();
    assert_eq!(penalties.len(), 2);
    assert_eq!(penalties[0].detail, "late");
    assert!(db.list_penalties(3).unwrap().is_empty());
}

#[test]
fn test_profiles_round_trip_location() {
    let (_file, mut db) = create_test_db();

    let saved = db
        .upsert_profile(
            &ProfileUpdate {
                id: 5,
                full_name: "Dana Lim".to_string(),
                email: Some("dana@example.com".to_string()),
                phone: None,
                location: Some(roster_core::models::GeoPoint {
                    latitude: 14.6,
                    longitude: 121.0,
                }),
            },
            now(),
        )
        .unwrap();
    assert_eq!(db.get_profile(5).unwrap(), Some(saved));
    assert!(db.get_profile(6).unwrap().is_none());

    // no slots yet, so not offered
    assert!(db.located_providers().unwrap().is_empty());
}
