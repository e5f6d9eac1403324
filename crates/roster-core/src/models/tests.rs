#[cfg(test)]
mod model_tests {
    use jiff::{
        civil::{date, time},
        Timestamp,
    };

    use crate::models::{
        AppointmentStatus, AvailabilitySlot, BackjobStatus, DayOfWeek, NewAppointment, Profile,
    };

    fn profile(name: &str, email: Option<&str>, phone: Option<&str>) -> Profile {
        Profile {
            id: 1,
            full_name: name.to_string(),
            email: email.map(String::from),
            phone: phone.map(String::from),
            location: None,
            created_at: Timestamp::UNIX_EPOCH,
            updated_at: Timestamp::UNIX_EPOCH,
        }
    }

    fn slot(start: (i8, i8), end: (i8, i8)) -> AvailabilitySlot {
        AvailabilitySlot {
            id: 1,
            provider_id: 10,
            day_of_week: DayOfWeek::Monday,
            start_time: time(start.0, start.1, 0, 0),
            end_time: time(end.0, end.1, 0, 0),
            active: true,
            created_at: Timestamp::UNIX_EPOCH,
            updated_at: Timestamp::UNIX_EPOCH,
        }
    }

    #[test]
    fn status_spellings_normalise_to_one_variant() {
        let cases = [
            ("Pending", AppointmentStatus::Pending),
            ("SCHEDULED", AppointmentStatus::Scheduled),
            ("on-the-way", AppointmentStatus::OnTheWay),
            ("On The Way", AppointmentStatus::OnTheWay),
            ("ontheway", AppointmentStatus::OnTheWay),
            ("InProgress", AppointmentStatus::InProgress),
            ("in_progress", AppointmentStatus::InProgress),
            ("canceled", AppointmentStatus::Cancelled),
            ("provider_no_show", AppointmentStatus::ProviderNoShow),
            ("no-show", AppointmentStatus::NoShow),
        ];
        for (raw, expected) in cases {
            assert_eq!(raw.parse::<AppointmentStatus>().unwrap(), expected, "{raw}");
        }
        assert!("booked".parse::<AppointmentStatus>().is_err());
    }

    #[test]
    fn stored_form_parses_back() {
        for status in AppointmentStatus::ALL {
            assert_eq!(status.as_str().parse::<AppointmentStatus>().unwrap(), status);
        }
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&AppointmentStatus::ProviderNoShow).unwrap();
        assert_eq!(json, "\"provider_no_show\"");
        let status: AppointmentStatus = serde_json::from_str("\"on_the_way\"").unwrap();
        assert_eq!(status, AppointmentStatus::OnTheWay);
    }

    #[test]
    fn status_classes() {
        let active: Vec<_> = AppointmentStatus::ALL
            .into_iter()
            .filter(AppointmentStatus::is_active)
            .collect();
        assert_eq!(
            active,
            vec![
                AppointmentStatus::Pending,
                AppointmentStatus::Scheduled,
                AppointmentStatus::Accepted,
                AppointmentStatus::Approved,
                AppointmentStatus::Confirmed,
                AppointmentStatus::OnTheWay,
                AppointmentStatus::InProgress,
            ]
        );

        for status in AppointmentStatus::ALL {
            assert!(
                !(status.is_active() && status.is_terminal()),
                "{status:?} cannot be both active and terminal"
            );
            if status.is_cancellable() {
                assert!(status.is_active());
            }
        }
        assert!(!AppointmentStatus::Finished.is_active());
        assert!(!AppointmentStatus::Finished.is_terminal());
        assert!(!AppointmentStatus::OnTheWay.is_cancellable());
    }

    #[test]
    fn backjob_open_states() {
        assert!(BackjobStatus::Pending.is_open());
        assert!(BackjobStatus::Approved.is_open());
        assert!(!BackjobStatus::Completed.is_open());
        assert_eq!("APPROVED".parse::<BackjobStatus>().unwrap(), BackjobStatus::Approved);
    }

    #[test]
    fn touching_ranges_overlap() {
        let nine_to_ten = slot((9, 0), (10, 0));
        assert!(nine_to_ten.touches(time(10, 0, 0, 0), time(11, 0, 0, 0)));
        assert!(nine_to_ten.touches(time(8, 0, 0, 0), time(9, 0, 0, 0)));
        assert!(nine_to_ten.touches(time(9, 30, 0, 0), time(9, 45, 0, 0)));
        assert!(nine_to_ten.touches(time(8, 0, 0, 0), time(12, 0, 0, 0)));
        assert!(!nine_to_ten.touches(time(10, 1, 0, 0), time(11, 0, 0, 0)));
        assert!(!nine_to_ten.touches(time(7, 0, 0, 0), time(8, 59, 0, 0)));
    }

    #[test]
    fn same_person_needs_name_and_contact() {
        let alice = profile("Alice Smith", Some("alice@example.com"), Some("+1 555 0100"));

        let twin = profile("alice smith ", Some("ALICE@example.com"), None);
        assert!(alice.same_person_as(&twin));

        let by_phone = profile("ALICE SMITH", None, Some("1-555-0100"));
        assert!(alice.same_person_as(&by_phone));

        let namesake = profile("Alice Smith", Some("other@example.com"), Some("999"));
        assert!(!alice.same_person_as(&namesake));

        let different_name = profile("Bob Jones", Some("alice@example.com"), None);
        assert!(!alice.same_person_as(&different_name));

        let no_contacts = profile("Alice Smith", None, None);
        assert!(!alice.same_person_as(&no_contacts));
    }

    #[test]
    fn new_appointment_initial_status_and_datetime() {
        let mut request = NewAppointment {
            customer_id: 2,
            provider_id: 1,
            service_id: 3,
            date: date(2025, 1, 6),
            time: time(9, 0, 0, 0),
            description: None,
            auto_accept: false,
        };
        assert_eq!(request.initial_status(), AppointmentStatus::Pending);
        assert_eq!(
            request.scheduled_date(),
            date(2025, 1, 6).at(9, 0, 0, 0)
        );

        request.auto_accept = true;
        assert_eq!(request.initial_status(), AppointmentStatus::Accepted);
    }
}
