//! Cancellation patterns that earn a customer a penalty.

use jiff::{civil::DateTime, SignedDuration};

use crate::models::{Appointment, PenaltyKind};

/// A detected pattern with a human-readable explanation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub kind: PenaltyKind,
    pub detail: String,
}

/// Looks for late, same-day and consecutive-day cancellations.
///
/// `cancelled_at` and `earlier` are local wall-clock times. `earlier` holds
/// the customer's other cancellations and must not include this one.
pub fn detect(
    appointment: &Appointment,
    cancelled_at: DateTime,
    earlier: &[DateTime],
    late_window: SignedDuration,
) -> Vec<Finding> {
    let mut findings = Vec::new();

    let until_start = cancelled_at.duration_until(appointment.scheduled_date);
    if until_start < late_window {
        findings.push(Finding {
            kind: PenaltyKind::LateCancellation,
            detail: format!(
                "Cancelled {} minute(s) before the {} start",
                until_start.as_mins(),
                appointment.scheduled_date
            ),
        });
    }

    let today = cancelled_at.date();
    let same_day = earlier.iter().filter(|at| at.date() == today).count();
    if same_day > 0 {
        findings.push(Finding {
            kind: PenaltyKind::SameDayCancellations,
            detail: format!("{} cancellations on {today}", same_day + 1),
        });
    }

    if let Ok(yesterday) = today.yesterday() {
        if earlier.iter().any(|at| at.date() == yesterday) {
            findings.push(Finding {
                kind: PenaltyKind::ConsecutiveDayCancellations,
                detail: format!("Cancelled on {yesterday} and {today}"),
            });
        }
    }

    findings
}

#[cfg(test)]
mod tests {
    use jiff::{civil::date, Timestamp};

    use super::*;
    use crate::models::AppointmentStatus;

    fn appointment_at(at: DateTime) -> Appointment {
        Appointment {
            id: 1,
            customer_id: 2,
            provider_id: 3,
            availability_slot_id: Some(1),
            service_id: 1,
            scheduled_date: at,
            status: AppointmentStatus::Cancelled,
            description: None,
            final_price: None,
            cancellation_reason: None,
            cancelled_at: None,
            no_show_evidence_url: None,
            no_show_description: None,
            created_at: Timestamp::UNIX_EPOCH,
            updated_at: Timestamp::UNIX_EPOCH,
        }
    }

    fn kinds(findings: &[Finding]) -> Vec<PenaltyKind> {
        findings.iter().map(|f| f.kind).collect()
    }

    #[test]
    fn late_cancellation_inside_window() {
        let appt = appointment_at(date(2025, 1, 6).at(9, 0, 0, 0));
        let window = SignedDuration::from_hours(2);

        let late = detect(&appt, date(2025, 1, 6).at(7, 30, 0, 0), &[], window);
        assert_eq!(kinds(&late), vec![PenaltyKind::LateCancellation]);
        assert!(late[0].detail.contains("90 minute(s)"));

        let early = detect(&appt, date(2025, 1, 6).at(7, 0, 0, 0), &[], window);
        assert!(early.is_empty());
    }

    #[test]
    fn repeated_cancellations_on_one_day() {
        let appt = appointment_at(date(2025, 1, 20).at(9, 0, 0, 0));
        let earlier = [date(2025, 1, 6).at(8, 0, 0, 0)];

        let findings = detect(
            &appt,
            date(2025, 1, 6).at(12, 0, 0, 0),
            &earlier,
            SignedDuration::from_hours(2),
        );
        assert_eq!(kinds(&findings), vec![PenaltyKind::SameDayCancellations]);
        assert_eq!(findings[0].detail, "2 cancellations on 2025-01-06");
    }

    #[test]
    fn cancellations_on_consecutive_days() {
        let appt = appointment_at(date(2025, 1, 20).at(9, 0, 0, 0));
        let earlier = [date(2025, 1, 5).at(23, 0, 0, 0), date(2025, 1, 1).at(9, 0, 0, 0)];

        let findings = detect(
            &appt,
            date(2025, 1, 6).at(0, 30, 0, 0),
            &earlier,
            SignedDuration::from_hours(2),
        );
        assert_eq!(
            kinds(&findings),
            vec![PenaltyKind::ConsecutiveDayCancellations]
        );
    }
}
