//! Group flat attendance rows into the nested date -> class -> students report.
//!
//! # Architecture
//!
//! ```text
//! Flat rows                                  Nested report
//! ┌──────────────────────────────┐          ┌──────────────────────────────┐
//! │ 2024-07-14, C1, U1           │          │ 2024-07-14 (Sunday)          │
//! │ 2024-07-14, C1, U2           │    →     │   C1: [U1, U2]  count 2      │
//! │ 2024-07-15, C7, U1           │          │ 2024-07-15 (Monday)          │
//! └──────────────────────────────┘          │   C7: [U1]      count 1      │
//!                                           └──────────────────────────────┘
//! ```
//!
//! Dates and classes appear in the order their first row appears in the input.
//! The first row of each (date, class) bucket supplies title, times, venue and
//! instructor; every row, duplicates included, becomes a student entry.

use crate::models::{AttendanceReport, ClassSummary, DaySummary, ParsedRecord};

/// Build the nested report from dated rows, in input order.
pub fn group_attendance(records: &[ParsedRecord]) -> AttendanceReport {
    let mut report = AttendanceReport::new();

    for parsed in records {
        let day = report.get_or_insert_with(&parsed.date.key(), || {
            DaySummary::new(parsed.date.day_name())
        });

        let class = day
            .classes
            .get_or_insert_with(&parsed.record.class_id, || {
                ClassSummary::from_representative(&parsed.record)
            });

        class.push_student(parsed.record.student());
    }

    report
}
