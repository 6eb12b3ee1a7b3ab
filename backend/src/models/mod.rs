//! Domain models for the attendance pipeline.
//!
//! - [`AttendanceRecord`] - one cleaned export row
//! - [`SessionDate`] - calendar date of a class session, or the unparseable sentinel
//! - [`ParsedRecord`] - a record paired with its session date
//! - [`StudentEntry`] - attendee projection used in class summaries
//! - [`ClassSummary`] / [`DaySummary`] - the nested output
//! - [`AttendanceReport`] - date key -> day summary, in first-seen order

use chrono::NaiveDate;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::collections::HashMap;

use crate::transform::timestamp::weekday_name;

/// Date key used for rows whose start timestamp could not be parsed.
pub const UNKNOWN_DATE_KEY: &str = "unknown";

// =============================================================================
// Attendance Record
// =============================================================================

/// One row of the attendance export after cleaning.
///
/// Every field is a plain string; missing cells are `""`.
/// `start_time` and `end_time` no longer carry the timezone suffix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AttendanceRecord {
    #[serde(rename = "User ID")]
    pub user_id: String,
    #[serde(rename = "First Name")]
    pub first_name: String,
    #[serde(rename = "Middle Name")]
    pub middle_name: String,
    #[serde(rename = "Last Name")]
    pub last_name: String,
    #[serde(rename = "Class ID")]
    pub class_id: String,
    #[serde(rename = "Course ID")]
    pub course_id: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Start Date/Time")]
    pub start_time: String,
    #[serde(rename = "End Date/Time")]
    pub end_time: String,
    #[serde(rename = "Venue")]
    pub venue: String,
    #[serde(rename = "Instructor First Name")]
    pub instructor_first_name: String,
    #[serde(rename = "Instructor Last Name")]
    pub instructor_last_name: String,
}

impl AttendanceRecord {
    /// Instructor display name: first and last name joined by one space.
    pub fn instructor(&self) -> String {
        format!("{} {}", self.instructor_first_name, self.instructor_last_name)
    }

    pub fn student(&self) -> StudentEntry {
        StudentEntry {
            user_id: self.user_id.clone(),
            first_name: self.first_name.clone(),
            middle_name: self.middle_name.clone(),
            last_name: self.last_name.clone(),
        }
    }
}

// =============================================================================
// Session Date
// =============================================================================

/// Calendar date derived from a record's start timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionDate {
    Day(NaiveDate),
    /// The start timestamp was empty or did not match the expected format.
    Unparseable,
}

impl SessionDate {
    /// Grouping key: ISO-8601 `YYYY-MM-DD`, or [`UNKNOWN_DATE_KEY`].
    pub fn key(&self) -> String {
        match self {
            SessionDate::Day(date) => date.format("%Y-%m-%d").to_string(),
            SessionDate::Unparseable => UNKNOWN_DATE_KEY.to_string(),
        }
    }

    /// English weekday name, empty for the sentinel.
    pub fn day_name(&self) -> String {
        match self {
            SessionDate::Day(date) => weekday_name(*date).to_string(),
            SessionDate::Unparseable => String::new(),
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, SessionDate::Day(_))
    }
}

/// A cleaned record together with its derived session date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRecord {
    pub record: AttendanceRecord,
    pub date: SessionDate,
}

// =============================================================================
// Output Structure
// =============================================================================

/// One attendee of a class session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentEntry {
    #[serde(rename = "User ID")]
    pub user_id: String,
    #[serde(rename = "First Name")]
    pub first_name: String,
    #[serde(rename = "Middle Name")]
    pub middle_name: String,
    #[serde(rename = "Last Name")]
    pub last_name: String,
}

/// Summary of one class on one day.
///
/// Descriptive fields come from the first record of the bucket.
/// `student_count` is kept equal to `students.len()` by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassSummary {
    pub title: String,
    pub start_time: String,
    pub end_time: String,
    pub venue: String,
    pub instructor: String,
    students: Vec<StudentEntry>,
    student_count: usize,
}

impl ClassSummary {
    /// Start a summary using `representative` for the shared fields.
    /// The representative itself is not added as a student.
    pub fn from_representative(representative: &AttendanceRecord) -> Self {
        Self {
            title: representative.title.clone(),
            start_time: representative.start_time.clone(),
            end_time: representative.end_time.clone(),
            venue: representative.venue.clone(),
            instructor: representative.instructor(),
            students: Vec::new(),
            student_count: 0,
        }
    }

    pub fn push_student(&mut self, student: StudentEntry) {
        self.students.push(student);
        self.student_count = self.students.len();
    }

    pub fn students(&self) -> &[StudentEntry] {
        &self.students
    }

    pub fn student_count(&self) -> usize {
        self.student_count
    }
}

/// All classes held on one calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DaySummary {
    pub day: String,
    pub classes: OrderedMap<ClassSummary>,
}

impl DaySummary {
    pub fn new(day: String) -> Self {
        Self {
            day,
            classes: OrderedMap::new(),
        }
    }
}

/// The full nested structure served by `/attendance`.
pub type AttendanceReport = OrderedMap<DaySummary>;

// =============================================================================
// Ordered Map
// =============================================================================

/// String-keyed map that remembers insertion order.
///
/// Serializes as a JSON object whose keys appear in first-inserted order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedMap<V> {
    entries: Vec<(String, V)>,
    index: HashMap<String, usize>,
}

impl<V> OrderedMap<V> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Mutable access to `key`, inserting `make()` at the end if absent.
    pub fn get_or_insert_with(&mut self, key: &str, make: impl FnOnce() -> V) -> &mut V {
        let pos = match self.index.get(key) {
            Some(&pos) => pos,
            None => {
                self.entries.push((key.to_string(), make()));
                let pos = self.entries.len() - 1;
                self.index.insert(key.to_string(), pos);
                pos
            }
        };
        &mut self.entries[pos].1
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.index.get(key).map(|&pos| &self.entries[pos].1)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

// =============================================================================
// Tests
// =============================================================================
