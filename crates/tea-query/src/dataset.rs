//! Tracked entity records and their enrollments and events.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tea_model::Uid;

use crate::catalog::Catalog;
use crate::error::LoadError;

/// Author of a change as recorded on a tracked entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserInfo {
    pub username: String,
    pub first_name: String,
    pub surname: String,
}

impl UserInfo {
    /// `Surname, First (username)`; empty parts are kept as empty text.
    pub fn display_name(&self) -> String {
        format!("{}, {} ({})", self.surname, self.first_name, self.username)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub longitude: f64,
    pub latitude: f64,
}

impl Point {
    pub fn to_geojson(&self) -> String {
        format!(
            r#"{{"type":"Point","coordinates":[{},{}]}}"#,
            self.longitude, self.latitude
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnrollmentStatus {
    Active,
    Completed,
    Cancelled,
}

impl EnrollmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrollmentStatus::Active => "ACTIVE",
            EnrollmentStatus::Completed => "COMPLETED",
            EnrollmentStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "ACTIVE" => Some(Self::Active),
            "COMPLETED" => Some(Self::Completed),
            "CANCELLED" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    Active,
    Completed,
    Visited,
    #[serde(rename = "SCHEDULE", alias = "SCHEDULED")]
    Scheduled,
    Overdue,
    Skipped,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Active => "ACTIVE",
            EventStatus::Completed => "COMPLETED",
            EventStatus::Visited => "VISITED",
            EventStatus::Scheduled => "SCHEDULE",
            EventStatus::Overdue => "OVERDUE",
            EventStatus::Skipped => "SKIPPED",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub uid: Uid,
    pub program_stage: Uid,
    pub org_unit: Uid,
    pub status: EventStatus,
    #[serde(default)]
    pub occurred_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub scheduled_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub deleted: bool,
    /// Captured values by data element uid.
    #[serde(default)]
    pub data_values: BTreeMap<Uid, String>,
}

impl Event {
    /// Date used to order occurrences of a stage.
    pub fn ordering_date(&self) -> Option<NaiveDateTime> {
        self.occurred_date.or(self.scheduled_date)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub uid: Uid,
    pub program: Uid,
    pub org_unit: Uid,
    pub status: EnrollmentStatus,
    pub enrollment_date: NaiveDateTime,
    #[serde(default)]
    pub incident_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub events: Vec<Event>,
}

impl Enrollment {
    /// Live events of a stage, oldest first.
    pub fn stage_events(&self, stage: &Uid) -> Vec<&Event> {
        let mut events: Vec<&Event> = self
            .events
            .iter()
            .filter(|event| !event.deleted && &event.program_stage == stage)
            .collect();
        events.sort_by_key(|event| event.ordering_date());
        events
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedEntity {
    pub uid: Uid,
    pub tracked_entity_type: Uid,
    pub org_unit: Uid,
    pub created: NaiveDateTime,
    pub last_updated: NaiveDateTime,
    #[serde(default)]
    pub created_by: Option<UserInfo>,
    #[serde(default)]
    pub last_updated_by: Option<UserInfo>,
    #[serde(default)]
    pub stored_by: Option<String>,
    #[serde(default)]
    pub geometry: Option<Point>,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub attributes: BTreeMap<Uid, String>,
    #[serde(default)]
    pub enrollments: Vec<Enrollment>,
}

impl TrackedEntity {
    /// Live enrollments in a program, oldest first.
    pub fn program_enrollments(&self, program: &Uid) -> Vec<&Enrollment> {
        let mut enrollments: Vec<&Enrollment> = self
            .enrollments
            .iter()
            .filter(|enrollment| !enrollment.deleted && &enrollment.program == program)
            .collect();
        enrollments.sort_by_key(|enrollment| enrollment.enrollment_date);
        enrollments
    }
}

/// Select one occurrence from a list ordered oldest first.
///
/// `0` is the most recent, `-k` steps back `k` occurrences from it and a
/// positive `n` is the n-th occurrence from the oldest.
pub fn select_occurrence<T: Copy>(occurrences: &[T], offset: i32) -> Option<T> {
    let len = occurrences.len();
    let index = match offset {
        0 => len.checked_sub(1)?,
        n if n < 0 => len.checked_sub(1)?.checked_sub(n.unsigned_abs() as usize)?,
        n => (n as usize) - 1,
    };
    occurrences.get(index).copied()
}

/// Catalog plus the tracked entities it describes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    #[serde(default)]
    pub catalog: Catalog,
    #[serde(default)]
    pub tracked_entities: Vec<TrackedEntity>,
}

impl Dataset {
    pub fn from_json_str(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(contents)
    }

    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let contents = std::fs::read_to_string(path).map_err(|e| LoadError::io(path, e))?;
        Self::from_json_str(&contents).map_err(|e| LoadError::Json {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn occurrence_offsets() {
        let events = [1, 2, 3];
        assert_eq!(select_occurrence(&events, 0), Some(3));
        assert_eq!(select_occurrence(&events, -1), Some(2));
        assert_eq!(select_occurrence(&events, -2), Some(1));
        assert_eq!(select_occurrence(&events, -3), None);
        assert_eq!(select_occurrence(&events, 1), Some(1));
        assert_eq!(select_occurrence(&events, 3), Some(3));
        assert_eq!(select_occurrence(&events, 4), None);
        assert_eq!(select_occurrence::<i32>(&[], 0), None);
    }

    #[test]
    fn user_display_name_keeps_empty_parts() {
        assert_eq!(UserInfo::default().display_name(), ",  ()");
        let user = UserInfo {
            username: "admin".to_string(),
            first_name: "John".to_string(),
            surname: "Traore".to_string(),
        };
        assert_eq!(user.display_name(), "Traore, John (admin)");
    }

    #[test]
    fn point_geojson() {
        let point = Point {
            longitude: -11.7,
            latitude: 8.2,
        };
        assert_eq!(
            point.to_geojson(),
            r#"{"type":"Point","coordinates":[-11.7,8.2]}"#
        );
    }
}
