//! Attendance session and record models.
//!
//! A classroom moves through `no active session -> active -> ended`, and a new
//! session may be started once the previous one has ended. Records only ever
//! carry [`AttendanceStatus::Present`]; the absent and late variants exist for the
//! legacy direct-mark path.

use chrono::{DateTime, Days, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::ids::{AttendanceMarkId, AttendanceRecordId, AttendanceSessionId, ClassroomId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "session_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "attendance_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AttendanceSession {
    pub id: AttendanceSessionId,
    pub classroom_id: ClassroomId,
    pub created_by: UserId,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub status: SessionStatus,
}

impl AttendanceSession {
    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AttendanceRecord {
    pub id: AttendanceRecordId,
    pub session_id: AttendanceSessionId,
    pub student_id: UserId,
    pub status: AttendanceStatus,
    pub marked_at: DateTime<Utc>,
}

/// The student a record belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StudentInfo {
    pub id: UserId,
    pub email: String,
    pub student_id: Option<String>,
}

/// Record joined with its student, as stored rows come back from the database.
#[derive(Debug, Clone, FromRow)]
pub struct AttendanceRecordRow {
    pub id: AttendanceRecordId,
    pub session_id: AttendanceSessionId,
    pub user_id: UserId,
    pub email: String,
    pub student_number: Option<String>,
    pub status: AttendanceStatus,
    pub marked_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AttendanceRecordWithStudent {
    pub id: AttendanceRecordId,
    pub session_id: AttendanceSessionId,
    pub student: StudentInfo,
    pub status: AttendanceStatus,
    pub marked_at: DateTime<Utc>,
}

impl From<AttendanceRecordRow> for AttendanceRecordWithStudent {
    fn from(row: AttendanceRecordRow) -> Self {
        Self {
            id: row.id,
            session_id: row.session_id,
            student: StudentInfo {
                id: row.user_id,
                email: row.email,
                student_id: row.student_number,
            },
            status: row.status,
            marked_at: row.marked_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionWithRecords {
    #[serde(flatten)]
    pub session: AttendanceSession,
    pub records: Vec<AttendanceRecordWithStudent>,
}

/// `?date=YYYY-MM-DD` filter for history listings.
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct HistoryFilterParams {
    /// Calendar day (UTC) to restrict results to.
    #[param(example = "2025-09-01")]
    pub date: Option<String>,
}

impl HistoryFilterParams {
    /// The parsed day, if one was given.
    pub fn day(&self) -> Result<Option<NaiveDate>, chrono::ParseError> {
        match self.date.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => parse_day(raw).map(Some),
        }
    }
}

pub fn parse_day(raw: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
}

/// Half-open UTC bounds `[start, end)` covering `day`.
pub fn utc_day_bounds(day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = Utc.from_utc_datetime(&day.and_time(NaiveTime::MIN));
    let end = start
        .checked_add_days(Days::new(1))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    (start, end)
}

/// Body of a legacy direct mark.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LegacyMarkDto {
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AttendanceMark {
    pub id: AttendanceMarkId,
    pub classroom_id: ClassroomId,
    pub user_id: UserId,
    pub email: String,
    pub status: AttendanceStatus,
    pub marked_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_filter_parsing() {
        let none = HistoryFilterParams { date: None };
        assert_eq!(none.day().unwrap(), None);

        let blank = HistoryFilterParams {
            date: Some(" ".to_string()),
        };
        assert_eq!(blank.day().unwrap(), None);

        let day = HistoryFilterParams {
            date: Some("2025-09-01".to_string()),
        };
        assert_eq!(day.day().unwrap(), NaiveDate::from_ymd_opt(2025, 9, 1));

        let bad = HistoryFilterParams {
            date: Some("09/01/2025".to_string()),
        };
        assert!(bad.day().is_err());
    }

    #[test]
    fn test_utc_day_bounds() {
        let day = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
        let (start, end) = utc_day_bounds(day);

        assert_eq!(start.to_rfc3339(), "2025-12-31T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2026-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_record_row_nests_student() {
        let row = AttendanceRecordRow {
            id: AttendanceRecordId::new(),
            session_id: AttendanceSessionId::new(),
            user_id: UserId::new(),
            email: "s@x.com".to_string(),
            student_number: Some("s".to_string()),
            status: AttendanceStatus::Present,
            marked_at: Utc::now(),
        };

        let record = AttendanceRecordWithStudent::from(row);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["student"]["email"], "s@x.com");
        assert_eq!(json["student"]["student_id"], "s");
        assert_eq!(json["status"], "present");
    }

    #[test]
    fn test_legacy_mark_status_values() {
        for status in ["present", "absent", "late"] {
            let body = format!(r#"{{"status":"{}"}}"#, status);
            assert!(serde_json::from_str::<LegacyMarkDto>(&body).is_ok());
        }
        assert!(serde_json::from_str::<LegacyMarkDto>(r#"{"status":"excused"}"#).is_err());
    }
}
