use anyhow::anyhow;
use chrono::NaiveDate;
use sqlx::PgPool;
use tracing::{info, instrument};

use rollcall_core::AppError;
use rollcall_models::ids::{ClassroomId, UserId};

use crate::metrics;
use crate::modules::classrooms::service::is_member;

use super::model::{AttendanceMark, AttendanceStatus, utc_day_bounds};

pub struct LegacyAttendanceService;

impl LegacyAttendanceService {
    /// Appends a mark. Repeated marks are kept; the latest one wins for readers.
    #[instrument(skip(db))]
    pub async fn mark(
        db: &PgPool,
        classroom_id: ClassroomId,
        user_id: UserId,
        status: AttendanceStatus,
    ) -> Result<AttendanceMark, AppError> {
        ensure_member(db, classroom_id, user_id).await?;

        let mark = sqlx::query_as::<_, AttendanceMark>(
            "WITH inserted AS (
                 INSERT INTO attendance_marks (classroom_id, user_id, status)
                 VALUES ($1, $2, $3)
                 RETURNING id, classroom_id, user_id, status, marked_at
             )
             SELECT i.id, i.classroom_id, i.user_id, u.email, i.status, i.marked_at
             FROM inserted i
             JOIN users u ON u.id = i.user_id",
        )
        .bind(classroom_id)
        .bind(user_id)
        .bind(status)
        .fetch_one(db)
        .await?;

        metrics::track_attendance_marked("legacy");
        info!(mark.id = %mark.id, "Legacy attendance mark recorded");

        Ok(mark)
    }

    #[instrument(skip(db))]
    pub async fn list(
        db: &PgPool,
        classroom_id: ClassroomId,
        user_id: UserId,
        day: Option<NaiveDate>,
    ) -> Result<Vec<AttendanceMark>, AppError> {
        ensure_member(db, classroom_id, user_id).await?;

        let (from, until) = match day.map(utc_day_bounds) {
            Some((from, until)) => (Some(from), Some(until)),
            None => (None, None),
        };

        let marks = sqlx::query_as::<_, AttendanceMark>(
            "SELECT m.id, m.classroom_id, m.user_id, u.email, m.status, m.marked_at
             FROM attendance_marks m
             JOIN users u ON u.id = m.user_id
             WHERE m.classroom_id = $1
               AND ($2::timestamptz IS NULL OR m.marked_at >= $2)
               AND ($3::timestamptz IS NULL OR m.marked_at < $3)
             ORDER BY m.marked_at DESC, m.id DESC",
        )
        .bind(classroom_id)
        .bind(from)
        .bind(until)
        .fetch_all(db)
        .await?;

        Ok(marks)
    }
}

async fn ensure_member(
    db: &PgPool,
    classroom_id: ClassroomId,
    user_id: UserId,
) -> Result<(), AppError> {
    if is_member(db, classroom_id, user_id).await? {
        Ok(())
    } else {
        Err(AppError::not_found(anyhow!("Classroom not found")))
    }
}
