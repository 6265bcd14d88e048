//! Attendance sessions and presence records.
//!
//! The one-active-session rule and the one-record-per-student rule are unique
//! indexes in the database; this service only translates their violations.

use std::collections::HashMap;

use anyhow::anyhow;
use chrono::NaiveDate;
use sqlx::PgPool;
use tracing::{debug, error, info, instrument, warn};

use rollcall_core::AppError;
use rollcall_models::UserRole;
use rollcall_models::ids::{AttendanceSessionId, ClassroomId, UserId};

use crate::metrics;
use crate::middleware::role::ensure_role;
use crate::modules::classrooms::service::{classroom_exists, is_member};

use super::model::{
    AttendanceRecord, AttendanceRecordRow, AttendanceRecordWithStudent, AttendanceSession,
    SessionWithRecords, utc_day_bounds,
};

const SESSION_COLUMNS: &str = "id, classroom_id, created_by, start_time, end_time, status";

fn session_not_found() -> AppError {
    AppError::not_found(anyhow!("Attendance session not found"))
}

pub struct AttendanceService;

impl AttendanceService {
    #[instrument(skip(db))]
    pub async fn start_session(
        db: &PgPool,
        classroom_id: ClassroomId,
        requester: UserId,
        role: UserRole,
    ) -> Result<AttendanceSession, AppError> {
        ensure_role(
            role,
            &[UserRole::Admin],
            "Only admins can start attendance sessions",
        )?;

        if !classroom_exists(db, classroom_id).await? {
            return Err(AppError::not_found(anyhow!("Classroom not found")));
        }

        let session = sqlx::query_as::<_, AttendanceSession>(&format!(
            "INSERT INTO attendance_sessions (classroom_id, created_by)
             VALUES ($1, $2)
             RETURNING {SESSION_COLUMNS}"
        ))
        .bind(classroom_id)
        .bind(requester)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                warn!(classroom.id = %classroom_id, "Session already active");
                return AppError::conflict(
                    "An attendance session is already active for this classroom",
                );
            }
            error!(error = %e, "Database error starting session");
            AppError::from(e)
        })?;

        metrics::track_session_started();
        info!(session.id = %session.id, classroom.id = %classroom_id, "Attendance session started");

        Ok(session)
    }

    #[instrument(skip(db))]
    pub async fn end_session(
        db: &PgPool,
        session_id: AttendanceSessionId,
        role: UserRole,
    ) -> Result<AttendanceSession, AppError> {
        ensure_role(
            role,
            &[UserRole::Admin],
            "Only admins can end attendance sessions",
        )?;

        let ended = sqlx::query_as::<_, AttendanceSession>(&format!(
            "UPDATE attendance_sessions
             SET status = 'ended', end_time = NOW()
             WHERE id = $1 AND status = 'active'
             RETURNING {SESSION_COLUMNS}"
        ))
        .bind(session_id)
        .fetch_optional(db)
        .await?;

        if let Some(session) = ended {
            metrics::track_session_ended();
            info!(session.id = %session.id, "Attendance session ended");
            return Ok(session);
        }

        // Nothing updated: either missing or already ended.
        match Self::find_session(db, session_id).await? {
            None => Err(session_not_found()),
            Some(_) => Err(AppError::conflict("Attendance session has already ended")),
        }
    }

    /// Records the caller as present.
    ///
    /// The session row is held `FOR SHARE` until the record is committed, so a
    /// concurrent end waits for the mark instead of interleaving with it.
    #[instrument(skip(db))]
    pub async fn mark_present(
        db: &PgPool,
        session_id: AttendanceSessionId,
        student_id: UserId,
        role: UserRole,
    ) -> Result<AttendanceRecord, AppError> {
        let mut tx = db.begin().await?;

        let session = sqlx::query_as::<_, AttendanceSession>(&format!(
            "SELECT {SESSION_COLUMNS} FROM attendance_sessions WHERE id = $1 FOR SHARE"
        ))
        .bind(session_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(session_not_found)?;

        if !session.is_active() {
            return Err(AppError::invalid_state("Attendance session has ended"));
        }

        ensure_role(role, &[UserRole::Student], "Only students can mark attendance")?;

        if !is_member(&mut *tx, session.classroom_id, student_id).await? {
            return Err(AppError::forbidden("You are not a member of this classroom"));
        }

        let record = sqlx::query_as::<_, AttendanceRecord>(
            "INSERT INTO attendance_records (session_id, student_id)
             VALUES ($1, $2)
             RETURNING id, session_id, student_id, status, marked_at",
        )
        .bind(session_id)
        .bind(student_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                return AppError::conflict("Attendance already marked for this session");
            }
            error!(error = %e, "Database error marking attendance");
            AppError::from(e)
        })?;

        tx.commit().await?;

        metrics::track_attendance_marked("session");
        info!(session.id = %session_id, record.id = %record.id, "Attendance marked");

        Ok(record)
    }

    /// The classroom's active session, or `None`.
    #[instrument(skip(db))]
    pub async fn get_active_session(
        db: &PgPool,
        classroom_id: ClassroomId,
    ) -> Result<Option<SessionWithRecords>, AppError> {
        let session = sqlx::query_as::<_, AttendanceSession>(&format!(
            "SELECT {SESSION_COLUMNS} FROM attendance_sessions
             WHERE classroom_id = $1 AND status = 'active'"
        ))
        .bind(classroom_id)
        .fetch_optional(db)
        .await?;

        match session {
            Some(session) => Ok(Self::with_records(db, vec![session]).await?.pop()),
            None => Ok(None),
        }
    }

    /// All sessions of a classroom, most recent first, optionally restricted to
    /// those that started on `day` (UTC).
    #[instrument(skip(db))]
    pub async fn list_session_history(
        db: &PgPool,
        classroom_id: ClassroomId,
        requester: UserId,
        role: UserRole,
        day: Option<NaiveDate>,
    ) -> Result<Vec<SessionWithRecords>, AppError> {
        if role != UserRole::Admin && !is_member(db, classroom_id, requester).await? {
            return Err(AppError::forbidden(
                "You do not have access to this classroom's attendance",
            ));
        }

        if !classroom_exists(db, classroom_id).await? {
            return Err(AppError::not_found(anyhow!("Classroom not found")));
        }

        let (from, until) = match day.map(utc_day_bounds) {
            Some((from, until)) => (Some(from), Some(until)),
            None => (None, None),
        };

        let sessions = sqlx::query_as::<_, AttendanceSession>(&format!(
            "SELECT {SESSION_COLUMNS} FROM attendance_sessions
             WHERE classroom_id = $1
               AND ($2::timestamptz IS NULL OR start_time >= $2)
               AND ($3::timestamptz IS NULL OR start_time < $3)
             ORDER BY start_time DESC, id DESC"
        ))
        .bind(classroom_id)
        .bind(from)
        .bind(until)
        .fetch_all(db)
        .await?;

        debug!(count = sessions.len(), "Session history loaded");

        Self::with_records(db, sessions).await
    }

    /// Admins and classroom members may read a session; anyone else sees 404.
    #[instrument(skip(db))]
    pub async fn get_session(
        db: &PgPool,
        session_id: AttendanceSessionId,
        requester: UserId,
        role: UserRole,
    ) -> Result<SessionWithRecords, AppError> {
        let session = Self::find_session(db, session_id)
            .await?
            .ok_or_else(session_not_found)?;

        if role != UserRole::Admin && !is_member(db, session.classroom_id, requester).await? {
            return Err(session_not_found());
        }

        Self::with_records(db, vec![session])
            .await?
            .pop()
            .ok_or_else(session_not_found)
    }

    async fn find_session(
        db: &PgPool,
        session_id: AttendanceSessionId,
    ) -> Result<Option<AttendanceSession>, AppError> {
        let session = sqlx::query_as::<_, AttendanceSession>(&format!(
            "SELECT {SESSION_COLUMNS} FROM attendance_sessions WHERE id = $1"
        ))
        .bind(session_id)
        .fetch_optional(db)
        .await?;

        Ok(session)
    }

    /// Attaches records (with student details) to each session, preserving order.
    async fn with_records(
        db: &PgPool,
        sessions: Vec<AttendanceSession>,
    ) -> Result<Vec<SessionWithRecords>, AppError> {
        if sessions.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<AttendanceSessionId> = sessions.iter().map(|s| s.id).collect();

        let rows = sqlx::query_as::<_, AttendanceRecordRow>(
            "SELECT r.id, r.session_id, u.id AS user_id, u.email,
                    u.student_id AS student_number, r.status, r.marked_at
             FROM attendance_records r
             JOIN users u ON u.id = r.student_id
             WHERE r.session_id = ANY($1)
             ORDER BY r.marked_at, r.id",
        )
        .bind(&ids)
        .fetch_all(db)
        .await?;

        let mut by_session: HashMap<AttendanceSessionId, Vec<AttendanceRecordWithStudent>> =
            HashMap::new();
        for row in rows {
            by_session
                .entry(row.session_id)
                .or_default()
                .push(row.into());
        }

        Ok(sessions
            .into_iter()
            .map(|session| SessionWithRecords {
                records: by_session.remove(&session.id).unwrap_or_default(),
                session,
            })
            .collect())
    }
}
