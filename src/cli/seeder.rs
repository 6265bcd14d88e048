//! Demo data for local development.
//!
//! Everything created here uses the [`SEED_EMAIL_DOMAIN`] domain so that
//! [`clear_seeded_data`] can remove it again without touching real accounts.

use std::time::Instant;

use anyhow::Context;
use chrono::{DateTime, Days, Duration, NaiveDate, Utc};
use fake::Fake;
use fake::faker::lorem::en::Sentence;
use fake::faker::name::en::{FirstName, LastName};
use rand::Rng;
use sqlx::{PgPool, Postgres, Transaction};

use rollcall_core::hash_password_with_cost;
use rollcall_models::ids::{AttendanceSessionId, ClassroomId, UserId};
use rollcall_models::{ClassroomRole, UserRole};

use crate::modules::classrooms::service::generate_join_code;

pub const SEED_EMAIL_DOMAIN: &str = "seed.rollcall.local";
pub const SEED_PASSWORD: &str = "password123";

const SUBJECTS: &[&str] = &[
    "Mathematics",
    "Biology",
    "Chemistry",
    "Physics",
    "History",
    "Geography",
    "Literature",
    "Computer Science",
    "Economics",
    "Art",
];

// Postgres caps bind parameters at 65535 per statement.
const BATCH_SIZE: usize = 2000;

pub struct SeedOptions {
    pub classrooms: usize,
    pub students_per_classroom: usize,
    pub past_sessions: usize,
    /// Share of students marked present in each past session.
    pub attendance_rate: f64,
}

impl Default for SeedOptions {
    fn default() -> Self {
        Self {
            classrooms: 3,
            students_per_classroom: 25,
            past_sessions: 5,
            attendance_rate: 0.85,
        }
    }
}

#[derive(Debug)]
pub struct SeededClassroom {
    pub name: String,
    pub join_code: String,
}

#[derive(Debug)]
pub struct SeedSummary {
    pub admin_email: String,
    pub classrooms: Vec<SeededClassroom>,
    pub students: usize,
    pub sessions: usize,
    pub records: usize,
}

struct StudentSeed {
    email: String,
    student_id: String,
    enrollment_date: NaiveDate,
}

struct ClassroomSeed {
    name: String,
    description: String,
    /// `attendance[session][student]`
    attendance: Vec<Vec<bool>>,
}

/// Parses a probability in `0.0..=1.0`. NaN and infinities are rejected.
pub fn parse_attendance_rate(raw: &str) -> Result<f64, String> {
    let rate: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("`{}` is not a number", raw))?;
    check_attendance_rate(rate)
}

fn check_attendance_rate(rate: f64) -> Result<f64, String> {
    if (0.0..=1.0).contains(&rate) {
        Ok(rate)
    } else {
        Err(format!("attendance rate must be between 0 and 1, got {}", rate))
    }
}

fn email_part(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_lowercase()
}

fn generate_students(count: usize) -> Vec<StudentSeed> {
    let mut rng = rand::thread_rng();
    let today = Utc::now().date_naive();

    (0..count)
        .map(|i| {
            let first: String = FirstName().fake();
            let last: String = LastName().fake();
            let days_ago = rng.gen_range(0..365);

            StudentSeed {
                email: format!(
                    "{}.{}{}@{}",
                    email_part(&first),
                    email_part(&last),
                    i + 1,
                    SEED_EMAIL_DOMAIN
                ),
                student_id: format!("S{:05}", i + 1),
                enrollment_date: today.checked_sub_days(Days::new(days_ago)).unwrap_or(today),
            }
        })
        .collect()
}

fn generate_classrooms(options: &SeedOptions) -> Vec<ClassroomSeed> {
    let mut rng = rand::thread_rng();

    (0..options.classrooms)
        .map(|i| {
            let subject = SUBJECTS[i % SUBJECTS.len()];
            let attendance = (0..options.past_sessions)
                .map(|_| {
                    (0..options.students_per_classroom)
                        .map(|_| rng.gen_bool(options.attendance_rate))
                        .collect()
                })
                .collect();

            ClassroomSeed {
                name: format!("{} {}", subject, 101 + i / SUBJECTS.len()),
                description: Sentence(4..9).fake(),
                attendance,
            }
        })
        .collect()
}

/// Creates an admin, classrooms with enrolled students and a history of ended
/// sessions. Students are shared across classrooms.
pub async fn seed_database(db: &PgPool, options: SeedOptions) -> anyhow::Result<SeedSummary> {
    check_attendance_rate(options.attendance_rate).map_err(anyhow::Error::msg)?;
    let start_time = Instant::now();

    let students = generate_students(options.students_per_classroom);
    let classrooms = generate_classrooms(&options);

    // All seeded accounts share one password, so hash once at a low cost.
    let password_hash = hash_password_with_cost(SEED_PASSWORD, 4).map_err(|e| e.error)?;

    let mut tx = db.begin().await?;

    let admin_email = format!("admin@{}", SEED_EMAIL_DOMAIN);
    let admin_id = sqlx::query_scalar::<_, UserId>(
        "INSERT INTO users (email, password, role) VALUES ($1, $2, $3)
         ON CONFLICT (email) DO UPDATE SET password = EXCLUDED.password
         RETURNING id",
    )
    .bind(&admin_email)
    .bind(&password_hash)
    .bind(UserRole::Admin)
    .fetch_one(&mut *tx)
    .await
    .context("inserting seed admin")?;

    let mut student_ids: Vec<UserId> = Vec::with_capacity(students.len());
    for chunk in students.chunks(BATCH_SIZE) {
        let ids = insert_students_chunk(&mut tx, chunk, &password_hash)
            .await
            .context("inserting seed students; run clear-seed first if they already exist")?;
        student_ids.extend(ids);
    }
    println!("   ✓ {} students", student_ids.len());

    let mut seeded = Vec::with_capacity(classrooms.len());
    let mut sessions = 0;
    let mut records = 0;
    let now = Utc::now();

    for classroom in &classrooms {
        let (classroom_id, join_code) =
            insert_classroom(&mut tx, admin_id, &classroom.name, &classroom.description).await?;

        let mut members = vec![(admin_id, ClassroomRole::Admin)];
        members.extend(student_ids.iter().map(|id| (*id, ClassroomRole::Student)));
        for chunk in members.chunks(BATCH_SIZE) {
            insert_members_chunk(&mut tx, classroom_id, chunk).await?;
        }

        for (days_ago, present) in classroom.attendance.iter().enumerate() {
            let start: DateTime<Utc> = now - Duration::days(days_ago as i64 + 1);
            let session_id = sqlx::query_scalar::<_, AttendanceSessionId>(
                "INSERT INTO attendance_sessions
                     (classroom_id, created_by, start_time, end_time, status)
                 VALUES ($1, $2, $3, $4, 'ended')
                 RETURNING id",
            )
            .bind(classroom_id)
            .bind(admin_id)
            .bind(start)
            .bind(start + Duration::minutes(50))
            .fetch_one(&mut *tx)
            .await?;
            sessions += 1;

            let attendees: Vec<UserId> = student_ids
                .iter()
                .zip(present)
                .filter(|(_, present)| **present)
                .map(|(id, _)| *id)
                .collect();
            if attendees.is_empty() {
                continue;
            }

            for chunk in attendees.chunks(BATCH_SIZE) {
                insert_records_chunk(&mut tx, session_id, start, chunk).await?;
            }
            records += attendees.len();
        }

        println!(
            "   ✓ {} ({} sessions)",
            classroom.name,
            classroom.attendance.len()
        );
        seeded.push(SeededClassroom {
            name: classroom.name.clone(),
            join_code,
        });
    }

    tx.commit().await?;

    println!("   ✓ Seeded in {:?}", start_time.elapsed());

    Ok(SeedSummary {
        admin_email,
        classrooms: seeded,
        students: student_ids.len(),
        sessions,
        records,
    })
}

/// `($1, $2), ($3, $4), ...` for a multi-row `VALUES` list.
fn values_placeholders(rows: usize, columns: usize) -> String {
    (0..rows)
        .map(|row| {
            let params: Vec<String> = (1..=columns)
                .map(|col| format!("${}", row * columns + col))
                .collect();
            format!("({})", params.join(", "))
        })
        .collect::<Vec<_>>()
        .join(", ")
}

async fn insert_students_chunk(
    tx: &mut Transaction<'_, Postgres>,
    students: &[StudentSeed],
    password_hash: &str,
) -> Result<Vec<UserId>, sqlx::Error> {
    if students.is_empty() {
        return Ok(Vec::new());
    }

    let query = format!(
        "INSERT INTO users (email, password, role, student_id, enrollment_date) VALUES {} RETURNING id",
        values_placeholders(students.len(), 5)
    );

    let mut q = sqlx::query_scalar(&query);
    for student in students {
        q = q
            .bind(&student.email)
            .bind(password_hash)
            .bind(UserRole::Student)
            .bind(&student.student_id)
            .bind(student.enrollment_date);
    }

    q.fetch_all(&mut **tx).await
}

async fn insert_members_chunk(
    tx: &mut Transaction<'_, Postgres>,
    classroom_id: ClassroomId,
    members: &[(UserId, ClassroomRole)],
) -> Result<(), sqlx::Error> {
    let query = format!(
        "INSERT INTO classroom_members (classroom_id, user_id, role) VALUES {}",
        values_placeholders(members.len(), 3)
    );

    let mut q = sqlx::query(&query);
    for (user_id, role) in members {
        q = q.bind(classroom_id).bind(user_id).bind(role);
    }

    q.execute(&mut **tx).await?;
    Ok(())
}

async fn insert_records_chunk(
    tx: &mut Transaction<'_, Postgres>,
    session_id: AttendanceSessionId,
    session_start: DateTime<Utc>,
    students: &[UserId],
) -> Result<(), sqlx::Error> {
    let query = format!(
        "INSERT INTO attendance_records (session_id, student_id, marked_at) VALUES {}",
        values_placeholders(students.len(), 3)
    );

    let mut q = sqlx::query(&query);
    for (i, student_id) in students.iter().enumerate() {
        q = q
            .bind(session_id)
            .bind(student_id)
            .bind(session_start + Duration::seconds(30 + i as i64 * 7));
    }

    q.execute(&mut **tx).await?;
    Ok(())
}

async fn insert_classroom(
    tx: &mut Transaction<'_, Postgres>,
    admin_id: UserId,
    name: &str,
    description: &str,
) -> anyhow::Result<(ClassroomId, String)> {
    loop {
        let join_code = generate_join_code();
        let inserted = sqlx::query_scalar::<_, ClassroomId>(
            "INSERT INTO classrooms (name, description, join_code, created_by)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (join_code) DO NOTHING
             RETURNING id",
        )
        .bind(name)
        .bind(description)
        .bind(&join_code)
        .bind(admin_id)
        .fetch_optional(&mut **tx)
        .await?;

        if let Some(id) = inserted {
            return Ok((id, join_code));
        }
    }
}

/// Removes every seeded account and everything hanging off it.
pub async fn clear_seeded_data(db: &PgPool) -> anyhow::Result<u64> {
    let pattern = format!("%@{}", SEED_EMAIL_DOMAIN);
    let mut tx = db.begin().await?;

    sqlx::query(
        "DELETE FROM classrooms
         WHERE created_by IN (SELECT id FROM users WHERE email LIKE $1)",
    )
    .bind(&pattern)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "DELETE FROM attendance_sessions
         WHERE created_by IN (SELECT id FROM users WHERE email LIKE $1)",
    )
    .bind(&pattern)
    .execute(&mut *tx)
    .await?;

    let users_deleted = sqlx::query("DELETE FROM users WHERE email LIKE $1")
        .bind(&pattern)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    tx.commit().await?;

    Ok(users_deleted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_placeholders() {
        assert_eq!(values_placeholders(2, 3), "($1, $2, $3), ($4, $5, $6)");
        assert_eq!(values_placeholders(1, 1), "($1)");
    }

    #[test]
    fn test_parse_attendance_rate() {
        assert_eq!(parse_attendance_rate("0.85"), Ok(0.85));
        assert_eq!(parse_attendance_rate("0"), Ok(0.0));
        assert_eq!(parse_attendance_rate("1"), Ok(1.0));

        for raw in ["NaN", "inf", "-0.1", "1.5", "most"] {
            assert!(parse_attendance_rate(raw).is_err(), "{} accepted", raw);
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_seed_rejects_invalid_rate(pool: PgPool) {
        let options = SeedOptions {
            attendance_rate: f64::NAN,
            ..SeedOptions::default()
        };

        assert!(seed_database(&pool, options).await.is_err());

        let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(users, 0);
    }

    #[test]
    fn test_email_part_strips_punctuation() {
        assert_eq!(email_part("O'Connor-Smith"), "oconnorsmith");
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_seed_and_clear(pool: PgPool) {
        let summary = seed_database(
            &pool,
            SeedOptions {
                classrooms: 2,
                students_per_classroom: 4,
                past_sessions: 2,
                attendance_rate: 1.0,
            },
        )
        .await
        .unwrap();

        assert_eq!(summary.classrooms.len(), 2);
        assert_eq!(summary.students, 4);
        assert_eq!(summary.sessions, 4);
        assert_eq!(summary.records, 16);

        let active: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM attendance_sessions WHERE status = 'active'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(active, 0);

        let deleted = clear_seeded_data(&pool).await.unwrap();
        assert_eq!(deleted, 5);

        let classrooms: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM classrooms")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(classrooms, 0);
    }
}
