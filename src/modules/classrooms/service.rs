use anyhow::anyhow;
use rand::Rng;
use sqlx::{PgExecutor, PgPool};
use tracing::{debug, error, info, instrument, warn};

use rollcall_core::AppError;
use rollcall_models::UserRole;
use rollcall_models::ids::{ClassroomId, UserId};

use crate::metrics;

use super::model::{
    Classroom, ClassroomDetail, ClassroomMember, ClassroomRole, ClassroomSummary,
    CreateClassroomDto, JOIN_CODE_LEN, JoinClassroomDto,
};

const MAX_JOIN_CODE_ATTEMPTS: usize = 5;
const JOIN_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const JOIN_CODE_CONSTRAINT: &str = "classrooms_join_code_key";

const CLASSROOM_COLUMNS: &str = "id, name, description, join_code, created_by, created_at";

/// Six random characters from `A-Z0-9`.
pub fn generate_join_code() -> String {
    let mut rng = rand::thread_rng();
    (0..JOIN_CODE_LEN)
        .map(|_| JOIN_CODE_ALPHABET[rng.gen_range(0..JOIN_CODE_ALPHABET.len())] as char)
        .collect()
}

/// Whether `user_id` is in the member list of `classroom_id`.
pub async fn is_member<'e, E>(
    executor: E,
    classroom_id: ClassroomId,
    user_id: UserId,
) -> Result<bool, AppError>
where
    E: PgExecutor<'e>,
{
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(
             SELECT 1 FROM classroom_members WHERE classroom_id = $1 AND user_id = $2
         )",
    )
    .bind(classroom_id)
    .bind(user_id)
    .fetch_one(executor)
    .await?;

    Ok(exists)
}

pub async fn classroom_exists(db: &PgPool, classroom_id: ClassroomId) -> Result<bool, AppError> {
    let exists =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM classrooms WHERE id = $1)")
            .bind(classroom_id)
            .fetch_one(db)
            .await?;

    Ok(exists)
}

fn classroom_not_found() -> AppError {
    AppError::not_found(anyhow!("Classroom not found"))
}

pub struct ClassroomService;

impl ClassroomService {
    #[instrument(skip(db, dto), fields(classroom.name = %dto.name))]
    pub async fn create_classroom(
        db: &PgPool,
        creator_id: UserId,
        dto: CreateClassroomDto,
    ) -> Result<ClassroomDetail, AppError> {
        Self::create_classroom_with_codes(db, creator_id, dto, generate_join_code).await
    }

    /// Creates the classroom and its creator membership in one transaction,
    /// drawing a fresh join code from `next_code` whenever the previous one was
    /// already taken.
    pub async fn create_classroom_with_codes<F>(
        db: &PgPool,
        creator_id: UserId,
        dto: CreateClassroomDto,
        mut next_code: F,
    ) -> Result<ClassroomDetail, AppError>
    where
        F: FnMut() -> String + Send,
    {
        let creator_role = sqlx::query_scalar::<_, UserRole>("SELECT role FROM users WHERE id = $1")
            .bind(creator_id)
            .fetch_optional(db)
            .await?;

        if creator_role != Some(UserRole::Admin) {
            return Err(AppError::forbidden("Only admins can create classrooms"));
        }

        let name = dto.name.trim();
        if name.is_empty() {
            return Err(AppError::bad_request(anyhow!("Name is required")));
        }

        for attempt in 1..=MAX_JOIN_CODE_ATTEMPTS {
            let join_code = next_code();
            let mut tx = db.begin().await?;

            let inserted = sqlx::query_as::<_, Classroom>(&format!(
                "INSERT INTO classrooms (name, description, join_code, created_by)
                 VALUES ($1, $2, $3, $4)
                 RETURNING {CLASSROOM_COLUMNS}"
            ))
            .bind(name)
            .bind(&dto.description)
            .bind(&join_code)
            .bind(creator_id)
            .fetch_one(&mut *tx)
            .await;

            let classroom = match inserted {
                Ok(classroom) => classroom,
                Err(sqlx::Error::Database(db_err))
                    if db_err.constraint() == Some(JOIN_CODE_CONSTRAINT) =>
                {
                    warn!(attempt, "Join code collision, regenerating");
                    metrics::track_join_code_collision();
                    continue;
                }
                Err(e) => {
                    error!(error = %e, "Database error creating classroom");
                    return Err(e.into());
                }
            };

            sqlx::query(
                "INSERT INTO classroom_members (classroom_id, user_id, role) VALUES ($1, $2, $3)",
            )
            .bind(classroom.id)
            .bind(creator_id)
            .bind(ClassroomRole::Admin)
            .execute(&mut *tx)
            .await?;

            tx.commit().await?;

            metrics::track_classroom_created();
            info!(classroom.id = %classroom.id, "Classroom created");

            return Self::load_detail(db, classroom).await;
        }

        Err(AppError::conflict(
            "Could not generate a unique join code, please try again",
        ))
    }

    #[instrument(skip(db))]
    pub async fn list_classrooms_for_user(
        db: &PgPool,
        user_id: UserId,
    ) -> Result<Vec<ClassroomSummary>, AppError> {
        let classrooms = sqlx::query_as::<_, ClassroomSummary>(
            "SELECT c.id, c.name, c.description, c.join_code, c.created_by,
                    u.email AS creator_email,
                    (SELECT COUNT(*) FROM classroom_members cm WHERE cm.classroom_id = c.id)
                        AS member_count,
                    c.created_at
             FROM classrooms c
             JOIN classroom_members m ON m.classroom_id = c.id AND m.user_id = $1
             JOIN users u ON u.id = c.created_by
             ORDER BY c.created_at DESC, c.id",
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;

        debug!(count = classrooms.len(), "Classrooms listed");

        Ok(classrooms)
    }

    /// Non-members get the same error as for a classroom that does not exist.
    #[instrument(skip(db))]
    pub async fn get_classroom(
        db: &PgPool,
        classroom_id: ClassroomId,
        user_id: UserId,
    ) -> Result<ClassroomDetail, AppError> {
        if !is_member(db, classroom_id, user_id).await? {
            return Err(classroom_not_found());
        }

        let classroom = sqlx::query_as::<_, Classroom>(&format!(
            "SELECT {CLASSROOM_COLUMNS} FROM classrooms WHERE id = $1"
        ))
        .bind(classroom_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(classroom_not_found)?;

        Self::load_detail(db, classroom).await
    }

    #[instrument(skip(db, dto))]
    pub async fn join_classroom(
        db: &PgPool,
        user_id: UserId,
        dto: JoinClassroomDto,
    ) -> Result<ClassroomDetail, AppError> {
        let join_code = dto.join_code.trim();

        let classroom = sqlx::query_as::<_, Classroom>(&format!(
            "SELECT {CLASSROOM_COLUMNS} FROM classrooms WHERE join_code = $1"
        ))
        .bind(join_code)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Invalid join code")))?;

        // The primary key rejects a second membership, including a racing one.
        sqlx::query(
            "INSERT INTO classroom_members (classroom_id, user_id, role) VALUES ($1, $2, $3)",
        )
        .bind(classroom.id)
        .bind(user_id)
        .bind(ClassroomRole::Student)
        .execute(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                return AppError::conflict("You are already a member of this classroom");
            }
            error!(error = %e, "Database error joining classroom");
            AppError::from(e)
        })?;

        metrics::track_classroom_joined();
        info!(classroom.id = %classroom.id, "User joined classroom");

        Self::load_detail(db, classroom).await
    }

    async fn load_detail(db: &PgPool, classroom: Classroom) -> Result<ClassroomDetail, AppError> {
        let members = sqlx::query_as::<_, ClassroomMember>(
            "SELECT m.user_id, u.email, m.role, m.joined_at
             FROM classroom_members m
             JOIN users u ON u.id = m.user_id
             WHERE m.classroom_id = $1
             ORDER BY m.position",
        )
        .bind(classroom.id)
        .fetch_all(db)
        .await?;

        let creator_email =
            sqlx::query_scalar::<_, String>("SELECT email FROM users WHERE id = $1")
                .bind(classroom.created_by)
                .fetch_one(db)
                .await?;

        Ok(ClassroomDetail {
            classroom,
            creator_email,
            members,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use rollcall_models::is_valid_join_code;

    async fn insert_user(pool: &PgPool, email: &str, role: UserRole) -> UserId {
        sqlx::query_scalar::<_, UserId>(
            "INSERT INTO users (email, password, role) VALUES ($1, 'x', $2) RETURNING id",
        )
        .bind(email)
        .bind(role)
        .fetch_one(pool)
        .await
        .unwrap()
    }

    fn dto(name: &str) -> CreateClassroomDto {
        CreateClassroomDto {
            name: name.to_string(),
            description: None,
        }
    }

    fn join(code: &str) -> JoinClassroomDto {
        JoinClassroomDto {
            join_code: code.to_string(),
        }
    }

    #[test]
    fn test_generate_join_code_shape() {
        for _ in 0..100 {
            assert!(is_valid_join_code(&generate_join_code()));
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_create_enrolls_creator_as_admin(pool: PgPool) {
        let admin = insert_user(&pool, "t@x.com", UserRole::Admin).await;

        let detail = ClassroomService::create_classroom(&pool, admin, dto("  Math  "))
            .await
            .unwrap();

        assert_eq!(detail.classroom.name, "Math");
        assert!(is_valid_join_code(&detail.classroom.join_code));
        assert_eq!(detail.creator_email, "t@x.com");
        assert_eq!(detail.members.len(), 1);
        assert_eq!(detail.members[0].user_id, admin);
        assert_eq!(detail.members[0].role, ClassroomRole::Admin);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_students_cannot_create(pool: PgPool) {
        let student = insert_user(&pool, "s@x.com", UserRole::Student).await;

        let err = ClassroomService::create_classroom(&pool, student, dto("Math"))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);

        let err = ClassroomService::create_classroom(&pool, UserId::new(), dto("Math"))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_join_code_collision_is_retried(pool: PgPool) {
        let admin = insert_user(&pool, "t@x.com", UserRole::Admin).await;
        let first = ClassroomService::create_classroom_with_codes(&pool, admin, dto("A"), || {
            "AAAAAA".to_string()
        })
        .await
        .unwrap();
        assert_eq!(first.classroom.join_code, "AAAAAA");

        let mut codes = vec!["BBBBBB".to_string(), "AAAAAA".to_string()];
        let second = ClassroomService::create_classroom_with_codes(&pool, admin, dto("B"), || {
            codes.pop().unwrap()
        })
        .await
        .unwrap();
        assert_eq!(second.classroom.join_code, "BBBBBB");

        let err = ClassroomService::create_classroom_with_codes(&pool, admin, dto("C"), || {
            "AAAAAA".to_string()
        })
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM classrooms")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 2);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_join_and_duplicate_join(pool: PgPool) {
        let admin = insert_user(&pool, "t@x.com", UserRole::Admin).await;
        let student = insert_user(&pool, "s@x.com", UserRole::Student).await;
        let classroom = ClassroomService::create_classroom(&pool, admin, dto("Math"))
            .await
            .unwrap();
        let code = classroom.classroom.join_code.clone();

        let joined = ClassroomService::join_classroom(&pool, student, join(&code))
            .await
            .unwrap();
        assert_eq!(joined.members.len(), 2);
        assert_eq!(joined.members[1].user_id, student);
        assert_eq!(joined.members[1].role, ClassroomRole::Student);

        let err = ClassroomService::join_classroom(&pool, student, join(&code))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);

        let detail = ClassroomService::get_classroom(&pool, classroom.classroom.id, student)
            .await
            .unwrap();
        assert_eq!(detail.members.len(), 2);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_join_unknown_code_not_found(pool: PgPool) {
        let student = insert_user(&pool, "s@x.com", UserRole::Student).await;

        let err = ClassroomService::join_classroom(&pool, student, join("ZZZZZZ"))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_get_hides_classroom_from_non_members(pool: PgPool) {
        let admin = insert_user(&pool, "t@x.com", UserRole::Admin).await;
        let outsider = insert_user(&pool, "o@x.com", UserRole::Student).await;
        let classroom = ClassroomService::create_classroom(&pool, admin, dto("Math"))
            .await
            .unwrap();

        let hidden = ClassroomService::get_classroom(&pool, classroom.classroom.id, outsider)
            .await
            .unwrap_err();
        let missing = ClassroomService::get_classroom(&pool, ClassroomId::new(), admin)
            .await
            .unwrap_err();

        assert_eq!(hidden.status, StatusCode::NOT_FOUND);
        assert_eq!(hidden.message(), missing.message());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_list_only_member_classrooms_newest_first(pool: PgPool) {
        let admin = insert_user(&pool, "t@x.com", UserRole::Admin).await;
        let other_admin = insert_user(&pool, "t2@x.com", UserRole::Admin).await;
        let student = insert_user(&pool, "s@x.com", UserRole::Student).await;

        let math = ClassroomService::create_classroom(&pool, admin, dto("Math"))
            .await
            .unwrap();
        let art = ClassroomService::create_classroom(&pool, other_admin, dto("Art"))
            .await
            .unwrap();
        ClassroomService::create_classroom(&pool, other_admin, dto("Music"))
            .await
            .unwrap();

        for code in [&math.classroom.join_code, &art.classroom.join_code] {
            ClassroomService::join_classroom(&pool, student, join(code))
                .await
                .unwrap();
        }

        let listed = ClassroomService::list_classrooms_for_user(&pool, student)
            .await
            .unwrap();
        let names: Vec<_> = listed.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Art", "Math"]);
        assert_eq!(listed[0].creator_email, "t2@x.com");
        assert_eq!(listed[0].member_count, 2);
    }
}
