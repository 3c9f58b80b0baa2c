//! User repository
//!
//! Users are keyed by the stable external messaging-platform id.
//! Reciprocity lookups resolve a declared target by exact
//! (name, birthday) string equality.

use koimatch_common::db::{RegistrationStep, User};
use koimatch_common::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite};

fn user_from_row(row: &SqliteRow) -> User {
    User {
        id: row.get("id"),
        name: row.get("name"),
        birthday: row.get("birthday"),
        step: RegistrationStep::from_i64(row.get::<i64, _>("registration_step")),
        crush_name: row.get("crush_name"),
        crush_birthday: row.get("crush_birthday"),
        matched_with_user_id: row.get("matched_with_user_id"),
    }
}

/// Look up a user by external id
pub async fn find_by_id<'e, E>(db: E, id: &str) -> Result<Option<User>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query(
        r#"
        SELECT id, name, birthday, registration_step,
               crush_name, crush_birthday, matched_with_user_id
        FROM users
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;

    Ok(row.as_ref().map(user_from_row))
}

/// Look up a user by exact (name, birthday) identity.
///
/// Multiple users can share an identity pair; this takes one arbitrary
/// row, matching the reference behavior for that ambiguity.
pub async fn find_by_name_and_birthday<'e, E>(
    db: E,
    name: &str,
    birthday: &str,
) -> Result<Option<User>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query(
        r#"
        SELECT id, name, birthday, registration_step,
               crush_name, crush_birthday, matched_with_user_id
        FROM users
        WHERE name = ? AND birthday = ?
        LIMIT 1
        "#,
    )
    .bind(name)
    .bind(birthday)
    .fetch_optional(db)
    .await?;

    Ok(row.as_ref().map(user_from_row))
}

/// Insert a new user row
pub async fn create<'e, E>(db: E, user: &User) -> Result<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO users (id, name, birthday, registration_step,
                           crush_name, crush_birthday, matched_with_user_id)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&user.id)
    .bind(&user.name)
    .bind(&user.birthday)
    .bind(user.step.as_i64())
    .bind(&user.crush_name)
    .bind(&user.crush_birthday)
    .bind(&user.matched_with_user_id)
    .execute(db)
    .await?;

    Ok(())
}

/// Update a user's own identity fields and registration step
pub async fn update_profile<'e, E>(
    db: E,
    id: &str,
    name: &str,
    birthday: &str,
    step: RegistrationStep,
) -> Result<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        UPDATE users
        SET name = ?, birthday = ?, registration_step = ?,
            updated_at = CURRENT_TIMESTAMP
        WHERE id = ?
        "#,
    )
    .bind(name)
    .bind(birthday)
    .bind(step.as_i64())
    .bind(id)
    .execute(db)
    .await?;

    Ok(())
}

/// Record the user's most recent crush target on their own row
pub async fn set_crush<'e, E>(db: E, id: &str, to_name: &str, to_birthday: &str) -> Result<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        UPDATE users
        SET crush_name = ?, crush_birthday = ?, updated_at = CURRENT_TIMESTAMP
        WHERE id = ?
        "#,
    )
    .bind(to_name)
    .bind(to_birthday)
    .bind(id)
    .execute(db)
    .await?;

    Ok(())
}

/// Set or clear the mutual-match back-reference
pub async fn set_matched_with<'e, E>(db: E, id: &str, partner_id: Option<&str>) -> Result<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        UPDATE users
        SET matched_with_user_id = ?, updated_at = CURRENT_TIMESTAMP
        WHERE id = ?
        "#,
    )
    .bind(partner_id)
    .bind(id)
    .execute(db)
    .await?;

    Ok(())
}
