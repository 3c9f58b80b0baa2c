//! Like (crush declaration) repository
//!
//! `from_user_id` is the primary key: a user has at most one active
//! declaration, and re-declaring overwrites it in place. The `matched`
//! flag is the only field the resolver mutates after creation.

use koimatch_common::db::Like;
use koimatch_common::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite};

fn like_from_row(row: &SqliteRow) -> Like {
    Like {
        from_user_id: row.get("from_user_id"),
        to_name: row.get("to_name"),
        to_birthday: row.get("to_birthday"),
        matched: row.get::<i64, _>("matched") != 0,
    }
}

/// Look up a user's single active declaration
pub async fn find_by_declarer<'e, E>(db: E, from_user_id: &str) -> Result<Option<Like>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query(
        r#"
        SELECT from_user_id, to_name, to_birthday, matched
        FROM likes
        WHERE from_user_id = ?
        "#,
    )
    .bind(from_user_id)
    .fetch_optional(db)
    .await?;

    Ok(row.as_ref().map(like_from_row))
}

/// Write a declaration, overwriting any prior one by the same declarer.
/// The row always starts unmatched; the resolver marks it afterwards.
pub async fn upsert<'e, E>(db: E, from_user_id: &str, to_name: &str, to_birthday: &str) -> Result<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO likes (from_user_id, to_name, to_birthday, matched)
        VALUES (?, ?, ?, 0)
        ON CONFLICT(from_user_id) DO UPDATE SET
            to_name = excluded.to_name,
            to_birthday = excluded.to_birthday,
            matched = 0,
            updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(from_user_id)
    .bind(to_name)
    .bind(to_birthday)
    .execute(db)
    .await?;

    Ok(())
}

/// Set or clear the matched flag on a declaration
pub async fn set_matched<'e, E>(db: E, from_user_id: &str, matched: bool) -> Result<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        UPDATE likes
        SET matched = ?, updated_at = CURRENT_TIMESTAMP
        WHERE from_user_id = ?
        "#,
    )
    .bind(matched as i64)
    .bind(from_user_id)
    .execute(db)
    .await?;

    Ok(())
}
