use sqlx::PgConnection;

use crate::models::{Outcome, SessionControl};

/// Serialize queue writers. Readers are not blocked.
pub async fn lock_queue(conn: &mut PgConnection) -> Result<(), sqlx::Error> {
    sqlx::query("LOCK TABLE contract_session_controls IN EXCLUSIVE MODE")
        .execute(conn)
        .await?;
    Ok(())
}

/// Pending entries in application order.
pub async fn list_active(conn: &mut PgConnection) -> Result<Vec<SessionControl>, sqlx::Error> {
    sqlx::query_as::<_, SessionControl>(
        r#"
        SELECT * FROM contract_session_controls
        WHERE required = true
        ORDER BY created_at ASC, id ASC
        "#,
    )
    .fetch_all(conn)
    .await
}

/// Retire every pending entry. Returns how many were retired.
pub async fn retire_active(conn: &mut PgConnection) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE contract_session_controls SET required = false WHERE required = true",
    )
    .execute(conn)
    .await?;

    Ok(result.rows_affected())
}

pub async fn insert(
    conn: &mut PgConnection,
    final_outcome: Outcome,
    required: bool,
) -> Result<SessionControl, sqlx::Error> {
    sqlx::query_as::<_, SessionControl>(
        r#"
        INSERT INTO contract_session_controls (final_outcome, required)
        VALUES ($1, $2)
        RETURNING *
        "#,
    )
    .bind(final_outcome)
    .bind(required)
    .fetch_one(conn)
    .await
}
