use sqlx::PgConnection;

pub async fn user_exists(conn: &mut PgConnection, user_id: i32) -> Result<bool, sqlx::Error> {
    let row: (bool,) = sqlx::query_as("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
        .bind(user_id)
        .fetch_one(conn)
        .await?;

    Ok(row.0)
}
