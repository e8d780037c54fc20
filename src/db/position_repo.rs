use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use crate::models::{ContractPosition, Outcome, PageRequest, PositionStatus, PositionWithOwner, SortOrder};

pub async fn get_position(pool: &PgPool, id: i32) -> Result<Option<ContractPosition>, sqlx::Error> {
    sqlx::query_as::<_, ContractPosition>("SELECT * FROM contract_positions WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn get_position_with_owner(
    pool: &PgPool,
    id: i32,
) -> Result<Option<PositionWithOwner>, sqlx::Error> {
    sqlx::query_as::<_, PositionWithOwner>(
        r#"
        SELECT p.*, u.email AS user_email
        FROM contract_positions p
        LEFT JOIN users u ON u.id = p.user_id
        WHERE p.id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Read a position under a row lock for the rest of the transaction.
/// A concurrent settlement of the same id blocks here until the first commits.
pub async fn lock_position(
    conn: &mut PgConnection,
    id: i32,
) -> Result<Option<ContractPosition>, sqlx::Error> {
    sqlx::query_as::<_, ContractPosition>(
        "SELECT * FROM contract_positions WHERE id = $1 FOR UPDATE",
    )
    .bind(id)
    .fetch_optional(conn)
    .await
}

/// Move a position to its terminal state. The exit price is pinned to the entry price.
pub async fn close_position(
    conn: &mut PgConnection,
    id: i32,
    result: Outcome,
    actual_profit: Decimal,
    closed_at: DateTime<Utc>,
) -> Result<ContractPosition, sqlx::Error> {
    sqlx::query_as::<_, ContractPosition>(
        r#"
        UPDATE contract_positions
        SET status = 'CLOSED',
            result = $2,
            actual_profit = $3,
            exit_price = entry_price,
            closed_at = $4
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(result)
    .bind(actual_profit)
    .bind(closed_at)
    .fetch_one(conn)
    .await
}

#[derive(Debug, Clone, Default)]
pub struct PositionFilter {
    pub user_id: Option<i32>,
    pub status: Option<PositionStatus>,
    pub search: Option<String>,
}

/// Map a client sort key onto a column; unknown keys fall back to creation time.
/// Both snake_case and camelCase keys are accepted.
pub fn sort_column(key: Option<&str>) -> &'static str {
    match key.unwrap_or_default() {
        "id" => "id",
        "symbol" => "symbol",
        "status" => "status",
        "side" => "side",
        "amount" => "amount",
        "entry_price" | "entryPrice" => "entry_price",
        "exit_price" | "exitPrice" => "exit_price",
        "expires_at" | "expiresAt" => "expires_at",
        _ => "created_at",
    }
}

const POSITION_FILTER: &str = r#"
    WHERE ($1::int IS NULL OR p.user_id = $1)
      AND ($2::position_status IS NULL OR p.status = $2)
      AND ($3::text IS NULL
           OR p.symbol ILIKE $3
           OR p.status::text ILIKE $3
           OR u.email ILIKE $3
           OR p.id = $4)
"#;

pub async fn list_positions(
    pool: &PgPool,
    filter: &PositionFilter,
    page: PageRequest,
    sort_key: Option<&str>,
    order: SortOrder,
) -> Result<(Vec<PositionWithOwner>, i64), sqlx::Error> {
    let sort_by = sort_column(sort_key);
    let search_id = filter.search.as_deref().and_then(|s| s.trim().parse::<i32>().ok());
    let pattern = filter.search.as_deref().map(super::contains_pattern);

    let sql = format!(
        r#"
        SELECT p.*, u.email AS user_email
        FROM contract_positions p
        LEFT JOIN users u ON u.id = p.user_id
        {POSITION_FILTER}
        ORDER BY p.{sort_by} {dir}, p.id {dir}
        LIMIT $5 OFFSET $6
        "#,
        dir = order.as_sql(),
    );

    let rows = sqlx::query_as::<_, PositionWithOwner>(&sql)
        .bind(filter.user_id)
        .bind(filter.status)
        .bind(pattern.as_deref())
        .bind(search_id)
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(pool)
        .await?;

    let count_sql = format!(
        "SELECT COUNT(*) FROM contract_positions p LEFT JOIN users u ON u.id = p.user_id {POSITION_FILTER}"
    );
    let total: (i64,) = sqlx::query_as(&count_sql)
        .bind(filter.user_id)
        .bind(filter.status)
        .bind(pattern.as_deref())
        .bind(search_id)
        .fetch_one(pool)
        .await?;

    Ok((rows, total.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_column_accepts_both_casings() {
        assert_eq!(sort_column(Some("entryPrice")), "entry_price");
        assert_eq!(sort_column(Some("entry_price")), "entry_price");
        assert_eq!(sort_column(Some("nonsense")), "created_at");
    }
}
