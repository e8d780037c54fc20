use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use crate::models::{PageRequest, SortOrder, Wallet, WalletWithOwner};

/// Fetch the (user, asset) wallet under a row lock, creating it with zero
/// balances first if it does not exist yet.
///
/// Concurrent first-time callers race on the `(user_id, asset)` unique key;
/// the loser's insert is a no-op and both end up locking the same row.
pub async fn lock_or_create(
    conn: &mut PgConnection,
    user_id: i32,
    asset: &str,
) -> Result<Wallet, sqlx::Error> {
    let created = sqlx::query(
        r#"
        INSERT INTO wallets (user_id, asset, available, locked)
        VALUES ($1, $2, 0, 0)
        ON CONFLICT (user_id, asset) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(asset)
    .execute(&mut *conn)
    .await?
    .rows_affected();

    if created > 0 {
        tracing::debug!(user_id, asset, "Wallet created on first adjustment");
    }

    sqlx::query_as::<_, Wallet>(
        "SELECT * FROM wallets WHERE user_id = $1 AND asset = $2 FOR UPDATE",
    )
    .bind(user_id)
    .bind(asset)
    .fetch_one(&mut *conn)
    .await
}

pub async fn set_balances(
    conn: &mut PgConnection,
    wallet_id: i32,
    available: Decimal,
    locked: Decimal,
) -> Result<Wallet, sqlx::Error> {
    sqlx::query_as::<_, Wallet>(
        r#"
        UPDATE wallets
        SET available = $2, locked = $3, updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(wallet_id)
    .bind(available)
    .bind(locked)
    .fetch_one(conn)
    .await
}

pub async fn get_by_user_and_asset(
    pool: &PgPool,
    user_id: i32,
    asset: &str,
) -> Result<Option<Wallet>, sqlx::Error> {
    sqlx::query_as::<_, Wallet>("SELECT * FROM wallets WHERE user_id = $1 AND asset = $2")
        .bind(user_id)
        .bind(asset)
        .fetch_optional(pool)
        .await
}

#[derive(Debug, Clone, Default)]
pub struct WalletFilter {
    pub user_id: Option<i32>,
    pub asset: Option<String>,
    pub search: Option<String>,
}

/// Map a client sort key onto a column; unknown keys fall back to creation time.
pub fn sort_column(key: Option<&str>) -> &'static str {
    match key.unwrap_or_default() {
        "id" => "id",
        "asset" => "asset",
        "available" => "available",
        "locked" => "locked",
        _ => "created_at",
    }
}

const WALLET_FILTER: &str = r#"
    WHERE ($1::int IS NULL OR w.user_id = $1)
      AND ($2::text IS NULL OR w.asset = $2)
      AND ($3::text IS NULL
           OR w.asset ILIKE $3
           OR u.email ILIKE $3
           OR w.id = $4)
"#;

pub async fn list_wallets(
    pool: &PgPool,
    filter: &WalletFilter,
    page: PageRequest,
    sort_key: Option<&str>,
    order: SortOrder,
) -> Result<(Vec<WalletWithOwner>, i64), sqlx::Error> {
    let sort_by = sort_column(sort_key);
    let search_id = filter.search.as_deref().and_then(|s| s.trim().parse::<i32>().ok());
    let pattern = filter.search.as_deref().map(super::contains_pattern);

    let sql = format!(
        r#"
        SELECT w.*, u.email AS user_email
        FROM wallets w
        LEFT JOIN users u ON u.id = w.user_id
        {WALLET_FILTER}
        ORDER BY w.{sort_by} {dir}, w.id {dir}
        LIMIT $5 OFFSET $6
        "#,
        dir = order.as_sql(),
    );

    let rows = sqlx::query_as::<_, WalletWithOwner>(&sql)
        .bind(filter.user_id)
        .bind(filter.asset.as_deref())
        .bind(pattern.as_deref())
        .bind(search_id)
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(pool)
        .await?;

    let count_sql = format!(
        "SELECT COUNT(*) FROM wallets w LEFT JOIN users u ON u.id = w.user_id {WALLET_FILTER}"
    );
    let total: (i64,) = sqlx::query_as(&count_sql)
        .bind(filter.user_id)
        .bind(filter.asset.as_deref())
        .bind(pattern.as_deref())
        .bind(search_id)
        .fetch_one(pool)
        .await?;

    Ok((rows, total.0))
}
