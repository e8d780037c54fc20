use rust_decimal::Decimal;
use std::env;
use std::str::FromStr;

use crate::ledger::payout::PayoutPolicy;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub run_migrations: bool,

    // Admin API bearer token (optional — auth disabled when unset)
    pub api_token: Option<String>,

    // Ledger
    pub settlement_asset: String,
    pub platform_fee_rate: Decimal,
    pub payout_policy: PayoutPolicy,
    /// Decimal places kept on balances and realized profit.
    pub balance_scale: u32,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let platform_fee_rate: Decimal = parse_or("PLATFORM_FEE_RATE", Decimal::new(1, 2))?;
        if platform_fee_rate < Decimal::ZERO || platform_fee_rate >= Decimal::ONE {
            anyhow::bail!("PLATFORM_FEE_RATE must be in [0, 1), got {platform_fee_rate}");
        }

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: parse_or("PORT", 8080)?,
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", 10)?,
            run_migrations: parse_or("RUN_MIGRATIONS", false)?,

            api_token: env::var("API_TOKEN").ok().filter(|t| !t.is_empty()),

            settlement_asset: env::var("SETTLEMENT_ASSET").unwrap_or_else(|_| "USDT".into()),
            platform_fee_rate,
            payout_policy: parse_or("PAYOUT_POLICY", PayoutPolicy::RateBased)?,
            balance_scale: parse_or("BALANCE_SCALE", 8)?,
        })
    }

    /// Config for tests and local tooling: everything at its default.
    pub fn with_database_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            host: "127.0.0.1".into(),
            port: 0,
            db_max_connections: 5,
            run_migrations: false,
            api_token: None,
            settlement_asset: "USDT".into(),
            platform_fee_rate: Decimal::new(1, 2),
            payout_policy: PayoutPolicy::RateBased,
            balance_scale: 8,
        }
    }
}

fn parse_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid {key}={raw}: {e}")),
        _ => Ok(default),
    }
}
