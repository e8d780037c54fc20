use metrics::{counter, gauge};
use sqlx::PgPool;

use crate::db::session_control_repo;
use crate::errors::LedgerError;
use crate::models::{Outcome, QueueMode, SessionControl};

/// Administration of the platform-wide queue of forced outcomes.
///
/// Consuming the head entry belongs to whatever resolves positions; this type
/// only views and rewrites the queue.
#[derive(Clone)]
pub struct SessionQueue {
    pool: PgPool,
}

impl SessionQueue {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Pending entries, oldest first.
    pub async fn list_active_queue(&self) -> Result<Vec<SessionControl>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let queue = session_control_repo::list_active(&mut conn).await?;
        Ok(queue)
    }

    /// Add a forced outcome and return the pending queue as it stands afterwards.
    ///
    /// `required = false` records the entry as already retired.
    pub async fn push_outcome(
        &self,
        final_outcome: Outcome,
        mode: QueueMode,
        required: bool,
    ) -> Result<Vec<SessionControl>, LedgerError> {
        let mut tx = self.pool.begin().await?;
        session_control_repo::lock_queue(&mut tx).await?;

        let retired = match mode {
            QueueMode::Reset => session_control_repo::retire_active(&mut tx).await?,
            QueueMode::Append => 0,
        };
        let entry = session_control_repo::insert(&mut tx, final_outcome, required).await?;
        let queue = session_control_repo::list_active(&mut tx).await?;

        tx.commit().await?;

        counter!("session_control_pushes_total", "mode" => mode.as_str()).increment(1);
        gauge!("session_queue_depth").set(queue.len() as f64);
        tracing::info!(
            entry_id = entry.id,
            final_outcome = %final_outcome,
            mode = mode.as_str(),
            retired,
            queue_len = queue.len(),
            "Session control updated"
        );

        Ok(queue)
    }
}
