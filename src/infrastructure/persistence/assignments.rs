use crate::domain::entities::{AssignmentMethod, AssignmentStatus, BrokerAssignment};
use crate::domain::ports::assignment_repository::{AssignmentRepository, CompletionRecord};
use crate::infrastructure::http::middleware::error::ApiResult;
use crate::infrastructure::persistence::Database;
use crate::shared::utils::now_timestamp;
use async_trait::async_trait;
use sqlx::{any::AnyRow, Any, Row, Transaction};

fn assignment_from_row(row: &AnyRow) -> Result<BrokerAssignment, sqlx::Error> {
    let method: String = row.try_get("assignment_method")?;
    let status: String = row.try_get("status")?;

    Ok(BrokerAssignment {
        id: row.try_get("id")?,
        conversation_id: row.try_get("conversation_id")?,
        broker_id: row.try_get("broker_id")?,
        method: AssignmentMethod::from(method),
        reason: row.try_get("assignment_reason")?,
        status: AssignmentStatus::from(status),
        assigned_at: row.try_get("assigned_at")?,
        updated_at: row.try_get("updated_at")?,
        completed_at: row.try_get("completed_at")?,
    })
}

/// Give one slot back; workload never drops below zero
async fn release_broker(
    tx: &mut Transaction<'_, Any>,
    broker_id: &str,
    now: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE brokers
         SET current_workload = CASE WHEN current_workload > 0 THEN current_workload - 1 ELSE 0 END,
             active_conversations = CASE WHEN active_conversations > 0 THEN active_conversations - 1 ELSE 0 END,
             is_available = 1,
             updated_at = ?
         WHERE id = ?",
    )
    .bind(now)
    .bind(broker_id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

#[async_trait]
impl AssignmentRepository for Database {
    async fn assign_broker(&self, assignment: &BrokerAssignment) -> ApiResult<bool> {
        let now = now_timestamp();
        let mut tx = self.pool.begin().await?;

        // Conditional reservation first so the transaction holds the write lock from the start
        let reserved = sqlx::query(
            "UPDATE brokers
             SET current_workload = current_workload + 1,
                 active_conversations = active_conversations + 1,
                 is_available = CASE WHEN current_workload + 1 < max_concurrent_chats THEN 1 ELSE 0 END,
                 last_active_at = ?,
                 updated_at = ?
             WHERE id = ? AND is_active = 1 AND is_available = 1
               AND current_workload < max_concurrent_chats",
        )
        .bind(&now)
        .bind(&now)
        .bind(&assignment.broker_id)
        .execute(&mut *tx)
        .await?;

        if reserved.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        let previous = sqlx::query(
            "SELECT broker_id, status FROM broker_conversations WHERE conversation_id = ?",
        )
        .bind(assignment.conversation_id)
        .fetch_optional(&mut *tx)
        .await?;

        match previous {
            Some(row) => {
                let previous_broker: String = row.try_get("broker_id")?;
                let previous_status = AssignmentStatus::from(row.try_get::<String, _>("status")?);

                if previous_status == AssignmentStatus::Active {
                    if previous_broker == assignment.broker_id {
                        // Already holding a slot on this broker
                        tx.rollback().await?;
                        return Ok(true);
                    }
                    release_broker(&mut tx, &previous_broker, &now).await?;
                }

                sqlx::query(
                    "UPDATE broker_conversations
                     SET broker_id = ?, assignment_method = ?, assignment_reason = ?,
                         status = 'active', assigned_at = ?, updated_at = ?, completed_at = NULL
                     WHERE conversation_id = ?",
                )
                .bind(&assignment.broker_id)
                .bind(assignment.method.to_string())
                .bind(&assignment.reason)
                .bind(&assignment.assigned_at)
                .bind(&now)
                .bind(assignment.conversation_id)
                .execute(&mut *tx)
                .await?;
            }
            None => {
                sqlx::query(
                    "INSERT INTO broker_conversations (id, conversation_id, broker_id,
                         assignment_method, assignment_reason, status, assigned_at, updated_at)
                     VALUES (?, ?, ?, ?, ?, 'active', ?, ?)",
                )
                .bind(&assignment.id)
                .bind(assignment.conversation_id)
                .bind(&assignment.broker_id)
                .bind(assignment.method.to_string())
                .bind(&assignment.reason)
                .bind(&assignment.assigned_at)
                .bind(&now)
                .execute(&mut *tx)
                .await?;
            }
        }

        sqlx::query("UPDATE conversations SET broker_id = ?, updated_at = ? WHERE id = ?")
            .bind(&assignment.broker_id)
            .bind(&now)
            .bind(assignment.conversation_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            "Broker {} assigned to conversation {} ({})",
            assignment.broker_id,
            assignment.conversation_id,
            assignment.method
        );
        Ok(true)
    }

    async fn get_assignment(&self, conversation_id: i64) -> ApiResult<Option<BrokerAssignment>> {
        let row = sqlx::query(
            "SELECT id, conversation_id, broker_id, assignment_method, assignment_reason, status,
                    assigned_at, updated_at, completed_at
             FROM broker_conversations
             WHERE conversation_id = ?",
        )
        .bind(conversation_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(assignment_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn complete_conversation(&self, conversation_id: i64) -> ApiResult<CompletionRecord> {
        let now = now_timestamp();
        let mut tx = self.pool.begin().await?;

        let completed = sqlx::query(
            "UPDATE conversations
             SET status = 'completed', completed_at = ?, updated_at = ?
             WHERE id = ? AND status = 'active'",
        )
        .bind(&now)
        .bind(&now)
        .bind(conversation_id)
        .execute(&mut *tx)
        .await?;

        if completed.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(CompletionRecord::default());
        }

        let active = sqlx::query(
            "SELECT broker_id FROM broker_conversations
             WHERE conversation_id = ? AND status = 'active'",
        )
        .bind(conversation_id)
        .fetch_optional(&mut *tx)
        .await?;

        let mut released_broker_id = None;
        if let Some(row) = active {
            let broker_id: String = row.try_get("broker_id")?;

            sqlx::query(
                "UPDATE broker_conversations
                 SET status = 'completed', completed_at = ?, updated_at = ?
                 WHERE conversation_id = ?",
            )
            .bind(&now)
            .bind(&now)
            .bind(conversation_id)
            .execute(&mut *tx)
            .await?;

            release_broker(&mut tx, &broker_id, &now).await?;
            released_broker_id = Some(broker_id);
        }

        tx.commit().await?;

        tracing::info!(
            "Conversation {} completed, released broker {:?}",
            conversation_id,
            released_broker_id
        );
        Ok(CompletionRecord {
            completed: true,
            released_broker_id,
        })
    }
}
