use crate::domain::entities::{Conversation, ConversationStatus, LeadProfile};
use crate::domain::ports::conversation_repository::ConversationRepository;
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use crate::infrastructure::persistence::Database;
use crate::shared::utils::now_timestamp;
use async_trait::async_trait;
use sqlx::{any::AnyRow, Row};

fn conversation_from_row(row: &AnyRow) -> Result<Conversation, sqlx::Error> {
    let status: String = row.try_get("status")?;
    let lead_score: i64 = row.try_get("lead_score")?;
    let welcome_sent: i64 = row.try_get("welcome_sent")?;
    let busy_notice_sent: i64 = row.try_get("busy_notice_sent")?;

    Ok(Conversation {
        id: row.try_get("id")?,
        contact_id: row.try_get("contact_id")?,
        broker_id: row.try_get("broker_id")?,
        lead: LeadProfile {
            name: row.try_get("lead_name")?,
            email: row.try_get("lead_email")?,
            lead_score: lead_score as i32,
            loan_type: row.try_get("loan_type")?,
            property_type: row.try_get("property_type")?,
            monthly_income: row.try_get("monthly_income")?,
            timeline: row.try_get("timeline")?,
        },
        status: ConversationStatus::from(status),
        welcome_sent: welcome_sent != 0,
        busy_notice_sent: busy_notice_sent != 0,
        last_activity_at: row.try_get("last_activity_at")?,
        completed_at: row.try_get("completed_at")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl ConversationRepository for Database {
    async fn create_conversation(&self, conversation: &Conversation) -> ApiResult<()> {
        let result = sqlx::query(
            "INSERT INTO conversations (id, contact_id, broker_id, lead_name, lead_email, lead_score,
                 loan_type, property_type, monthly_income, timeline, status, welcome_sent,
                 busy_notice_sent, last_activity_at, completed_at, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(conversation.id)
        .bind(conversation.contact_id)
        .bind(&conversation.broker_id)
        .bind(&conversation.lead.name)
        .bind(&conversation.lead.email)
        .bind(conversation.lead.lead_score as i64)
        .bind(&conversation.lead.loan_type)
        .bind(&conversation.lead.property_type)
        .bind(conversation.lead.monthly_income)
        .bind(&conversation.lead.timeline)
        .bind(conversation.status.to_string())
        .bind(conversation.welcome_sent as i64)
        .bind(conversation.busy_notice_sent as i64)
        .bind(&conversation.last_activity_at)
        .bind(&conversation.completed_at)
        .bind(&conversation.created_at)
        .bind(&conversation.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err))
                if db_err.message().contains("UNIQUE") || db_err.message().contains("PRIMARY KEY") =>
            {
                Err(ApiError::Conflict(format!(
                    "Conversation {} already exists",
                    conversation.id
                )))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get_conversation_by_id(&self, conversation_id: i64) -> ApiResult<Option<Conversation>> {
        let row = sqlx::query(
            "SELECT id, contact_id, broker_id, lead_name, lead_email, lead_score, loan_type,
                    property_type, monthly_income, timeline, status, welcome_sent, busy_notice_sent,
                    last_activity_at, completed_at, created_at, updated_at
             FROM conversations
             WHERE id = ?",
        )
        .bind(conversation_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(conversation_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn touch_conversation(&self, conversation_id: i64) -> ApiResult<bool> {
        let now = now_timestamp();
        let result = sqlx::query(
            "UPDATE conversations SET last_activity_at = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&now)
        .bind(&now)
        .bind(conversation_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn mark_welcome_sent(&self, conversation_id: i64) -> ApiResult<()> {
        let now = now_timestamp();
        sqlx::query("UPDATE conversations SET welcome_sent = 1, updated_at = ? WHERE id = ?")
            .bind(&now)
            .bind(conversation_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn mark_busy_notice_sent(&self, conversation_id: i64) -> ApiResult<bool> {
        let now = now_timestamp();
        let result = sqlx::query(
            "UPDATE conversations SET busy_notice_sent = 1, updated_at = ?
             WHERE id = ? AND busy_notice_sent = 0",
        )
        .bind(&now)
        .bind(conversation_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_stale_conversation_ids(&self, before: &str) -> ApiResult<Vec<i64>> {
        let rows = sqlx::query(
            "SELECT id FROM conversations
             WHERE status = 'active' AND last_activity_at < ?
             ORDER BY last_activity_at ASC",
        )
        .bind(before)
        .fetch_all(&self.pool)
        .await?;

        let mut ids = Vec::with_capacity(rows.len());
        for row in rows {
            ids.push(row.try_get("id")?);
        }
        Ok(ids)
    }
}
