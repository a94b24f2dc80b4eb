use crate::domain::entities::{Broker, PersonalityType};
use crate::domain::ports::broker_repository::BrokerRepository;
use crate::infrastructure::http::middleware::error::ApiResult;
use crate::infrastructure::persistence::Database;
use async_trait::async_trait;
use sqlx::{any::AnyRow, Row};

const BROKER_COLUMNS: &str = "id, name, slug, role, photo_url, personality_type, communication_style,
     approach_style, voice_description, current_workload, active_conversations,
     max_concurrent_chats, is_available, is_active, last_active_at, created_at, updated_at";

pub(super) fn broker_from_row(row: &AnyRow) -> Result<Broker, sqlx::Error> {
    let personality: String = row.try_get("personality_type")?;
    let current_workload: i64 = row.try_get("current_workload")?;
    let active_conversations: i64 = row.try_get("active_conversations")?;
    let max_concurrent_chats: i64 = row.try_get("max_concurrent_chats")?;
    let is_available: i64 = row.try_get("is_available")?;
    let is_active: i64 = row.try_get("is_active")?;

    Ok(Broker {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        slug: row.try_get("slug")?,
        role: row.try_get("role")?,
        photo_url: row.try_get("photo_url")?,
        personality_type: PersonalityType::from(personality),
        communication_style: row.try_get("communication_style")?,
        approach_style: row.try_get("approach_style")?,
        voice_description: row.try_get("voice_description")?,
        current_workload: current_workload as i32,
        active_conversations: active_conversations as i32,
        max_concurrent_chats: max_concurrent_chats as i32,
        is_available: is_available != 0,
        is_active: is_active != 0,
        last_active_at: row.try_get("last_active_at")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl BrokerRepository for Database {
    async fn create_broker(&self, broker: &Broker) -> ApiResult<()> {
        sqlx::query(
            "INSERT INTO brokers (id, name, slug, role, photo_url, personality_type,
                 communication_style, approach_style, voice_description, current_workload,
                 active_conversations, max_concurrent_chats, is_available, is_active,
                 last_active_at, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&broker.id)
        .bind(&broker.name)
        .bind(&broker.slug)
        .bind(&broker.role)
        .bind(&broker.photo_url)
        .bind(broker.personality_type.to_string())
        .bind(&broker.communication_style)
        .bind(&broker.approach_style)
        .bind(&broker.voice_description)
        .bind(broker.current_workload as i64)
        .bind(broker.active_conversations as i64)
        .bind(broker.max_concurrent_chats as i64)
        .bind(broker.is_available as i64)
        .bind(broker.is_active as i64)
        .bind(&broker.last_active_at)
        .bind(&broker.created_at)
        .bind(&broker.updated_at)
        .execute(&self.pool)
        .await?;

        tracing::info!(
            "Broker created: id={}, name={}, personality={}",
            broker.id,
            broker.name,
            broker.personality_type
        );
        Ok(())
    }

    async fn get_broker_by_id(&self, broker_id: &str) -> ApiResult<Option<Broker>> {
        let row = sqlx::query(&format!("SELECT {} FROM brokers WHERE id = ?", BROKER_COLUMNS))
            .bind(broker_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(broker_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn list_active_brokers(&self) -> ApiResult<Vec<Broker>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM brokers WHERE is_active = 1 ORDER BY name",
            BROKER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        let mut brokers = Vec::with_capacity(rows.len());
        for row in rows {
            brokers.push(broker_from_row(&row)?);
        }
        Ok(brokers)
    }

    async fn list_assignable_brokers(&self) -> ApiResult<Vec<Broker>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM brokers
             WHERE is_active = 1 AND is_available = 1 AND current_workload < max_concurrent_chats
             ORDER BY current_workload ASC, id ASC",
            BROKER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        let mut brokers = Vec::with_capacity(rows.len());
        for row in rows {
            brokers.push(broker_from_row(&row)?);
        }
        Ok(brokers)
    }

    async fn count_brokers(&self) -> ApiResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM brokers")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("total")?)
    }
}
