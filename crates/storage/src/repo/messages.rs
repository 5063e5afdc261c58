use crate::{models::SqlMessage, Db};
use domain::{AccountId, DirectMessage};

impl Db {
    // inbox 可能重复投递同一条消息，按 id 去重
    pub async fn store_message(
        &self,
        account: AccountId,
        message: &DirectMessage,
    ) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO messages (id, account_id, sender_id, recipient_id, content, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(message.id)
        .bind(account.0)
        .bind(message.sender_id.0)
        .bind(message.recipient_id.0)
        .bind(&message.text)
        .bind(message.created_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn recent_messages(
        &self,
        account: AccountId,
        limit: i64,
    ) -> anyhow::Result<Vec<DirectMessage>> {
        let rows = sqlx::query_as::<_, SqlMessage>(
            r#"
            SELECT id, sender_id, recipient_id, content, created_at
            FROM messages
            WHERE account_id = ?
            ORDER BY created_at DESC
            LIMIT ?
            "#,
        )
        .bind(account.0)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use domain::UserId;

    fn message(id: i64, day: u32) -> DirectMessage {
        DirectMessage {
            id,
            sender_id: UserId(100),
            recipient_id: UserId(200),
            text: format!("message {id}"),
            created_at: NaiveDate::from_ymd_opt(2024, 5, day)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
        }
    }

    #[tokio::test]
    async fn store_message_is_idempotent() {
        let db = Db::open_in_memory().await.unwrap();
        let account = AccountId(1);

        assert!(db.store_message(account, &message(10, 1)).await.unwrap());
        assert!(!db.store_message(account, &message(10, 1)).await.unwrap());

        let stored = db.recent_messages(account, 50).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].text, "message 10");
    }

    #[tokio::test]
    async fn recent_messages_newest_first() {
        let db = Db::open_in_memory().await.unwrap();
        let account = AccountId(1);

        for (id, day) in [(10, 1), (11, 3), (12, 2)] {
            db.store_message(account, &message(id, day)).await.unwrap();
        }

        let stored = db.recent_messages(account, 2).await.unwrap();
        let ids: Vec<i64> = stored.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![11, 12]);
    }
}
