use crate::{models::SqlProfile, Db};
use chrono::Utc;
use domain::UserProfile;

impl Db {
    // 获取本地缓存的 Profile（24 小时内视为新鲜）
    pub async fn get_cached_profile(&self, user_id: i64) -> anyhow::Result<Option<SqlProfile>> {
        let threshold = Utc::now().naive_utc() - chrono::Duration::hours(24);

        let profile = sqlx::query_as::<_, SqlProfile>(
            r#"
            SELECT user_id, screen_name, display_name, avatar_url, last_updated_at
            FROM profiles
            WHERE user_id = ? AND last_updated_at > ?
            "#,
        )
        .bind(user_id)
        .bind(threshold)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    // 更新 Profile 缓存
    pub async fn upsert_profile(&self, profile: &UserProfile) -> anyhow::Result<()> {
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO profiles (user_id, screen_name, display_name, avatar_url, last_updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                screen_name = excluded.screen_name,
                display_name = excluded.display_name,
                avatar_url = excluded.avatar_url,
                last_updated_at = excluded.last_updated_at
            "#,
        )
        .bind(profile.id.0)
        .bind(&profile.screen_name)
        .bind(&profile.display_name)
        .bind(&profile.avatar_url)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
