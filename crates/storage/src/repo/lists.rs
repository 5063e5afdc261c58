use crate::{models::SqlList, Db};
use chrono::Utc;
use domain::{ListDetails, ListId, UserId};
use sqlx::Row;

impl Db {
    pub async fn get_list(&self, list: ListId) -> anyhow::Result<Option<ListDetails>> {
        let row = sqlx::query_as::<_, SqlList>(
            r#"
            SELECT list_id, slug, owner_screen_name, name, member_count
            FROM lists
            WHERE list_id = ?
            "#,
        )
        .bind(list.0)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    pub async fn upsert_list(&self, details: &ListDetails) -> anyhow::Result<()> {
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO lists (list_id, slug, owner_screen_name, name, member_count, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(list_id) DO UPDATE SET
                slug = excluded.slug,
                owner_screen_name = excluded.owner_screen_name,
                name = excluded.name,
                member_count = excluded.member_count,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(details.id.0)
        .bind(&details.slug)
        .bind(&details.owner_screen_name)
        .bind(&details.name)
        .bind(details.member_count)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // 未知列表返回空集，不报错
    pub async fn get_list_members(&self, list: ListId) -> anyhow::Result<Vec<UserId>> {
        let rows = sqlx::query("SELECT user_id FROM list_members WHERE list_id = ?")
            .bind(list.0)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(|r| UserId(r.get(0))).collect())
    }

    // 全量替换快照：事务内先删后插，绝不留下半套成员
    pub async fn replace_list_members(&self, list: ListId, members: &[UserId]) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM list_members WHERE list_id = ?")
            .bind(list.0)
            .execute(&mut *tx)
            .await?;

        for member in members {
            sqlx::query("INSERT INTO list_members (list_id, user_id) VALUES (?, ?)")
                .bind(list.0)
                .bind(member.0)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
