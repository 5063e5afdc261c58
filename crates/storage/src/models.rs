use chrono::NaiveDateTime;
use domain::{DirectMessage, ListDetails, ListId, UserId};
use sqlx::FromRow;

#[derive(FromRow)]
pub struct SqlList {
    pub list_id: i64,
    pub slug: String,
    pub owner_screen_name: String,
    pub name: String,
    pub member_count: i64,
}

impl From<SqlList> for ListDetails {
    fn from(sql: SqlList) -> Self {
        ListDetails {
            id: ListId(sql.list_id),
            slug: sql.slug,
            owner_screen_name: sql.owner_screen_name,
            name: sql.name,
            member_count: sql.member_count,
        }
    }
}

// Profile 缓存模型
#[derive(FromRow)]
pub struct SqlProfile {
    pub user_id: i64,
    pub screen_name: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub last_updated_at: NaiveDateTime,
}

#[derive(FromRow)]
pub struct SqlMessage {
    pub id: i64,
    pub sender_id: i64,
    pub recipient_id: i64,
    pub content: String,
    pub created_at: NaiveDateTime,
}

impl From<SqlMessage> for DirectMessage {
    fn from(sql: SqlMessage) -> Self {
        DirectMessage {
            id: sql.id,
            sender_id: UserId(sql.sender_id),
            recipient_id: UserId(sql.recipient_id),
            text: sql.content,
            created_at: sql.created_at,
        }
    }
}
