use async_trait::async_trait;
use chrono::NaiveDateTime;
use domain::{Account, DirectMessage, ListDescriptor, ListDetails, ListId, UserId, UserProfile};
use reqwest::StatusCode;
use serde::Deserialize;

use crate::error::ReceiveError;
use crate::traits::{ListGateway, MemberPage, MessageGateway};

/// Account-scoped REST gateway. One instance per configured account; the
/// receivers only ever see the narrow gateway traits.
pub struct RestClient {
    http: reqwest::Client,
    base_url: String,
    account: Account,
}

impl RestClient {
    pub fn new(base_url: impl Into<String>, account: Account) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            account,
        }
    }

    async fn get_json<T>(&self, path: &str, query: &[(&str, String)]) -> Result<T, ReceiveError>
    where
        T: serde::de::DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, path);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.account.access_token)
            .query(query)
            .send()
            .await
            .map_err(|e| ReceiveError::Transport(e.to_string()))?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(ReceiveError::Authorization(format!(
                    "@{}: {}",
                    self.account.screen_name,
                    response.status()
                )));
            }
            status if !status.is_success() => {
                return Err(ReceiveError::Transport(format!(
                    "{path} returned {status}"
                )));
            }
            _ => {}
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ReceiveError::Transport(e.to_string()))
    }
}

#[derive(Deserialize)]
struct WireMessage {
    id: i64,
    sender_id: i64,
    recipient_id: i64,
    text: String,
    created_at: NaiveDateTime,
}

impl From<WireMessage> for DirectMessage {
    fn from(wire: WireMessage) -> Self {
        DirectMessage {
            id: wire.id,
            sender_id: UserId(wire.sender_id),
            recipient_id: UserId(wire.recipient_id),
            text: wire.text,
            created_at: wire.created_at,
        }
    }
}

#[derive(Deserialize)]
struct WireList {
    id: i64,
    slug: String,
    owner_screen_name: String,
    name: String,
    #[serde(default)]
    member_count: i64,
}

impl From<WireList> for ListDetails {
    fn from(wire: WireList) -> Self {
        ListDetails {
            id: ListId(wire.id),
            slug: wire.slug,
            owner_screen_name: wire.owner_screen_name,
            name: wire.name,
            member_count: wire.member_count,
        }
    }
}

#[derive(Deserialize)]
struct WireUser {
    id: i64,
    screen_name: String,
    name: Option<String>,
    profile_image_url: Option<String>,
}

impl From<WireUser> for UserProfile {
    fn from(wire: WireUser) -> Self {
        UserProfile {
            id: UserId(wire.id),
            screen_name: wire.screen_name,
            display_name: wire.name,
            avatar_url: wire.profile_image_url,
        }
    }
}

#[derive(Deserialize)]
struct WireMemberPage {
    users: Vec<WireUser>,
    next_cursor: i64,
}

#[async_trait]
impl MessageGateway for RestClient {
    async fn received_messages(&self, count: u32) -> Result<Vec<DirectMessage>, ReceiveError> {
        let messages: Vec<WireMessage> = self
            .get_json("direct_messages.json", &[("count", count.to_string())])
            .await?;
        Ok(messages.into_iter().map(Into::into).collect())
    }

    async fn sent_messages(&self, count: u32) -> Result<Vec<DirectMessage>, ReceiveError> {
        let messages: Vec<WireMessage> = self
            .get_json("direct_messages/sent.json", &[("count", count.to_string())])
            .await?;
        Ok(messages.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl ListGateway for RestClient {
    async fn show_list(&self, descriptor: &ListDescriptor) -> Result<ListDetails, ReceiveError> {
        let list: WireList = self
            .get_json(
                "lists/show.json",
                &[
                    ("owner_screen_name", descriptor.owner_screen_name.clone()),
                    ("slug", descriptor.slug.clone()),
                ],
            )
            .await?;
        Ok(list.into())
    }

    async fn list_members(&self, list: ListId, cursor: i64) -> Result<MemberPage, ReceiveError> {
        let page: WireMemberPage = self
            .get_json(
                "lists/members.json",
                &[
                    ("list_id", list.to_string()),
                    ("cursor", cursor.to_string()),
                ],
            )
            .await?;
        Ok(MemberPage {
            users: page.users.into_iter().map(Into::into).collect(),
            next_cursor: page.next_cursor,
        })
    }
}
