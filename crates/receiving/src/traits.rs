use async_trait::async_trait;
use domain::{DirectMessage, ListDescriptor, ListDetails, ListId, UserId, UserProfile};
use std::collections::HashSet;

use crate::error::ReceiveError;

#[derive(Debug, Clone)]
pub struct MemberPage {
    pub users: Vec<UserProfile>,
    /// Opaque cursor for the next page; 0 means enumeration is complete.
    pub next_cursor: i64,
}

#[async_trait]
pub trait MessageGateway: Send + Sync {
    async fn received_messages(&self, count: u32) -> Result<Vec<DirectMessage>, ReceiveError>;
    async fn sent_messages(&self, count: u32) -> Result<Vec<DirectMessage>, ReceiveError>;
}

#[async_trait]
pub trait ListGateway: Send + Sync {
    async fn show_list(&self, descriptor: &ListDescriptor) -> Result<ListDetails, ReceiveError>;
    async fn list_members(&self, list: ListId, cursor: i64) -> Result<MemberPage, ReceiveError>;
}

#[async_trait]
pub trait ListStore: Send + Sync {
    /// Unknown lists yield the empty set, never an error.
    async fn list_members(&self, list: ListId) -> anyhow::Result<HashSet<UserId>>;
    async fn set_list_members(&self, list: ListId, members: &[UserId]) -> anyhow::Result<()>;
    async fn set_list_description(&self, details: &ListDetails) -> anyhow::Result<()>;
    async fn store_profile(&self, profile: &UserProfile) -> anyhow::Result<()>;
}
