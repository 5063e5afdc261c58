use async_trait::async_trait;
use domain::{ListDetails, ListId, UserId, UserProfile};
use std::collections::HashSet;
use storage::Db;

use crate::traits::ListStore;

#[async_trait]
impl ListStore for Db {
    async fn list_members(&self, list: ListId) -> anyhow::Result<HashSet<UserId>> {
        Ok(self.get_list_members(list).await?.into_iter().collect())
    }

    async fn set_list_members(&self, list: ListId, members: &[UserId]) -> anyhow::Result<()> {
        self.replace_list_members(list, members).await
    }

    async fn set_list_description(&self, details: &ListDetails) -> anyhow::Result<()> {
        self.upsert_list(details).await
    }

    async fn store_profile(&self, profile: &UserProfile) -> anyhow::Result<()> {
        self.upsert_profile(profile).await
    }
}
