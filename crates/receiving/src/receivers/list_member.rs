use async_trait::async_trait;
use domain::{ListDescriptor, ListId, ReceiveEvent, UserId, UserProfile};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::debug;

use crate::cycle::{CycleOutcome, CyclicReceiver};
use crate::error::ReceiveError;
use crate::settings::SettingsHandle;
use crate::traits::{ListGateway, ListStore};

const CURSOR_START: i64 = -1;
const CURSOR_END: i64 = 0;

/// Watches one list's membership. Each cycle enumerates the full current
/// membership and commits a new snapshot only when it differs from the
/// previous one as an unordered set.
pub struct ListMemberReceiver {
    descriptor: ListDescriptor,
    gateway: Arc<dyn ListGateway>,
    store: Arc<dyn ListStore>,
    events: broadcast::Sender<ReceiveEvent>,
    settings: SettingsHandle,
    list_id: Option<ListId>,
}

impl ListMemberReceiver {
    pub fn new(
        descriptor: ListDescriptor,
        gateway: Arc<dyn ListGateway>,
        store: Arc<dyn ListStore>,
        events: broadcast::Sender<ReceiveEvent>,
        settings: SettingsHandle,
    ) -> Self {
        Self {
            descriptor,
            gateway,
            store,
            events,
            settings,
            list_id: None,
        }
    }

    async fn resolve_list(&mut self) -> Result<ListId, ReceiveError> {
        let details = self.gateway.show_list(&self.descriptor).await.map_err(|e| {
            ReceiveError::ListResolution {
                descriptor: self.descriptor.clone(),
                reason: e.to_string(),
            }
        })?;
        self.store.set_list_description(&details).await?;
        // 只有完整成功才缓存 id，失败的解析下个周期重来
        self.list_id = Some(details.id);
        Ok(details.id)
    }

    async fn enumerate_members(&self, list: ListId) -> Result<Vec<UserId>, ReceiveError> {
        let mut members = Vec::new();
        let mut cursor = CURSOR_START;
        loop {
            let page = self.gateway.list_members(list, cursor).await?;
            members.extend(page.users.iter().map(|u| u.id));
            self.cache_profiles(page.users);
            cursor = page.next_cursor;
            if cursor == CURSOR_END {
                break;
            }
        }
        Ok(members)
    }

    // 顺手写 profile 缓存，纯尽力而为，失败不影响枚举
    fn cache_profiles(&self, users: Vec<UserProfile>) {
        if users.is_empty() {
            return;
        }
        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            for user in users {
                if let Err(e) = store.store_profile(&user).await {
                    debug!("profile cache write failed for {}: {e}", user.id);
                }
            }
        });
    }
}

#[async_trait]
impl CyclicReceiver for ListMemberReceiver {
    fn name(&self) -> String {
        format!("list members ({})", self.descriptor)
    }

    fn interval(&self) -> Duration {
        self.settings.list_member_interval()
    }

    async fn do_receive(&mut self) -> Result<CycleOutcome, ReceiveError> {
        let list = match self.list_id {
            Some(id) => id,
            None => self.resolve_list().await?,
        };

        let previous = self.store.list_members(list).await?;
        let members = self.enumerate_members(list).await?;

        let current: HashSet<UserId> = members.iter().copied().collect();
        if current == previous {
            return Ok(CycleOutcome::NoChange);
        }

        let mut sorted: Vec<UserId> = current.into_iter().collect();
        sorted.sort_unstable();

        // 先提交快照再广播，订阅者看到事件时存储已是新状态
        self.store.set_list_members(list, &sorted).await?;
        let _ = self.events.send(ReceiveEvent::ListMembersChanged { list });
        Ok(CycleOutcome::Received)
    }
}
