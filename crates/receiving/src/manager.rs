use domain::{Account, AccountId, ListDescriptor, ReceiveEvent};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::cycle::{spawn_receiver, ReceiverHandle};
use crate::inbox::StatusInbox;
use crate::receivers::{ListMemberReceiver, MessagesReceiver};
use crate::settings::SettingsHandle;
use crate::traits::{ListGateway, ListStore, MessageGateway};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReceiverKey {
    Messages(AccountId),
    ListMembers(AccountId, ListDescriptor),
}

/// Owns the set of running receiver loops, one per tracked resource.
/// Creating a loop for a key that is already live is a no-op; stopping an
/// unknown key is a no-op.
pub struct ReceiveManager {
    settings: SettingsHandle,
    store: Arc<dyn ListStore>,
    inbox: StatusInbox,
    events: broadcast::Sender<ReceiveEvent>,
    loops: Mutex<HashMap<ReceiverKey, ReceiverHandle>>,
    shutdown: CancellationToken,
}

impl ReceiveManager {
    pub fn new(settings: SettingsHandle, store: Arc<dyn ListStore>, inbox: StatusInbox) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            settings,
            store,
            inbox,
            events,
            loops: Mutex::new(HashMap::new()),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ReceiveEvent> {
        self.events.subscribe()
    }

    pub async fn track_account(&self, account: Account, gateway: Arc<dyn MessageGateway>) {
        let key = ReceiverKey::Messages(account.id);
        let mut loops = self.loops.lock().await;
        if loops.contains_key(&key) {
            return;
        }
        info!(account = %account.screen_name, "starting message receiver");
        let receiver = MessagesReceiver::new(
            account,
            gateway,
            self.inbox.clone(),
            self.settings.clone(),
        );
        loops.insert(key, spawn_receiver(receiver, self.shutdown.child_token()));
    }

    pub async fn watch_list(
        &self,
        account: AccountId,
        descriptor: ListDescriptor,
        gateway: Arc<dyn ListGateway>,
    ) {
        let key = ReceiverKey::ListMembers(account, descriptor.clone());
        let mut loops = self.loops.lock().await;
        if loops.contains_key(&key) {
            return;
        }
        info!(list = %descriptor, "starting list member receiver");
        let receiver = ListMemberReceiver::new(
            descriptor,
            gateway,
            Arc::clone(&self.store),
            self.events.clone(),
            self.settings.clone(),
        );
        loops.insert(key, spawn_receiver(receiver, self.shutdown.child_token()));
    }

    pub async fn untrack_account(&self, account: AccountId) {
        self.stop_key(&ReceiverKey::Messages(account)).await;
    }

    pub async fn unwatch_list(&self, account: AccountId, descriptor: &ListDescriptor) {
        self.stop_key(&ReceiverKey::ListMembers(account, descriptor.clone()))
            .await;
    }

    pub async fn active_count(&self) -> usize {
        self.loops.lock().await.len()
    }

    async fn stop_key(&self, key: &ReceiverKey) {
        let handle = self.loops.lock().await.remove(key);
        if let Some(handle) = handle {
            handle.stop().await;
        }
    }

    /// Stops every loop. Pending waits are cancelled at once; in-flight
    /// cycles finish first.
    pub async fn shutdown(&self) {
        self.shutdown.cancel();
        let handles: Vec<ReceiverHandle> = {
            let mut loops = self.loops.lock().await;
            loops.drain().map(|(_, handle)| handle).collect()
        };
        info!("stopping {} receiver loops", handles.len());
        for handle in handles {
            handle.stop().await;
        }
    }
}
