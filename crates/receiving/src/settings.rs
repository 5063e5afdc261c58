use std::sync::{Arc, RwLock};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ReceiveSettings {
    pub message_interval_secs: u64,
    pub list_member_interval_secs: u64,
}

impl Default for ReceiveSettings {
    fn default() -> Self {
        Self {
            message_interval_secs: 90,
            list_member_interval_secs: 1800,
        }
    }
}

/// Live view of the receive intervals. Receivers read through this handle at
/// the top of every cycle, so `update` takes effect on the next wait without
/// restarting any loop.
#[derive(Clone, Default)]
pub struct SettingsHandle {
    inner: Arc<RwLock<ReceiveSettings>>,
}

impl SettingsHandle {
    pub fn new(settings: ReceiveSettings) -> Self {
        Self {
            inner: Arc::new(RwLock::new(settings)),
        }
    }

    pub fn message_interval(&self) -> Duration {
        Duration::from_secs(self.inner.read().unwrap().message_interval_secs.max(1))
    }

    pub fn list_member_interval(&self) -> Duration {
        Duration::from_secs(self.inner.read().unwrap().list_member_interval_secs.max(1))
    }

    pub fn update(&self, apply: impl FnOnce(&mut ReceiveSettings)) {
        apply(&mut self.inner.write().unwrap());
    }
}
