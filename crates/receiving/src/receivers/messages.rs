use async_trait::async_trait;
use domain::Account;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::cycle::{CycleOutcome, CyclicReceiver};
use crate::error::ReceiveError;
use crate::inbox::StatusInbox;
use crate::settings::SettingsHandle;
use crate::traits::MessageGateway;

const MESSAGE_FETCH_COUNT: u32 = 50;

/// Polls received and sent direct messages for one account and fans both
/// result sets out into the shared inbox. No ordering between the branches,
/// no de-duplication here.
pub struct MessagesReceiver {
    account: Account,
    gateway: Arc<dyn MessageGateway>,
    inbox: StatusInbox,
    settings: SettingsHandle,
}

impl MessagesReceiver {
    pub fn new(
        account: Account,
        gateway: Arc<dyn MessageGateway>,
        inbox: StatusInbox,
        settings: SettingsHandle,
    ) -> Self {
        Self {
            account,
            gateway,
            inbox,
            settings,
        }
    }
}

#[async_trait]
impl CyclicReceiver for MessagesReceiver {
    fn name(&self) -> String {
        format!("direct messages (@{})", self.account.screen_name)
    }

    fn interval(&self) -> Duration {
        self.settings.message_interval()
    }

    async fn do_receive(&mut self) -> Result<CycleOutcome, ReceiveError> {
        let (received, sent) = tokio::join!(
            self.gateway.received_messages(MESSAGE_FETCH_COUNT),
            self.gateway.sent_messages(MESSAGE_FETCH_COUNT),
        );

        // 一个分支挂掉不能拦住另一个分支的结果进 inbox
        let mut last_error = None;
        let mut any_succeeded = false;
        for branch in [received, sent] {
            match branch {
                Ok(messages) => {
                    for message in messages {
                        self.inbox.enqueue(self.account.id, message);
                    }
                    any_succeeded = true;
                }
                Err(e) => {
                    warn!(account = %self.account.screen_name, "message fetch branch failed: {e}");
                    last_error = Some(e);
                }
            }
        }

        match (any_succeeded, last_error) {
            (false, Some(e)) => Err(e),
            _ => Ok(CycleOutcome::Received),
        }
    }
}
