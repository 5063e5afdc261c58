use domain::{AccountId, DirectMessage};
use tokio::sync::mpsc;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct InboxItem {
    pub account: AccountId,
    pub message: DirectMessage,
}

/// Multi-producer sink shared by all receivers. Enqueue never blocks and
/// never fails from the caller's perspective; de-duplication happens
/// downstream, not here.
#[derive(Clone)]
pub struct StatusInbox {
    tx: mpsc::UnboundedSender<InboxItem>,
}

impl StatusInbox {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<InboxItem>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn enqueue(&self, account: AccountId, message: DirectMessage) {
        if self
            .tx
            .send(InboxItem { account, message })
            .is_err()
        {
            warn!("status inbox closed, dropping message");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use domain::UserId;

    fn message(id: i64) -> DirectMessage {
        DirectMessage {
            id,
            sender_id: UserId(1),
            recipient_id: UserId(2),
            text: "hi".into(),
            created_at: NaiveDate::from_ymd_opt(2024, 5, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        }
    }

    #[tokio::test]
    async fn enqueue_reaches_consumer() {
        let (inbox, mut rx) = StatusInbox::channel();
        inbox.enqueue(AccountId(1), message(7));

        let item = rx.recv().await.unwrap();
        assert_eq!(item.account, AccountId(1));
        assert_eq!(item.message.id, 7);
    }

    #[tokio::test]
    async fn enqueue_after_close_is_silent() {
        let (inbox, rx) = StatusInbox::channel();
        drop(rx);
        // 消费端没了也不能让接收循环崩掉
        inbox.enqueue(AccountId(1), message(8));
    }
}
