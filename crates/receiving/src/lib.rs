mod cycle;
mod error;
mod inbox;
mod manager;
mod receivers;
mod rest;
mod settings;
mod store;
mod traits;

pub use cycle::{spawn_receiver, CycleOutcome, CyclicReceiver, ReceiverHandle};
pub use error::ReceiveError;
pub use inbox::{InboxItem, StatusInbox};
pub use manager::{ReceiveManager, ReceiverKey};
pub use receivers::{ListMemberReceiver, MessagesReceiver};
pub use rest::RestClient;
pub use settings::{ReceiveSettings, SettingsHandle};
pub use traits::{ListGateway, ListStore, MemberPage, MessageGateway};
