use crate::models::ListId;
use serde::{Deserialize, Serialize};

/// Raised after a snapshot commit; by the time a subscriber sees the event
/// the store already reflects the new membership.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ReceiveEvent {
    ListMembersChanged { list: ListId },
}
