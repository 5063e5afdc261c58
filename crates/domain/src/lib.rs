mod events;
mod models;

pub use events::ReceiveEvent;
pub use models::{
    Account, AccountId, DirectMessage, ListDescriptor, ListDetails, ListId, UserId, UserProfile,
};
