mod list_member;
mod messages;

pub use list_member::ListMemberReceiver;
pub use messages::MessagesReceiver;
