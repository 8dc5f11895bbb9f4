pub mod event;
pub mod message;
pub mod room;

pub use event::RoomEvent;
pub use message::{Message, StoredMessage};
pub use room::RoomMeta;
