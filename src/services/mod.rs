pub mod health_service;
pub mod message_service;
pub mod relay;
pub mod room_service;
pub mod token;

pub use health_service::HealthService;
pub use message_service::MessageService;
pub use relay::NotificationRelay;
pub use room_service::RoomService;
