use crate::services::message_service::MessageView;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomResponse {
    pub room_id: String,
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TtlResponse {
    pub seconds: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PostMessageRequest {
    pub sender: String,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ListMessagesResponse {
    pub messages: Vec<MessageView>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub store: String,
}
