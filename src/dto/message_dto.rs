use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SendMessagePayload {
    pub recipient_id: Uuid,
    #[validate(length(min = 1, max = 5000))]
    pub content: String,
    pub related_job: Option<Uuid>,
    pub related_application: Option<Uuid>,
}
