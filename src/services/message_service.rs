use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::dto::message_dto::SendMessagePayload;
use crate::error::{Error, Result};
use crate::models::message::{Message, NewMessage};
use crate::models::user::User;
use crate::store::EntityStore;

#[derive(Clone)]
pub struct MessageService {
    store: Arc<dyn EntityStore>,
}

impl MessageService {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    pub async fn send(&self, actor: &User, payload: SendMessagePayload) -> Result<Message> {
        let recipient = self
            .store
            .user_by_id(payload.recipient_id)
            .await?
            .ok_or_else(|| Error::NotFound("Recipient not found".to_string()))?;

        // One thread per user pair; reuse it if any message already exists.
        let thread_id = match self.store.thread_between(actor.id, recipient.id).await? {
            Some(thread_id) => thread_id,
            None => Uuid::new_v4(),
        };

        self.store
            .insert_message(NewMessage {
                thread_id,
                sender_id: actor.id,
                sender_role: actor.role,
                recipient_id: recipient.id,
                content: payload.content,
                related_job: payload.related_job,
                related_application: payload.related_application,
            })
            .await
    }

    /// The actor's conversation with `other`. Fetching marks the incoming
    /// side read.
    pub async fn thread_with(&self, actor: &User, other: Uuid) -> Result<Vec<Message>> {
        let Some(thread_id) = self.store.thread_between(actor.id, other).await? else {
            return Ok(Vec::new());
        };
        self.store
            .mark_thread_read(thread_id, actor.id, Utc::now())
            .await?;
        self.store.messages_by_thread(thread_id).await
    }

    pub async fn unread_count(&self, actor: &User) -> Result<i64> {
        self.store.unread_count(actor.id).await
    }
}
