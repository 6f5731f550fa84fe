use std::sync::Arc;

use crate::api::{ApiError, Backend, Result};
use crate::models::{
    ContactMessage, ContactStatus, NewContactMessage, PaginationEnvelope, QueryParams,
    ReplyPayload,
};
use crate::query::{Mutation, QueryClient, QueryKey, Resource};

#[derive(Clone)]
pub struct ContactsResource {
    backend: Arc<dyn Backend>,
    cache: QueryClient,
}

impl ContactsResource {
    pub fn new(backend: Arc<dyn Backend>, cache: QueryClient) -> Self {
        Self { backend, cache }
    }

    pub fn list_key(params: &QueryParams) -> QueryKey {
        QueryKey::list(Resource::Contacts, params.clone())
    }

    pub fn detail_key(id: &str) -> QueryKey {
        QueryKey::detail(Resource::Contacts, id)
    }

    pub async fn list(&self, params: &QueryParams) -> Result<PaginationEnvelope<ContactMessage>> {
        self.cache
            .fetch(Self::list_key(params), || self.backend.list_contacts(params))
            .await
    }

    pub async fn get(&self, id: &str) -> Result<ContactMessage> {
        self.cache
            .fetch(Self::detail_key(id), || self.backend.get_contact(id))
            .await
    }

    pub async fn create(&self, message: &NewContactMessage) -> Result<ContactMessage> {
        Mutation::new(&self.cache, "Send contact message")
            .invalidates(Resource::Contacts)
            .invalidates(Resource::Dashboard)
            .run(self.backend.create_contact(message))
            .await
    }

    pub async fn reply(&self, id: &str, reply: &ReplyPayload) -> Result<ContactMessage> {
        Mutation::new(&self.cache, "Reply to contact message")
            .invalidates(Resource::Contacts)
            .invalidates(Resource::Dashboard)
            .seeds(|msg: &ContactMessage| Self::detail_key(&msg.id))
            .run(self.backend.reply_to_contact(id, reply))
            .await
    }

    pub async fn transition(
        &self,
        message: &ContactMessage,
        to: ContactStatus,
    ) -> Result<ContactMessage> {
        if !message.status.can_transition_to(to) {
            return Err(ApiError::InvalidRequest(format!(
                "Message is already {}",
                to.label()
            )));
        }
        Mutation::new(&self.cache, "Update message status")
            .invalidates(Resource::Contacts)
            .invalidates(Resource::Dashboard)
            .seeds(|msg: &ContactMessage| Self::detail_key(&msg.id))
            .run(self.backend.update_contact_status(&message.id, to))
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        Mutation::new(&self.cache, "Delete message")
            .invalidates(Resource::Contacts)
            .invalidates(Resource::Dashboard)
            .run(self.backend.delete_contact(id))
            .await
    }
}
