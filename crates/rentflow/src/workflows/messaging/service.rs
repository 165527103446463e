use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info};

use crate::actor::UserId;
use crate::workflows::leads::{LeadId, LeadRepository};
use crate::workflows::properties::{PropertyId, PropertyRepository};
use crate::workflows::store::{system_clock, Clock, IdSequence, RepositoryError};

use super::domain::{Conversation, ConversationId, Counterpart, Message, MessageId};
use super::repository::ConversationRepository;

static CONVERSATION_SEQUENCE: IdSequence = IdSequence::new("conv");
static MESSAGE_SEQUENCE: IdSequence = IdSequence::new("msg");

const MAX_BODY_CHARS: usize = 4_000;

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CounterpartRequest {
    Tenant { user_id: UserId },
    Lead { lead_id: LeadId },
}

#[derive(Debug, Clone, Deserialize)]
pub struct StartConversation {
    pub property_id: PropertyId,
    pub counterpart: CounterpartRequest,
}

/// Manager-to-tenant/lead threads scoped to a property.
pub struct MessagingService<R> {
    repository: Arc<R>,
    properties: Arc<dyn PropertyRepository>,
    leads: Arc<dyn LeadRepository>,
    clock: Clock,
}

impl<R> MessagingService<R>
where
    R: ConversationRepository + 'static,
{
    pub fn new(
        repository: Arc<R>,
        properties: Arc<dyn PropertyRepository>,
        leads: Arc<dyn LeadRepository>,
    ) -> Self {
        Self {
            repository,
            properties,
            leads,
            clock: system_clock,
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Open a thread, or return the existing one for the same property and counterpart.
    pub fn start_conversation(
        &self,
        manager: &UserId,
        request: StartConversation,
    ) -> Result<Conversation, MessagingError> {
        let property = self
            .properties
            .fetch(&request.property_id)?
            .ok_or(MessagingError::PropertyNotFound)?;
        if !property.is_managed_by(manager) {
            return Err(MessagingError::Forbidden);
        }

        let counterpart = match request.counterpart {
            CounterpartRequest::Tenant { user_id } => {
                if user_id.0.trim().is_empty() {
                    return Err(MessagingError::InvalidCounterpart("user_id is required"));
                }
                Counterpart::Tenant { user_id }
            }
            CounterpartRequest::Lead { lead_id } => {
                let lead = self
                    .leads
                    .fetch(&lead_id)?
                    .filter(|lead| lead.property_id == property.id)
                    .ok_or(MessagingError::InvalidCounterpart(
                        "lead does not belong to this property",
                    ))?;
                Counterpart::Lead {
                    lead_id,
                    email: lead.email,
                }
            }
        };

        let existing = self
            .repository
            .list_for_participant(manager)?
            .into_iter()
            .find(|conversation| {
                conversation.property_id == property.id && conversation.counterpart == counterpart
            });
        if let Some(conversation) = existing {
            debug!(conversation_id = %conversation.id, "reusing conversation");
            return Ok(conversation);
        }

        let conversation = Conversation {
            id: ConversationId(CONVERSATION_SEQUENCE.next_id()),
            property_id: property.id,
            manager_id: manager.clone(),
            counterpart,
            created_at: (self.clock)(),
        };
        let stored = self.repository.insert(conversation)?;
        info!(conversation_id = %stored.id, property_id = %stored.property_id, "conversation started");
        Ok(stored)
    }

    pub fn list_for_participant(&self, user: &UserId) -> Result<Vec<Conversation>, MessagingError> {
        let mut conversations = self.repository.list_for_participant(user)?;
        conversations.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.0.cmp(&b.id.0))
        });
        Ok(conversations)
    }

    pub fn post_message(
        &self,
        author: &UserId,
        conversation_id: &ConversationId,
        body: &str,
    ) -> Result<Message, MessagingError> {
        self.participating(author, conversation_id)?;
        let body = body.trim();
        if body.is_empty() {
            return Err(MessagingError::EmptyBody);
        }
        if body.chars().count() > MAX_BODY_CHARS {
            return Err(MessagingError::BodyTooLong(MAX_BODY_CHARS));
        }

        let message = Message {
            id: MessageId(MESSAGE_SEQUENCE.next_id()),
            conversation_id: conversation_id.clone(),
            author_id: author.clone(),
            body: body.to_string(),
            created_at: (self.clock)(),
        };
        Ok(self.repository.append_message(message)?)
    }

    /// Thread contents in creation order; ties keep insertion order.
    pub fn messages(
        &self,
        reader: &UserId,
        conversation_id: &ConversationId,
    ) -> Result<Vec<Message>, MessagingError> {
        self.participating(reader, conversation_id)?;
        let mut messages = self.repository.messages(conversation_id)?;
        messages.sort_by_key(|message| message.created_at);
        Ok(messages)
    }

    fn participating(
        &self,
        user: &UserId,
        conversation_id: &ConversationId,
    ) -> Result<Conversation, MessagingError> {
        let conversation = self
            .repository
            .fetch(conversation_id)?
            .ok_or(MessagingError::NotFound)?;
        if !conversation.is_participant(user) {
            return Err(MessagingError::Forbidden);
        }
        Ok(conversation)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MessagingError {
    #[error("conversation not found")]
    NotFound,
    #[error("property not found")]
    PropertyNotFound,
    #[error("not a participant in this conversation")]
    Forbidden,
    #[error("invalid counterpart: {0}")]
    InvalidCounterpart(&'static str),
    #[error("message body cannot be empty")]
    EmptyBody,
    #[error("message body exceeds {0} characters")]
    BodyTooLong(usize),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::leads::{Lead, LeadStatus};
    use crate::workflows::properties::{Property, PropertyDetails, PropertyStatus};
    use chrono::{DateTime, TimeZone, Utc};
    use std::collections::HashMap;
    use std::sync::Mutex;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, 2, 8, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    #[derive(Default)]
    struct MemoryThreads {
        conversations: Mutex<Vec<Conversation>>,
        messages: Mutex<Vec<Message>>,
    }

    impl ConversationRepository for MemoryThreads {
        fn insert(&self, conversation: Conversation) -> Result<Conversation, RepositoryError> {
            self.conversations
                .lock()
                .expect("thread mutex poisoned")
                .push(conversation.clone());
            Ok(conversation)
        }

        fn fetch(&self, id: &ConversationId) -> Result<Option<Conversation>, RepositoryError> {
            Ok(self
                .conversations
                .lock()
                .expect("thread mutex poisoned")
                .iter()
                .find(|conversation| &conversation.id == id)
                .cloned())
        }

        fn list_for_participant(&self, user: &UserId) -> Result<Vec<Conversation>, RepositoryError> {
            Ok(self
                .conversations
                .lock()
                .expect("thread mutex poisoned")
                .iter()
                .filter(|conversation| conversation.is_participant(user))
                .cloned()
                .collect())
        }

        fn append_message(&self, message: Message) -> Result<Message, RepositoryError> {
            self.messages
                .lock()
                .expect("thread mutex poisoned")
                .push(message.clone());
            Ok(message)
        }

        fn messages(&self, id: &ConversationId) -> Result<Vec<Message>, RepositoryError> {
            Ok(self
                .messages
                .lock()
                .expect("thread mutex poisoned")
                .iter()
                .filter(|message| &message.conversation_id == id)
                .cloned()
                .collect())
        }
    }

    struct Fixtures {
        properties: HashMap<PropertyId, Property>,
        leads: HashMap<LeadId, Lead>,
    }

    impl PropertyRepository for Fixtures {
        fn insert(&self, property: Property) -> Result<Property, RepositoryError> {
            Ok(property)
        }

        fn update(&self, _property: Property) -> Result<(), RepositoryError> {
            Ok(())
        }

        fn fetch(&self, id: &PropertyId) -> Result<Option<Property>, RepositoryError> {
            Ok(self.properties.get(id).cloned())
        }

        fn list_for_manager(&self, manager: &UserId) -> Result<Vec<Property>, RepositoryError> {
            Ok(self
                .properties
                .values()
                .filter(|property| property.is_managed_by(manager))
                .cloned()
                .collect())
        }
    }

    impl LeadRepository for Fixtures {
        fn insert(&self, lead: Lead) -> Result<Lead, RepositoryError> {
            Ok(lead)
        }

        fn update(&self, _lead: Lead) -> Result<(), RepositoryError> {
            Ok(())
        }

        fn fetch(&self, id: &LeadId) -> Result<Option<Lead>, RepositoryError> {
            Ok(self.leads.get(id).cloned())
        }

        fn list_for_property(&self, property: &PropertyId) -> Result<Vec<Lead>, RepositoryError> {
            Ok(self
                .leads
                .values()
                .filter(|lead| &lead.property_id == property)
                .cloned()
                .collect())
        }

        fn find_by_email(
            &self,
            property: &PropertyId,
            email: &str,
        ) -> Result<Option<Lead>, RepositoryError> {
            Ok(self
                .leads
                .values()
                .find(|lead| &lead.property_id == property && lead.email == email)
                .cloned())
        }
    }

    fn property_id() -> PropertyId {
        PropertyId("prop-chat".to_string())
    }

    fn manager() -> UserId {
        UserId::new("manager-chat")
    }

    fn service() -> MessagingService<MemoryThreads> {
        let property = Property {
            id: property_id(),
            manager_id: manager(),
            details: PropertyDetails {
                title: "Studio".to_string(),
                address: "5 Mill Lane".to_string(),
                monthly_rent: 950,
                bedrooms: 0,
            },
            status: PropertyStatus::Vacant,
            created_at: fixed_now(),
            updated_at: fixed_now(),
        };
        let lead = Lead {
            id: LeadId("lead-chat".to_string()),
            property_id: property_id(),
            name: "Grace Hopper".to_string(),
            email: "grace@example.com".to_string(),
            phone: None,
            source: None,
            status: LeadStatus::Viewed,
            created_at: fixed_now(),
            updated_at: fixed_now(),
        };
        let fixtures = Arc::new(Fixtures {
            properties: HashMap::from([(property.id.clone(), property)]),
            leads: HashMap::from([(lead.id.clone(), lead)]),
        });

        MessagingService::new(
            Arc::new(MemoryThreads::default()),
            fixtures.clone(),
            fixtures,
        )
        .with_clock(fixed_now)
    }

    fn with_tenant(service: &MessagingService<MemoryThreads>) -> Conversation {
        service
            .start_conversation(
                &manager(),
                StartConversation {
                    property_id: property_id(),
                    counterpart: CounterpartRequest::Tenant {
                        user_id: UserId::new("tenant-chat"),
                    },
                },
            )
            .expect("conversation started")
    }

    #[test]
    fn starting_twice_reuses_the_thread() {
        let service = service();
        let first = with_tenant(&service);
        let second = with_tenant(&service);

        assert_eq!(first.id, second.id);
        assert_eq!(
            service
                .list_for_participant(&UserId::new("tenant-chat"))
                .expect("list")
                .len(),
            1
        );
    }

    #[test]
    fn messages_keep_creation_order_when_timestamps_tie() {
        let service = service();
        let conversation = with_tenant(&service);

        for (author, body) in [
            ("tenant-chat", "Is the studio still available?"),
            ("manager-chat", "It is, viewings on Friday."),
            ("tenant-chat", "Friday works."),
        ] {
            service
                .post_message(&UserId::new(author), &conversation.id, body)
                .expect("message posted");
        }

        let bodies: Vec<String> = service
            .messages(&manager(), &conversation.id)
            .expect("messages")
            .into_iter()
            .map(|message| message.body)
            .collect();
        assert_eq!(
            bodies,
            vec![
                "Is the studio still available?",
                "It is, viewings on Friday.",
                "Friday works."
            ]
        );
    }

    #[test]
    fn outsiders_cannot_read_or_post() {
        let service = service();
        let conversation = with_tenant(&service);
        let outsider = UserId::new("tenant-nosy");

        assert!(matches!(
            service.messages(&outsider, &conversation.id),
            Err(MessagingError::Forbidden)
        ));
        assert!(matches!(
            service.post_message(&outsider, &conversation.id, "hello"),
            Err(MessagingError::Forbidden)
        ));
        assert!(matches!(
            service.post_message(&manager(), &conversation.id, "   "),
            Err(MessagingError::EmptyBody)
        ));
    }

    #[test]
    fn lead_threads_admit_the_lead_by_email() {
        let service = service();
        let conversation = service
            .start_conversation(
                &manager(),
                StartConversation {
                    property_id: property_id(),
                    counterpart: CounterpartRequest::Lead {
                        lead_id: LeadId("lead-chat".to_string()),
                    },
                },
            )
            .expect("lead conversation");

        let reply = service
            .post_message(&UserId::new("Grace@Example.com"), &conversation.id, "Thanks!")
            .expect("lead replies");
        assert_eq!(reply.body, "Thanks!");

        assert!(matches!(
            service.start_conversation(
                &manager(),
                StartConversation {
                    property_id: property_id(),
                    counterpart: CounterpartRequest::Lead {
                        lead_id: LeadId("lead-missing".to_string()),
                    },
                },
            ),
            Err(MessagingError::InvalidCounterpart(_))
        ));
    }

    #[test]
    fn only_the_property_manager_starts_threads() {
        let service = service();
        let result = service.start_conversation(
            &UserId::new("manager-other"),
            StartConversation {
                property_id: property_id(),
                counterpart: CounterpartRequest::Tenant {
                    user_id: UserId::new("tenant-chat"),
                },
            },
        );
        assert!(matches!(result, Err(MessagingError::Forbidden)));
    }
}
