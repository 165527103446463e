//! Message threads between a property manager and a tenant or lead.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{Conversation, ConversationId, Counterpart, Message, MessageId};
pub use repository::ConversationRepository;
pub use router::messaging_router;
pub use service::{CounterpartRequest, MessagingError, MessagingService, StartConversation};
