use crate::actor::UserId;
use crate::workflows::store::RepositoryError;

use super::domain::{Conversation, ConversationId, Message};

pub trait ConversationRepository: Send + Sync {
    fn insert(&self, conversation: Conversation) -> Result<Conversation, RepositoryError>;
    fn fetch(&self, id: &ConversationId) -> Result<Option<Conversation>, RepositoryError>;
    fn list_for_participant(&self, user: &UserId) -> Result<Vec<Conversation>, RepositoryError>;
    /// Appends to the thread; implementations keep insertion order.
    fn append_message(&self, message: Message) -> Result<Message, RepositoryError>;
    fn messages(&self, id: &ConversationId) -> Result<Vec<Message>, RepositoryError>;
}
