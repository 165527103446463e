use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::actor::UserId;
use crate::workflows::leads::LeadId;
use crate::workflows::properties::PropertyId;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub String);

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

/// The non-manager side of a thread.
///
/// Leads have no account; they act under their (normalized) e-mail as user id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Counterpart {
    Tenant { user_id: UserId },
    Lead { lead_id: LeadId, email: String },
}

impl Counterpart {
    fn acts_as(&self, user: &UserId) -> bool {
        match self {
            Counterpart::Tenant { user_id } => user_id == user,
            Counterpart::Lead { email, .. } => email.eq_ignore_ascii_case(user.0.trim()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    pub property_id: PropertyId,
    pub manager_id: UserId,
    pub counterpart: Counterpart,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    pub fn is_participant(&self, user: &UserId) -> bool {
        &self.manager_id == user || self.counterpart.acts_as(user)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub author_id: UserId,
    pub body: String,
    pub created_at: DateTime<Utc>,
}
