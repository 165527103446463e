use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::properties::PropertyId;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LeadId(pub String);

impl fmt::Display for LeadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Funnel position of a prospective applicant. Independent of application status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    Invited,
    Viewed,
    Drafting,
    Applied,
    Archived,
}

impl LeadStatus {
    pub const fn label(self) -> &'static str {
        match self {
            LeadStatus::Invited => "invited",
            LeadStatus::Viewed => "viewed",
            LeadStatus::Drafting => "drafting",
            LeadStatus::Applied => "applied",
            LeadStatus::Archived => "archived",
        }
    }

    const fn rank(self) -> u8 {
        match self {
            LeadStatus::Invited => 0,
            LeadStatus::Viewed => 1,
            LeadStatus::Drafting => 2,
            LeadStatus::Applied => 3,
            LeadStatus::Archived => 4,
        }
    }

    /// Forward-only: any later funnel stage, or archived from anywhere still open.
    pub const fn can_advance_to(self, next: LeadStatus) -> bool {
        match (self, next) {
            (LeadStatus::Archived, _) => false,
            (_, LeadStatus::Archived) => true,
            _ => next.rank() > self.rank(),
        }
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub id: LeadId,
    pub property_id: PropertyId,
    pub name: String,
    /// Stored trimmed and lowercased; unique per property.
    pub email: String,
    pub phone: Option<String>,
    pub source: Option<String>,
    pub status: LeadStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Manager-supplied contact details for a new lead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadInvite {
    #[serde(default)]
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

pub(crate) fn normalize_email(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}
