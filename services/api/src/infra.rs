use metrics_exporter_prometheus::PrometheusHandle;
use rentflow::actor::UserId;
use rentflow::workflows::applications::{
    Application, ApplicationId, ApplicationRepository, ApplicationService, WizardConfig,
};
use rentflow::workflows::leads::{
    Lead, LeadApplicationSync, LeadId, LeadRepository, LeadService,
};
use rentflow::workflows::messaging::{
    Conversation, ConversationId, ConversationRepository, Message, MessagingService,
};
use rentflow::workflows::profiles::{
    ProfileRepository, ProfileService, TenantProfile, TenantProfileId,
};
use rentflow::workflows::properties::{
    Property, PropertyId, PropertyRepository, PropertyService,
};
use rentflow::workflows::RepositoryError;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

fn locked<'a, T>(mutex: &'a Mutex<T>) -> Result<MutexGuard<'a, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable("in-memory store poisoned".to_string()))
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryPropertyRepository {
    records: Arc<Mutex<HashMap<PropertyId, Property>>>,
}

impl PropertyRepository for InMemoryPropertyRepository {
    fn insert(&self, property: Property) -> Result<Property, RepositoryError> {
        let mut guard = locked(&self.records)?;
        if guard.contains_key(&property.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(property.id.clone(), property.clone());
        Ok(property)
    }

    fn update(&self, property: Property) -> Result<(), RepositoryError> {
        let mut guard = locked(&self.records)?;
        match guard.get_mut(&property.id) {
            Some(slot) => {
                *slot = property;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, id: &PropertyId) -> Result<Option<Property>, RepositoryError> {
        Ok(locked(&self.records)?.get(id).cloned())
    }

    fn list_for_manager(&self, manager: &UserId) -> Result<Vec<Property>, RepositoryError> {
        Ok(locked(&self.records)?
            .values()
            .filter(|property| property.is_managed_by(manager))
            .cloned()
            .collect())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryProfileRepository {
    records: Arc<Mutex<HashMap<UserId, TenantProfile>>>,
}

impl ProfileRepository for InMemoryProfileRepository {
    fn upsert(&self, profile: TenantProfile) -> Result<(), RepositoryError> {
        locked(&self.records)?.insert(profile.user_id.clone(), profile);
        Ok(())
    }

    fn fetch_for_user(&self, user: &UserId) -> Result<Option<TenantProfile>, RepositoryError> {
        Ok(locked(&self.records)?.get(user).cloned())
    }
}

/// Applications keyed by id, with the (profile, property) pair kept unique.
#[derive(Default, Clone)]
pub(crate) struct InMemoryApplicationRepository {
    records: Arc<Mutex<HashMap<ApplicationId, Application>>>,
}

impl ApplicationRepository for InMemoryApplicationRepository {
    fn insert(&self, application: Application) -> Result<Application, RepositoryError> {
        let mut guard = locked(&self.records)?;
        let taken = guard.contains_key(&application.id)
            || guard.values().any(|existing| {
                existing.tenant_profile_id == application.tenant_profile_id
                    && existing.property_id == application.property_id
            });
        if taken {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(application.id.clone(), application.clone());
        Ok(application)
    }

    fn update(&self, application: Application) -> Result<(), RepositoryError> {
        let mut guard = locked(&self.records)?;
        match guard.get_mut(&application.id) {
            Some(slot) => {
                *slot = application;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        Ok(locked(&self.records)?.get(id).cloned())
    }

    fn find_for(
        &self,
        profile: &TenantProfileId,
        property: &PropertyId,
    ) -> Result<Option<Application>, RepositoryError> {
        Ok(locked(&self.records)?
            .values()
            .find(|application| {
                &application.tenant_profile_id == profile && &application.property_id == property
            })
            .cloned())
    }

    fn list_for_property(&self, property: &PropertyId) -> Result<Vec<Application>, RepositoryError> {
        Ok(locked(&self.records)?
            .values()
            .filter(|application| &application.property_id == property)
            .cloned()
            .collect())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryLeadRepository {
    records: Arc<Mutex<HashMap<LeadId, Lead>>>,
}

impl LeadRepository for InMemoryLeadRepository {
    fn insert(&self, lead: Lead) -> Result<Lead, RepositoryError> {
        let mut guard = locked(&self.records)?;
        let taken = guard.contains_key(&lead.id)
            || guard.values().any(|existing| {
                existing.property_id == lead.property_id && existing.email == lead.email
            });
        if taken {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(lead.id.clone(), lead.clone());
        Ok(lead)
    }

    fn update(&self, lead: Lead) -> Result<(), RepositoryError> {
        let mut guard = locked(&self.records)?;
        match guard.get_mut(&lead.id) {
            Some(slot) => {
                *slot = lead;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, id: &LeadId) -> Result<Option<Lead>, RepositoryError> {
        Ok(locked(&self.records)?.get(id).cloned())
    }

    fn list_for_property(&self, property: &PropertyId) -> Result<Vec<Lead>, RepositoryError> {
        Ok(locked(&self.records)?
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
        Ok(locked(&self.records)?
            .values()
            .find(|lead| &lead.property_id == property && lead.email == email)
            .cloned())
    }
}

/// Conversations plus an append-only message log, so insertion order is preserved.
#[derive(Default, Clone)]
pub(crate) struct InMemoryConversationRepository {
    conversations: Arc<Mutex<HashMap<ConversationId, Conversation>>>,
    messages: Arc<Mutex<Vec<Message>>>,
}

impl ConversationRepository for InMemoryConversationRepository {
    fn insert(&self, conversation: Conversation) -> Result<Conversation, RepositoryError> {
        let mut guard = locked(&self.conversations)?;
        if guard.contains_key(&conversation.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(conversation.id.clone(), conversation.clone());
        Ok(conversation)
    }

    fn fetch(&self, id: &ConversationId) -> Result<Option<Conversation>, RepositoryError> {
        Ok(locked(&self.conversations)?.get(id).cloned())
    }

    fn list_for_participant(&self, user: &UserId) -> Result<Vec<Conversation>, RepositoryError> {
        Ok(locked(&self.conversations)?
            .values()
            .filter(|conversation| conversation.is_participant(user))
            .cloned()
            .collect())
    }

    fn append_message(&self, message: Message) -> Result<Message, RepositoryError> {
        if !locked(&self.conversations)?.contains_key(&message.conversation_id) {
            return Err(RepositoryError::NotFound);
        }
        locked(&self.messages)?.push(message.clone());
        Ok(message)
    }

    fn messages(&self, id: &ConversationId) -> Result<Vec<Message>, RepositoryError> {
        Ok(locked(&self.messages)?
            .iter()
            .filter(|message| &message.conversation_id == id)
            .cloned()
            .collect())
    }
}

pub(crate) type Applications =
    ApplicationService<InMemoryApplicationRepository, LeadApplicationSync<InMemoryLeadRepository>>;

/// Every workflow service wired against the in-memory stores.
#[derive(Clone)]
pub(crate) struct Services {
    pub(crate) properties: Arc<PropertyService<InMemoryPropertyRepository>>,
    pub(crate) profiles: Arc<ProfileService<InMemoryProfileRepository>>,
    pub(crate) applications: Arc<Applications>,
    pub(crate) leads: Arc<LeadService<InMemoryLeadRepository>>,
    pub(crate) messaging: Arc<MessagingService<InMemoryConversationRepository>>,
}

impl Services {
    pub(crate) fn in_memory(wizard: WizardConfig) -> Self {
        let properties = Arc::new(InMemoryPropertyRepository::default());
        let profiles = Arc::new(InMemoryProfileRepository::default());
        let leads = Arc::new(InMemoryLeadRepository::default());

        let lead_service = Arc::new(LeadService::new(leads.clone(), properties.clone()));
        let applications = ApplicationService::new(
            Arc::new(InMemoryApplicationRepository::default()),
            Arc::new(LeadApplicationSync::new(lead_service.clone())),
            properties.clone(),
            profiles.clone(),
            wizard,
        );
        let messaging = MessagingService::new(
            Arc::new(InMemoryConversationRepository::default()),
            properties.clone(),
            leads,
        );

        Self {
            properties: Arc::new(PropertyService::new(properties)),
            profiles: Arc::new(ProfileService::new(profiles)),
            applications: Arc::new(applications),
            leads: lead_service,
            messaging: Arc::new(messaging),
        }
    }
}
