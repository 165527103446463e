use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::{json, Value};

use crate::actor::UserId;
use crate::workflows::applications::{
    application_router, Application, ApplicationEvent, ApplicationEventKind,
    ApplicationEventPublisher, ApplicationForm, ApplicationId, ApplicationRepository,
    ApplicationService, EventError, WizardConfig,
};
use crate::workflows::profiles::{
    ProfileFields, ProfileRepository, TenantProfile, TenantProfileId,
};
use crate::workflows::properties::{
    Property, PropertyDetails, PropertyId, PropertyRepository, PropertyStatus,
};
use crate::workflows::store::RepositoryError;

pub(super) const MANAGER: &str = "manager-1";
pub(super) const OTHER_MANAGER: &str = "manager-2";
pub(super) const TENANT: &str = "tenant-1";
pub(super) const PROPERTY: &str = "prop-test-1";

pub(super) fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn today() -> NaiveDate {
    fixed_now().date_naive()
}

pub(super) fn manager() -> UserId {
    UserId::new(MANAGER)
}

pub(super) fn tenant() -> UserId {
    UserId::new(TENANT)
}

pub(super) fn property_id() -> PropertyId {
    PropertyId(PROPERTY.to_string())
}

pub(super) fn identity_payload() -> Value {
    json!({
        "first_name": "Ada",
        "last_name": "Lovelace",
        "email": "Ada@Example.com",
        "phone": "+44 20 7946 0000",
        "nationality": "British",
        "date_of_birth": "1990-04-12",
        "id_document_type": "passport",
        "id_document_number": "P1234567",
    })
}

pub(super) fn household_payload() -> Value {
    json!({
        "desired_move_in": "2025-07-01",
        "lease_term_months": 12,
        "occupants": [{ "name": "Charles", "relationship": "partner", "age": 36 }],
        "has_pets": true,
        "pets": [{ "kind": "cat", "count": 1 }],
    })
}

pub(super) fn complete_payload() -> Value {
    let mut payload = identity_payload();
    let extra = [
        household_payload(),
        json!({
            "employment_status": "employed",
            "employer_name": "Analytical Engines Ltd",
            "job_title": "Engineer",
            "employment_start_date": "2021-03-01",
            "monthly_income": 520000,
            "income_currency": "GBP",
            "emergency_contact_name": "Mary Somerville",
            "emergency_contact_phone": "+44 20 7946 0001",
            "has_guarantor": false,
            "current_address": "12 St James's Square",
            "current_city": "London",
            "current_postal_code": "SW1Y 4JH",
            "current_country": "GB",
            "living_situation": "renting",
            "current_landlord_name": "Babbage Estates",
            "current_landlord_contact": "lettings@babbage.example",
            "references": [{ "name": "Michael Faraday", "phone": "+44 20 7946 0002" }],
            "documents": [
                { "category": "identification", "file_name": "passport.pdf" },
                { "category": "income_proof", "file_name": "payslip.png" }
            ],
            "accept_terms": true,
            "accept_privacy": true,
            "accept_background_check": true,
            "declare_accurate": true,
            "signature_name": "Ada Lovelace",
        }),
    ];
    if let Value::Object(target) = &mut payload {
        for section in extra {
            if let Value::Object(fields) = section {
                target.extend(fields);
            }
        }
    }
    payload
}

pub(super) fn form(payload: Value) -> ApplicationForm {
    serde_json::from_value(payload).expect("form payload deserializes")
}

pub(super) fn complete_form() -> ApplicationForm {
    form(complete_payload())
}

pub(super) fn with_step(mut payload: Value, step: u8) -> Value {
    payload["current_step"] = json!(step);
    payload
}

pub(super) type TestService = ApplicationService<MemoryApplications, MemoryEvents>;

pub(super) struct Harness {
    pub(super) service: Arc<TestService>,
    pub(super) applications: Arc<MemoryApplications>,
    pub(super) events: Arc<MemoryEvents>,
    pub(super) properties: Arc<MemoryProperties>,
    pub(super) profiles: Arc<MemoryProfiles>,
}

pub(super) fn harness() -> Harness {
    let applications = Arc::new(MemoryApplications::default());
    let events = Arc::new(MemoryEvents::default());
    let properties = Arc::new(MemoryProperties::default());
    let profiles = Arc::new(MemoryProfiles::default());
    properties.seed(PROPERTY, MANAGER, PropertyStatus::Vacant);

    let service = ApplicationService::new(
        applications.clone(),
        events.clone(),
        properties.clone(),
        profiles.clone(),
        WizardConfig::default(),
    )
    .with_clock(fixed_now);

    Harness {
        service: Arc::new(service),
        applications,
        events,
        properties,
        profiles,
    }
}

impl Harness {
    pub(super) fn router(&self) -> axum::Router {
        application_router(self.service.clone())
    }

    /// Submit a complete application for the default tenant and property.
    pub(super) fn submitted(&self) -> Application {
        self.service
            .submit(&tenant(), &property_id(), complete_form())
            .expect("complete form submits")
    }
}

#[derive(Default)]
pub(super) struct MemoryApplications {
    records: Mutex<HashMap<ApplicationId, Application>>,
}

impl MemoryApplications {
    pub(super) fn stored(&self, id: &ApplicationId) -> Application {
        self.records
            .lock()
            .expect("repository mutex poisoned")
            .get(id)
            .cloned()
            .expect("application stored")
    }

    pub(super) fn len(&self) -> usize {
        self.records.lock().expect("repository mutex poisoned").len()
    }
}

impl ApplicationRepository for MemoryApplications {
    fn insert(&self, application: Application) -> Result<Application, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let duplicate = guard.values().any(|existing| {
            existing.tenant_profile_id == application.tenant_profile_id
                && existing.property_id == application.property_id
        });
        if duplicate || guard.contains_key(&application.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(application.id.clone(), application.clone());
        Ok(application)
    }

    fn update(&self, application: Application) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if !guard.contains_key(&application.id) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(application.id.clone(), application);
        Ok(())
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn find_for(
        &self,
        profile: &TenantProfileId,
        property: &PropertyId,
    ) -> Result<Option<Application>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .find(|application| {
                &application.tenant_profile_id == profile && &application.property_id == property
            })
            .cloned())
    }

    fn list_for_property(&self, property: &PropertyId) -> Result<Vec<Application>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|application| &application.property_id == property)
            .cloned()
            .collect())
    }
}

pub(super) struct UnavailableApplications;

impl ApplicationRepository for UnavailableApplications {
    fn insert(&self, _application: Application) -> Result<Application, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _application: Application) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn find_for(
        &self,
        _profile: &TenantProfileId,
        _property: &PropertyId,
    ) -> Result<Option<Application>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list_for_property(
        &self,
        _property: &PropertyId,
    ) -> Result<Vec<Application>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

/// Shares another store's rows, optionally losing one lookup (as if a concurrent first
/// save landed in between) or refusing writes.
pub(super) struct SharedApplications {
    inner: Arc<MemoryApplications>,
    miss_next_lookup: AtomicBool,
    reject_updates: bool,
}

impl SharedApplications {
    pub(super) fn missing_first_lookup(inner: Arc<MemoryApplications>) -> Self {
        Self {
            inner,
            miss_next_lookup: AtomicBool::new(true),
            reject_updates: false,
        }
    }

    pub(super) fn read_only(inner: Arc<MemoryApplications>) -> Self {
        Self {
            inner,
            miss_next_lookup: AtomicBool::new(false),
            reject_updates: true,
        }
    }
}

impl ApplicationRepository for SharedApplications {
    fn insert(&self, application: Application) -> Result<Application, RepositoryError> {
        self.inner.insert(application)
    }

    fn update(&self, application: Application) -> Result<(), RepositoryError> {
        if self.reject_updates {
            return Err(RepositoryError::Unavailable("write timeout".to_string()));
        }
        self.inner.update(application)
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn find_for(
        &self,
        profile: &TenantProfileId,
        property: &PropertyId,
    ) -> Result<Option<Application>, RepositoryError> {
        if self.miss_next_lookup.swap(false, Ordering::SeqCst) {
            return Ok(None);
        }
        self.inner.find_for(profile, property)
    }

    fn list_for_property(&self, property: &PropertyId) -> Result<Vec<Application>, RepositoryError> {
        self.inner.list_for_property(property)
    }
}

/// Reads through to another store but refuses every property write.
pub(super) struct ReadOnlyProperties(pub(super) Arc<MemoryProperties>);

impl PropertyRepository for ReadOnlyProperties {
    fn insert(&self, _property: Property) -> Result<Property, RepositoryError> {
        Err(RepositoryError::Unavailable("write timeout".to_string()))
    }

    fn update(&self, _property: Property) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("write timeout".to_string()))
    }

    fn fetch(&self, id: &PropertyId) -> Result<Option<Property>, RepositoryError> {
        self.0.fetch(id)
    }

    fn list_for_manager(&self, manager: &UserId) -> Result<Vec<Property>, RepositoryError> {
        self.0.list_for_manager(manager)
    }
}

#[derive(Default)]
pub(super) struct MemoryEvents {
    events: Mutex<Vec<ApplicationEvent>>,
}

impl MemoryEvents {
    pub(super) fn kinds(&self) -> Vec<ApplicationEventKind> {
        self.events
            .lock()
            .expect("event mutex poisoned")
            .iter()
            .map(|event| event.kind)
            .collect()
    }

    pub(super) fn last(&self) -> Option<ApplicationEvent> {
        self.events
            .lock()
            .expect("event mutex poisoned")
            .last()
            .cloned()
    }
}

impl ApplicationEventPublisher for MemoryEvents {
    fn publish(&self, event: ApplicationEvent) -> Result<(), EventError> {
        self.events
            .lock()
            .expect("event mutex poisoned")
            .push(event);
        Ok(())
    }
}

#[derive(Default)]
pub(super) struct MemoryProperties {
    records: Mutex<HashMap<PropertyId, Property>>,
}

impl MemoryProperties {
    pub(super) fn seed(&self, id: &str, manager: &str, status: PropertyStatus) {
        let property = Property {
            id: PropertyId(id.to_string()),
            manager_id: UserId::new(manager),
            details: PropertyDetails {
                title: "Marylebone two-bed".to_string(),
                address: "221B Baker Street".to_string(),
                monthly_rent: 2_400,
                bedrooms: 2,
            },
            status,
            created_at: fixed_now(),
            updated_at: fixed_now(),
        };
        self.records
            .lock()
            .expect("repository mutex poisoned")
            .insert(property.id.clone(), property);
    }

    pub(super) fn status_of(&self, id: &str) -> PropertyStatus {
        self.records
            .lock()
            .expect("repository mutex poisoned")
            .get(&PropertyId(id.to_string()))
            .map(|property| property.status)
            .expect("property seeded")
    }
}

impl PropertyRepository for MemoryProperties {
    fn insert(&self, property: Property) -> Result<Property, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.insert(property.id.clone(), property.clone());
        Ok(property)
    }

    fn update(&self, property: Property) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.insert(property.id.clone(), property);
        Ok(())
    }

    fn fetch(&self, id: &PropertyId) -> Result<Option<Property>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list_for_manager(&self, manager: &UserId) -> Result<Vec<Property>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|property| property.is_managed_by(manager))
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub(super) struct MemoryProfiles {
    records: Mutex<HashMap<UserId, TenantProfile>>,
}

impl MemoryProfiles {
    pub(super) fn seed(&self, user: &str, fields: ProfileFields) {
        let profile = TenantProfile {
            id: TenantProfileId(format!("profile-{user}")),
            user_id: UserId::new(user),
            fields,
            created_at: fixed_now(),
            updated_at: fixed_now(),
        };
        self.records
            .lock()
            .expect("profile mutex poisoned")
            .insert(profile.user_id.clone(), profile);
    }
}

impl ProfileRepository for MemoryProfiles {
    fn upsert(&self, profile: TenantProfile) -> Result<(), RepositoryError> {
        self.records
            .lock()
            .expect("profile mutex poisoned")
            .insert(profile.user_id.clone(), profile);
        Ok(())
    }

    fn fetch_for_user(&self, user: &UserId) -> Result<Option<TenantProfile>, RepositoryError> {
        Ok(self
            .records
            .lock()
            .expect("profile mutex poisoned")
            .get(user)
            .cloned())
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
