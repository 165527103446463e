use crate::infra::Services;
use clap::Args;
use rentflow::actor::UserId;
use rentflow::error::AppError;
use rentflow::workflows::applications::{
    ApplicationForm, ApplicationStatus, DraftSubmission, StatusChangeRequest, WizardConfig,
    WizardStep,
};
use rentflow::workflows::leads::LeadInvite;
use rentflow::workflows::messaging::{CounterpartRequest, StartConversation};
use rentflow::workflows::properties::PropertyDetails;
use serde_json::{json, Value};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// End the review with a rejection instead of a signed lease.
    #[arg(long)]
    pub(crate) reject: bool,
    /// Override the minimum applicant age used by the identity step.
    #[arg(long)]
    pub(crate) min_age: Option<u32>,
}

const DEMO_MANAGER: &str = "manager-demo";
const DEMO_TENANT: &str = "ada@example.com";

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let mut wizard = WizardConfig::default();
    if let Some(age) = args.min_age {
        wizard.minimum_applicant_age = age;
    }
    let services = Services::in_memory(wizard);
    let manager = UserId::new(DEMO_MANAGER);
    let tenant = UserId::new(DEMO_TENANT);

    println!("Rental application demo");
    let property = services.properties.create(
        &manager,
        PropertyDetails {
            title: "Canal-side two-bed".to_string(),
            address: "4 Wharf Road, London".to_string(),
            monthly_rent: 1_850,
            bedrooms: 2,
        },
    )?;
    println!(
        "- Listed {} ({}) at {}/month -> {}",
        property.id, property.details.title, property.details.monthly_rent, property.status
    );

    let lead = services.leads.invite(
        &manager,
        &property.id,
        LeadInvite {
            name: "Ada Lovelace".to_string(),
            email: DEMO_TENANT.to_string(),
            phone: None,
            source: Some("open house".to_string()),
        },
    )?;
    println!("- Invited lead {} <{}> -> {}", lead.id, lead.email, lead.status);

    println!("\nWizard drafts");
    let mut identity = demo_form_section(&["identity"]);
    identity["nationality"] = json!("");
    let mut saves = vec![(1, identity)];
    saves.push((2, demo_form_section(&["identity", "household"])));
    saves.push((6, demo_form_section(&["financial", "support", "history", "documents"])));

    for (requested, payload) in saves {
        let outcome = services.applications.save_draft(
            &tenant,
            &property.id,
            DraftSubmission {
                current_step: requested,
                form: to_form(payload),
            },
        )?;
        let reached = WizardStep::from_number(outcome.application.current_step)
            .map(WizardStep::label)
            .unwrap_or("not started");
        println!(
            "- Requested step {} -> stored step {} ({})",
            requested, outcome.application.current_step, reached
        );
        for error in &outcome.errors {
            println!("    step {} {}: {}", error.step, error.field, error.message);
        }
    }

    let application = services.applications.submit(
        &tenant,
        &property.id,
        to_form(demo_form_section(&["consent"])),
    )?;
    println!(
        "- Submitted {} -> {} (snapshot frozen: {})",
        application.id,
        application.status,
        application.snapshot.is_some()
    );
    let lead = services.leads.get(&manager, &lead.id)?;
    println!("- Lead {} now {}", lead.id, lead.status);

    println!("\nManager review");
    let attempt = services.applications.transition_status(
        &manager,
        &application.id,
        StatusChangeRequest::to(ApplicationStatus::Approved),
    );
    if let Err(err) = attempt {
        println!("- Skipping ahead refused: {}", err);
    }

    let mut path = vec![
        ApplicationStatus::UnderReview,
        ApplicationStatus::VisitScheduled,
        ApplicationStatus::VisitCompleted,
    ];
    if args.reject {
        path.push(ApplicationStatus::Rejected);
    } else {
        path.extend([ApplicationStatus::Approved, ApplicationStatus::Leased]);
    }
    for status in path {
        let updated = services.applications.transition_status(
            &manager,
            &application.id,
            StatusChangeRequest::to(status),
        )?;
        println!("- {} -> {}", updated.id, updated.status);
    }

    let property = services.properties.get(&manager, &property.id)?;
    println!("- Property {} is now {}", property.id, property.status);

    let conversation = services.messaging.start_conversation(
        &manager,
        StartConversation {
            property_id: property.id.clone(),
            counterpart: CounterpartRequest::Tenant {
                user_id: tenant.clone(),
            },
        },
    )?;
    let closing = if args.reject {
        "Thank you for applying; we have chosen another applicant."
    } else {
        "Welcome home! Keys are ready for collection."
    };
    services
        .messaging
        .post_message(&manager, &conversation.id, closing)?;
    services
        .messaging
        .post_message(&tenant, &conversation.id, "Thanks for letting me know.")?;

    println!("\nConversation {}", conversation.id);
    for message in services.messaging.messages(&tenant, &conversation.id)? {
        println!("  [{}] {}", message.author_id, message.body);
    }

    Ok(())
}

fn to_form(payload: Value) -> ApplicationForm {
    serde_json::from_value(payload).unwrap_or_default()
}

fn demo_form_section(sections: &[&str]) -> Value {
    let mut payload = serde_json::Map::new();
    for section in sections {
        let fields = match *section {
            "identity" => json!({
                "first_name": "Ada",
                "last_name": "Lovelace",
                "email": DEMO_TENANT,
                "phone": "+44 20 7946 0000",
                "nationality": "British",
                "date_of_birth": "1990-04-12",
                "id_document_type": "passport",
                "id_document_number": "P1234567",
            }),
            "household" => json!({
                "desired_move_in": "2030-07-01",
                "lease_term_months": 12,
                "occupants": [{ "name": "Charles", "relationship": "partner", "age": 36 }],
                "has_pets": false,
            }),
            "financial" => json!({
                "employment_status": "employed",
                "employer_name": "Analytical Engines Ltd",
                "job_title": "Engineer",
                "employment_start_date": "2021-03-01",
                "monthly_income": 520000,
                "income_currency": "GBP",
            }),
            "support" => json!({
                "emergency_contact_name": "Mary Somerville",
                "emergency_contact_phone": "+44 20 7946 0001",
                "has_guarantor": false,
            }),
            "history" => json!({
                "current_address": "12 St James's Square",
                "current_city": "London",
                "current_postal_code": "SW1Y 4JH",
                "current_country": "GB",
                "living_situation": "owner",
            }),
            "documents" => json!({
                "documents": [
                    { "category": "identification", "file_name": "passport.pdf" },
                    { "category": "income_proof", "file_name": "payslip.pdf" }
                ]
            }),
            "consent" => json!({
                "accept_terms": true,
                "accept_privacy": true,
                "accept_background_check": true,
                "declare_accurate": true,
                "signature_name": "Ada Lovelace",
            }),
            _ => Value::Null,
        };
        if let Value::Object(fields) = fields {
            payload.extend(fields);
        }
    }
    Value::Object(payload)
}
