use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use ticketdesk_common::models::{Project, Ticket};

use crate::config::EnrichmentConfig;
use crate::directory::CompanyDirectory;
use crate::guess::CompanyGuesser;

/// A ticket with its resolved company. Recomputed on every load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedTicket {
    #[serde(flatten)]
    pub ticket: Ticket,
    #[serde(rename = "companyId")]
    pub company_id: Option<String>,
    pub company_name: String,
}

struct ProjectIndex<'a> {
    company_by_project: HashMap<&'a str, &'a str>,
    name_by_project: HashMap<&'a str, &'a str>,
}

impl<'a> ProjectIndex<'a> {
    fn build(projects: &'a [Project]) -> Self {
        let mut company_by_project = HashMap::new();
        let mut name_by_project = HashMap::new();
        for project in projects {
            if let Some(company) = project.company.as_deref() {
                company_by_project.insert(project.id.as_str(), company);
            }
            if let Some(name) = project.company_name.as_deref() {
                name_by_project.insert(project.id.as_str(), name);
            }
        }
        Self {
            company_by_project,
            name_by_project,
        }
    }
}

/// Attach `company_id` / `company_name` to each ticket.
///
/// Output has the input's length and order. Inputs are never mutated.
/// Resolution order for the name: the project's own company name, the
/// directory entry for the resolved id, the email-domain guess, then the
/// configured unknown label.
pub fn enrich(
    tickets: &[Ticket],
    projects: &[Project],
    directory: &CompanyDirectory,
    guesser: &dyn CompanyGuesser,
    config: &EnrichmentConfig,
) -> Vec<EnrichedTicket> {
    let index = ProjectIndex::build(projects);
    let mut unresolved = 0usize;

    let enriched: Vec<EnrichedTicket> = tickets
        .iter()
        .map(|ticket| {
            let project = ticket.project.as_deref();
            let email = ticket.email.as_deref();

            let company_id = project
                .and_then(|p| index.company_by_project.get(p))
                .map(|id| (*id).to_owned())
                .or_else(|| email.and_then(|e| guesser.guess_company_id(e)));

            let company_name = project
                .and_then(|p| index.name_by_project.get(p))
                .map(|name| (*name).to_owned())
                .or_else(|| {
                    company_id
                        .as_deref()
                        .and_then(|id| directory.get(id))
                        .map(str::to_owned)
                })
                .or_else(|| email.and_then(|e| guesser.guess_company_name(e)))
                .unwrap_or_else(|| {
                    unresolved += 1;
                    config.unknown_label().to_owned()
                });

            EnrichedTicket {
                ticket: ticket.clone(),
                company_id,
                company_name,
            }
        })
        .collect();

    tracing::debug!(
        tickets = enriched.len(),
        projects = projects.len(),
        unresolved,
        "tickets enriched"
    );
    enriched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guess::KnownDomains;
    use proptest::prelude::*;
    use serde_json::json;

    fn ticket(id: &str, project: Option<&str>, email: Option<&str>) -> Ticket {
        serde_json::from_value(json!({
            "id": id,
            "project": project,
            "email": email,
            "created": "2024-01-01",
        }))
        .unwrap()
    }

    fn project(id: &str, company: Option<&str>, company_name: Option<&str>) -> Project {
        Project {
            id: id.to_string(),
            name: String::new(),
            company: company.map(str::to_string),
            company_name: company_name.map(str::to_string),
        }
    }

    fn run(tickets: &[Ticket], projects: &[Project], directory: &CompanyDirectory) -> Vec<EnrichedTicket> {
        enrich(
            tickets,
            projects,
            directory,
            &KnownDomains::default(),
            &EnrichmentConfig::default(),
        )
    }

    #[test]
    fn resolves_through_project_and_directory() {
        let tickets = vec![ticket("1", Some("P1"), None), ticket("2", Some("P1"), None)];
        let projects = vec![project("P1", Some("C1"), None)];
        let mut directory = CompanyDirectory::new();
        directory.insert("C1", "Atelier");

        let out = run(&tickets, &projects, &directory);
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|t| t.company_name == "Atelier"));
        assert!(out.iter().all(|t| t.company_id.as_deref() == Some("C1")));
        assert_eq!(out[0].ticket.id, "1");
    }

    #[test]
    fn project_company_name_wins_over_directory() {
        let tickets = vec![ticket("1", Some("P1"), None)];
        let projects = vec![project("P1", Some("C1"), Some("From Project"))];
        let mut directory = CompanyDirectory::new();
        directory.insert("C1", "From Directory");

        let out = run(&tickets, &projects, &directory);
        assert_eq!(out[0].company_name, "From Project");
    }

    #[test]
    fn institutional_email_supplies_fallback_id() {
        let tickets = vec![ticket("1", Some("orphan"), Some("jo@atelier.ovh"))];
        let directory = CompanyDirectory::with_known(&EnrichmentConfig::default());

        let out = run(&tickets, &[], &directory);
        assert_eq!(out[0].company_id.as_deref(), Some("nls628xs4p24rej"));
        assert_eq!(out[0].company_name, "Atelier");
    }

    #[test]
    fn email_name_guess_used_when_directory_misses() {
        let tickets = vec![ticket("1", Some("P1"), Some("al@laplateforme.io"))];
        let projects = vec![project("P1", Some("C-unnamed"), None)];

        let out = run(&tickets, &projects, &CompanyDirectory::new());
        assert_eq!(out[0].company_id.as_deref(), Some("C-unnamed"));
        assert_eq!(out[0].company_name, "LaPlateforme");
    }

    #[test]
    fn falls_back_to_unknown_label() {
        let tickets = vec![ticket("1", None, Some("x@gmail.com")), ticket("2", None, None)];

        let out = run(&tickets, &[], &CompanyDirectory::new());
        assert!(out.iter().all(|t| t.company_name == "Unknown company"));
        assert!(out.iter().all(|t| t.company_id.is_none()));
    }

    #[test]
    fn malformed_files_do_not_abort_enrichment() {
        let bad: Ticket =
            serde_json::from_value(json!({"id": "9", "files": "{bad json"})).unwrap();
        let out = run(&[bad], &[], &CompanyDirectory::new());
        assert_eq!(out.len(), 1);
        assert!(out[0].ticket.attachments().is_empty());
    }

    #[test]
    fn duplicates_are_tolerated() {
        let t = ticket("1", Some("P1"), None);
        let out = run(&[t.clone(), t], &[project("P1", Some("C1"), None)], &CompanyDirectory::new());
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn serializes_derived_fields_next_to_ticket_fields() {
        let out = run(&[ticket("1", None, None)], &[], &CompanyDirectory::new());
        let value = serde_json::to_value(&out[0]).unwrap();
        assert_eq!(value["id"], "1");
        assert_eq!(value["company_name"], "Unknown company");
        assert!(value.get("companyId").is_some());
    }

    fn arb_ticket() -> impl Strategy<Value = Ticket> {
        (
            "[a-z0-9]{1,8}",
            proptest::option::of(prop_oneof![Just("P1"), Just("P2"), Just("P9")]),
            proptest::option::of(prop_oneof![
                Just("a@atelier.ovh"),
                Just("b@gmail.com"),
                Just("c@testing.com"),
                Just("broken")
            ]),
        )
            .prop_map(|(id, project, email)| ticket(&id, project, email))
    }

    proptest! {
        #[test]
        fn preserves_length_order_and_never_leaves_name_empty(
            tickets in proptest::collection::vec(arb_ticket(), 0..40)
        ) {
            let projects = vec![
                project("P1", Some("C1"), None),
                project("P2", Some("C2"), Some("Second")),
            ];
            let mut directory = CompanyDirectory::new();
            directory.insert("C1", "First");

            let out = run(&tickets, &projects, &directory);
            prop_assert_eq!(out.len(), tickets.len());
            for (before, after) in tickets.iter().zip(&out) {
                prop_assert_eq!(&before.id, &after.ticket.id);
                prop_assert!(!after.company_name.is_empty());
            }
        }
    }
}
