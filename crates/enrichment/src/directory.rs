use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ticketdesk_common::models::{CompanyRef, Project, User};

use crate::config::EnrichmentConfig;
use crate::guess::CompanyGuesser;

/// A company filter choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyOption {
    pub id: String,
    pub name: String,
}

/// Company id to display name, assembled per session from partial sources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyDirectory {
    names: BTreeMap<String, String>,
}

impl CompanyDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory seeded with the configured known companies.
    pub fn with_known(config: &EnrichmentConfig) -> Self {
        let mut directory = Self::new();
        for company in &config.known_companies {
            directory.insert(&company.id, &company.name);
        }
        directory
    }

    pub fn get(&self, company_id: &str) -> Option<&str> {
        self.names.get(company_id).map(String::as_str)
    }

    pub fn contains(&self, company_id: &str) -> bool {
        self.names.contains_key(company_id)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Set a name, replacing any previous one. Blank ids or names are ignored.
    pub fn insert(&mut self, company_id: &str, name: &str) {
        let (id, name) = (company_id.trim(), name.trim());
        if id.is_empty() || name.is_empty() {
            return;
        }
        self.names.insert(id.to_owned(), name.to_owned());
    }

    /// Set a name only if the id has none yet.
    pub fn insert_missing(&mut self, company_id: &str, name: &str) {
        if !self.contains(company_id.trim()) {
            self.insert(company_id, name);
        }
    }

    /// Names carried on project records. Existing names win.
    pub fn observe_projects(&mut self, projects: &[Project]) {
        for project in projects {
            if let (Some(id), Some(name)) = (&project.company, &project.company_name) {
                self.insert_missing(id, name);
            }
        }
    }

    /// Names inferred from user records for companies not yet named.
    ///
    /// The email heuristic is tried first, then a label derived from the id.
    pub fn observe_users(&mut self, users: &[User], guesser: &dyn CompanyGuesser) {
        for user in users {
            let Some(company_id) = user.company.as_deref() else {
                continue;
            };
            if self.contains(company_id) {
                continue;
            }
            let name = user
                .email
                .as_deref()
                .and_then(|email| guesser.guess_company_name(email))
                .unwrap_or_else(|| placeholder_name(company_id));
            tracing::debug!(company_id, name = %name, "company named from user records");
            self.insert(company_id, &name);
        }
    }

    /// The signed-in user's own company. Overrides any earlier name.
    pub fn observe_profile_company(&mut self, company: &CompanyRef) {
        self.insert(&company.id, &company.name);
    }

    /// Filter options ordered by display name, then id.
    pub fn options(&self) -> Vec<CompanyOption> {
        let mut options: Vec<CompanyOption> = self
            .names
            .iter()
            .map(|(id, name)| CompanyOption {
                id: id.clone(),
                name: name.clone(),
            })
            .collect();
        options.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        options
    }
}

fn placeholder_name(company_id: &str) -> String {
    let prefix: String = company_id.chars().take(6).collect();
    format!("Company {prefix}")
}
