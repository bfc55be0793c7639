//! Company guesses from a reporter's email domain.
//!
//! This is the last-resort policy of the resolution chain. It lives behind a
//! trait so the domain table can be replaced without touching the merge logic.

use serde::{Deserialize, Serialize};

pub trait CompanyGuesser: Send + Sync {
    /// A well-known company id for institutional domains.
    fn guess_company_id(&self, email: &str) -> Option<String>;
    /// A display name for recognised domains.
    fn guess_company_name(&self, email: &str) -> Option<String>;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DomainRule {
    pub domain: String,
    pub company_name: String,
    pub company_id: Option<String>,
}

impl DomainRule {
    pub fn new(domain: &str, company_name: &str, company_id: Option<&str>) -> Self {
        Self {
            domain: domain.to_lowercase(),
            company_name: company_name.to_owned(),
            company_id: company_id.map(str::to_owned),
        }
    }

    fn matches(&self, email_domain: &str) -> bool {
        email_domain == self.domain
            || email_domain
                .strip_suffix(self.domain.as_str())
                .is_some_and(|prefix| prefix.ends_with('.'))
    }
}

/// Fixed table of recognised email domains, first match wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnownDomains {
    pub rules: Vec<DomainRule>,
}

impl Default for KnownDomains {
    fn default() -> Self {
        Self {
            rules: vec![
                DomainRule::new("laplateforme.io", "LaPlateforme", None),
                DomainRule::new("testing.com", "Testing Inc", None),
                DomainRule::new("example.com", "Exemple SARL", None),
                DomainRule::new("atelier.ovh", "Atelier", Some("nls628xs4p24rej")),
            ],
        }
    }
}

impl KnownDomains {
    fn rule_for(&self, email: &str) -> Option<&DomainRule> {
        let domain = email_domain(email)?;
        self.rules.iter().find(|rule| rule.matches(&domain))
    }
}

impl CompanyGuesser for KnownDomains {
    fn guess_company_id(&self, email: &str) -> Option<String> {
        self.rule_for(email).and_then(|rule| rule.company_id.clone())
    }

    fn guess_company_name(&self, email: &str) -> Option<String> {
        self.rule_for(email).map(|rule| rule.company_name.clone())
    }
}

/// Lowercased domain part of an email address.
pub fn email_domain(email: &str) -> Option<String> {
    let (_, domain) = email.trim().rsplit_once('@')?;
    let domain = domain.trim().to_lowercase();
    if domain.is_empty() {
        None
    } else {
        Some(domain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn institutional_domain_yields_id_and_name() {
        let guesser = KnownDomains::default();
        assert_eq!(
            guesser.guess_company_id("jane@atelier.ovh").as_deref(),
            Some("nls628xs4p24rej")
        );
        assert_eq!(guesser.guess_company_name("jane@atelier.ovh").as_deref(), Some("Atelier"));
    }

    #[test]
    fn name_only_domains_have_no_id() {
        let guesser = KnownDomains::default();
        assert_eq!(
            guesser.guess_company_name("bob@laplateforme.io").as_deref(),
            Some("LaPlateforme")
        );
        assert!(guesser.guess_company_id("bob@laplateforme.io").is_none());
    }

    #[test]
    fn matching_is_case_insensitive_and_accepts_subdomains() {
        let guesser = KnownDomains::default();
        assert_eq!(
            guesser.guess_company_name("Ops@Mail.Testing.COM").as_deref(),
            Some("Testing Inc")
        );
    }

    #[test]
    fn lookalike_domains_do_not_match() {
        let guesser = KnownDomains::default();
        assert!(guesser.guess_company_name("eve@notexample.com").is_none());
        assert!(guesser.guess_company_name("eve@example.com.evil.io").is_none());
    }

    #[test]
    fn unknown_or_malformed_emails_yield_nothing() {
        let guesser = KnownDomains::default();
        assert!(guesser.guess_company_name("someone@gmail.com").is_none());
        assert!(guesser.guess_company_name("not-an-email").is_none());
        assert!(guesser.guess_company_name("trailing@").is_none());
    }

    #[test]
    fn custom_table_replaces_policy() {
        let guesser = KnownDomains {
            rules: vec![DomainRule::new("acme.test", "Acme", Some("c-acme"))],
        };
        assert_eq!(guesser.guess_company_id("x@acme.test").as_deref(), Some("c-acme"));
        assert!(guesser.guess_company_name("x@atelier.ovh").is_none());
    }
}
