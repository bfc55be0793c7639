use serde::{Deserialize, Serialize};

pub const UNKNOWN_COMPANY: &str = "Unknown company";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KnownCompany {
    pub id: String,
    pub name: String,
}

impl KnownCompany {
    fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_owned(),
            name: name.to_owned(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    /// Companies the directory always knows about.
    pub known_companies: Vec<KnownCompany>,
    /// Label used when every lookup fails. Must not be empty.
    pub unknown_label: String,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            known_companies: vec![
                KnownCompany::new("ejc7xzf2q3m64u3", "LaPlateforme"),
                KnownCompany::new("a2v5y745epnpeda", "Invité"),
                KnownCompany::new("nls628xs4p24rej", "Atelier"),
            ],
            unknown_label: UNKNOWN_COMPANY.to_owned(),
        }
    }
}

impl EnrichmentConfig {
    pub fn unknown_label(&self) -> &str {
        let label = self.unknown_label.trim();
        if label.is_empty() {
            UNKNOWN_COMPANY
        } else {
            label
        }
    }
}
