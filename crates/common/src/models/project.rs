use serde::{Deserialize, Serialize};

use super::de;

/// A project record. `company` holds the owning company id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    #[serde(deserialize_with = "de::string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "company_id", deserialize_with = "de::non_empty_string")]
    pub company: Option<String>,
    #[serde(default, deserialize_with = "de::non_empty_string")]
    pub company_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_with_company_name() {
        let json = r#"{"id": "p1", "name": "Intranet", "company": "c1", "company_name": "Atelier"}"#;
        let project: Project = serde_json::from_str(json).unwrap();
        assert_eq!(project.company.as_deref(), Some("c1"));
        assert_eq!(project.company_name.as_deref(), Some("Atelier"));
    }

    #[test]
    fn company_id_alias_and_blank_name() {
        let json = r#"{"id": "p2", "company_id": "c9", "company_name": ""}"#;
        let project: Project = serde_json::from_str(json).unwrap();
        assert_eq!(project.company.as_deref(), Some("c9"));
        assert!(project.company_name.is_none());
        assert!(project.name.is_empty());
    }
}
