use serde::{Deserialize, Serialize};

use super::de;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyRef {
    #[serde(deserialize_with = "de::string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// The signed-in user's profile as returned by `GET /profile`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(deserialize_with = "de::string_or_number")]
    pub id: String,
    #[serde(default)]
    pub admin: bool,
    #[serde(default)]
    pub company: Option<CompanyRef>,
    #[serde(default, deserialize_with = "de::non_empty_string")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "de::non_empty_string")]
    pub name: Option<String>,
}

impl Profile {
    pub fn company_id(&self) -> Option<&str> {
        self.company.as_ref().map(|c| c.id.as_str())
    }
}

/// A user record from the admin-only `/users` endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(deserialize_with = "de::string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "de::non_empty_string")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "de::non_empty_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "de::non_empty_string")]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "de::non_empty_string")]
    pub company: Option<String>,
    #[serde(default)]
    pub admin: bool,
}
