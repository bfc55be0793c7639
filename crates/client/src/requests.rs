use serde::Serialize;
use ticketdesk_common::models::TicketStatus;

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub identity: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GoogleLoginRequest {
    pub access_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub username: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusUpdate {
    pub status: TicketStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssignRequest {
    #[serde(rename = "userId")]
    pub user_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_omits_missing_company() {
        let req = RegisterRequest {
            email: "a@b.c".into(),
            name: "A".into(),
            username: "a".into(),
            password: "pw".into(),
            company_id: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("company_id").is_none());
    }

    #[test]
    fn assign_uses_camel_case_key() {
        let json = serde_json::to_value(AssignRequest { user_id: "u1".into() }).unwrap();
        assert_eq!(json, serde_json::json!({"userId": "u1"}));
    }

    #[test]
    fn status_update_is_lowercase() {
        let json = serde_json::to_value(StatusUpdate { status: TicketStatus::Closed }).unwrap();
        assert_eq!(json, serde_json::json!({"status": "closed"}));
    }
}
