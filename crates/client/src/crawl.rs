//! Bounded crawl of the paginated ticket listing.

use ticketdesk_common::models::{Priority, Ticket, TicketStatus};
use ticketdesk_config::AppConfig;

use crate::api::{PageRequest, TicketApi};
use crate::error::ApiClientError;

/// Server-side filters forwarded with every page request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketQuery {
    /// `None` crawls every queryable status in turn.
    pub status: Option<TicketStatus>,
    pub priority: Option<Priority>,
    pub company: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlLimits {
    pub page_limit: u32,
    pub max_pages: u32,
}

impl Default for CrawlLimits {
    fn default() -> Self {
        Self {
            page_limit: 20,
            max_pages: 10,
        }
    }
}

impl From<&AppConfig> for CrawlLimits {
    fn from(config: &AppConfig) -> Self {
        Self {
            page_limit: config.page_limit,
            max_pages: config.max_pages,
        }
    }
}

/// A page request that failed; the crawl moved on to the next status.
#[derive(Debug)]
pub struct CrawlFailure {
    pub status: TicketStatus,
    pub page: u32,
    pub error: ApiClientError,
}

#[derive(Debug, Default)]
pub struct CrawlOutcome {
    pub tickets: Vec<Ticket>,
    pub pages_fetched: u32,
    pub failures: Vec<CrawlFailure>,
}

impl CrawlOutcome {
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Fetch every ticket matching `query`, at most `max_pages` pages per status.
///
/// Pages are requested sequentially. A status stops at its first empty page,
/// malformed page, or failed request; tickets already collected are kept and
/// the remaining statuses are still crawled. Output is status order, then
/// page order, then server order within a page.
pub async fn fetch_all_tickets<A>(api: &A, query: &TicketQuery, limits: CrawlLimits) -> CrawlOutcome
where
    A: TicketApi + ?Sized,
{
    let statuses: Vec<TicketStatus> = match query.status {
        Some(status) => vec![status],
        None => TicketStatus::QUERYABLE.to_vec(),
    };

    let mut outcome = CrawlOutcome::default();

    for status in statuses {
        for page in 1..=limits.max_pages {
            let request = PageRequest {
                page,
                limit: limits.page_limit,
                status,
                priority: query.priority,
                company: query.company.clone(),
            };

            match api.fetch_ticket_page(&request).await {
                Ok(Some(batch)) if batch.is_empty() => break,
                Ok(Some(batch)) => {
                    outcome.pages_fetched += 1;
                    outcome.tickets.extend(batch);
                }
                Ok(None) => {
                    tracing::warn!(%status, page, "ticket page carried no ticket list");
                    break;
                }
                Err(error) => {
                    tracing::warn!(%status, page, error = %error, "ticket page failed, keeping partial results");
                    outcome.failures.push(CrawlFailure { status, page, error });
                    break;
                }
            }

            if page == limits.max_pages {
                tracing::debug!(%status, max_pages = limits.max_pages, "page cap reached");
            }
        }
    }

    tracing::info!(
        tickets = outcome.tickets.len(),
        pages = outcome.pages_fetched,
        failures = outcome.failures.len(),
        "ticket crawl complete"
    );
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use ticketdesk_common::models::{Profile, Project, User};

    fn ticket(id: &str) -> Ticket {
        serde_json::from_value(serde_json::json!({ "id": id })).unwrap()
    }

    #[derive(Clone)]
    enum PageReply {
        Tickets(Vec<&'static str>),
        Malformed,
        Fail,
    }

    /// Scripted gateway: replies keyed by (status, page); unscripted pages are empty.
    #[derive(Default)]
    struct ScriptedApi {
        replies: HashMap<(TicketStatus, u32), PageReply>,
        calls: Mutex<Vec<PageRequest>>,
    }

    impl ScriptedApi {
        fn reply(mut self, status: TicketStatus, page: u32, reply: PageReply) -> Self {
            self.replies.insert((status, page), reply);
            self
        }

        fn calls(&self) -> Vec<PageRequest> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TicketApi for ScriptedApi {
        async fn fetch_profile(&self) -> Result<Profile, ApiClientError> {
            Err(ApiClientError::MissingField("profile"))
        }

        async fn fetch_projects(&self) -> Result<Vec<Project>, ApiClientError> {
            Ok(Vec::new())
        }

        async fn fetch_projects_by_company(&self, _company_id: &str) -> Result<Vec<Project>, ApiClientError> {
            Ok(Vec::new())
        }

        async fn fetch_users(&self) -> Result<Vec<User>, ApiClientError> {
            Ok(Vec::new())
        }

        async fn fetch_ticket_page(&self, request: &PageRequest) -> Result<Option<Vec<Ticket>>, ApiClientError> {
            self.calls.lock().unwrap().push(request.clone());
            match self.replies.get(&(request.status, request.page)) {
                Some(PageReply::Tickets(ids)) => Ok(Some(ids.iter().map(|id| ticket(id)).collect())),
                Some(PageReply::Malformed) => Ok(None),
                Some(PageReply::Fail) => Err(ApiClientError::HttpError {
                    status: StatusCode::BAD_GATEWAY,
                    body: String::new(),
                }),
                None => Ok(Some(Vec::new())),
            }
        }
    }

    fn ids(outcome: &CrawlOutcome) -> Vec<&str> {
        outcome.tickets.iter().map(|t| t.id.as_str()).collect()
    }

    #[tokio::test]
    async fn crawls_both_statuses_in_order() {
        let api = ScriptedApi::default()
            .reply(TicketStatus::Opened, 1, PageReply::Tickets(vec!["o1", "o2"]))
            .reply(TicketStatus::Opened, 2, PageReply::Tickets(vec!["o3"]))
            .reply(TicketStatus::Closed, 1, PageReply::Tickets(vec!["c1"]));

        let outcome = fetch_all_tickets(&api, &TicketQuery::default(), CrawlLimits::default()).await;

        assert_eq!(ids(&outcome), vec!["o1", "o2", "o3", "c1"]);
        assert_eq!(outcome.pages_fetched, 3);
        assert!(!outcome.is_partial());
    }

    #[tokio::test]
    async fn empty_closed_page_keeps_opened_tickets() {
        let api = ScriptedApi::default()
            .reply(TicketStatus::Opened, 1, PageReply::Tickets(vec!["o1"]));

        let outcome = fetch_all_tickets(&api, &TicketQuery::default(), CrawlLimits::default()).await;

        assert_eq!(ids(&outcome), vec!["o1"]);
        // opened: pages 1, 2 (empty); closed: page 1 (empty)
        assert_eq!(api.calls().len(), 3);
    }

    #[tokio::test]
    async fn stops_at_page_cap() {
        let mut api = ScriptedApi::default();
        for page in 1..=5 {
            api = api.reply(TicketStatus::Opened, page, PageReply::Tickets(vec!["x"]));
        }
        let query = TicketQuery {
            status: Some(TicketStatus::Opened),
            ..TicketQuery::default()
        };
        let limits = CrawlLimits {
            page_limit: 1,
            max_pages: 3,
        };

        let outcome = fetch_all_tickets(&api, &query, limits).await;

        assert_eq!(outcome.tickets.len(), 3);
        assert_eq!(api.calls().len(), 3);
        assert!(api.calls().iter().all(|c| c.status == TicketStatus::Opened));
    }

    #[tokio::test]
    async fn failure_ends_status_but_keeps_partial_results() {
        let api = ScriptedApi::default()
            .reply(TicketStatus::Opened, 1, PageReply::Tickets(vec!["o1"]))
            .reply(TicketStatus::Opened, 2, PageReply::Fail)
            .reply(TicketStatus::Opened, 3, PageReply::Tickets(vec!["never"]))
            .reply(TicketStatus::Closed, 1, PageReply::Tickets(vec!["c1"]));

        let outcome = fetch_all_tickets(&api, &TicketQuery::default(), CrawlLimits::default()).await;

        assert_eq!(ids(&outcome), vec!["o1", "c1"]);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].status, TicketStatus::Opened);
        assert_eq!(outcome.failures[0].page, 2);
    }

    #[tokio::test]
    async fn malformed_page_ends_status() {
        let api = ScriptedApi::default()
            .reply(TicketStatus::Opened, 1, PageReply::Malformed)
            .reply(TicketStatus::Opened, 2, PageReply::Tickets(vec!["never"]))
            .reply(TicketStatus::Closed, 1, PageReply::Tickets(vec!["c1"]));

        let outcome = fetch_all_tickets(&api, &TicketQuery::default(), CrawlLimits::default()).await;

        assert_eq!(ids(&outcome), vec!["c1"]);
        assert!(!outcome.is_partial());
    }

    #[tokio::test]
    async fn forwards_priority_and_company() {
        let api = ScriptedApi::default();
        let query = TicketQuery {
            status: Some(TicketStatus::Closed),
            priority: Some(Priority::Urgent),
            company: Some("c1".into()),
        };

        fetch_all_tickets(&api, &query, CrawlLimits::default()).await;

        let calls = api.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].priority, Some(Priority::Urgent));
        assert_eq!(calls[0].company.as_deref(), Some("c1"));
        assert_eq!(calls[0].limit, 20);
    }

    #[tokio::test]
    async fn crawls_over_http() {
        use crate::client::{ClientConfig, TicketingClient};
        use wiremock::matchers::{method, path, query_param};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/tickets"))
            .and(query_param("status", "opened"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "tickets": [{"id": 1, "title": "printer"}]
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/tickets"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"tickets": []})))
            .mount(&server)
            .await;

        let client = TicketingClient::new(ClientConfig {
            base_url: server.uri(),
            files_url: format!("{}/files", server.uri()),
            max_retries: 0,
            timeout_secs: 5,
        })
        .unwrap()
        .with_token("tok");

        let outcome = fetch_all_tickets(&client, &TicketQuery::default(), CrawlLimits::default()).await;
        assert_eq!(ids(&outcome), vec!["1"]);
    }
}
