//! Ticket-list screen state: load, enrich, and derive the visible page.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use ticketdesk_common::error::{TicketdeskError, TicketdeskResult};
use ticketdesk_common::models::{Profile, Project, User};
use ticketdesk_enrichment::{
    enrich, view, CompanyDirectory, CompanyGuesser, CompanyOption, EnrichedTicket,
    EnrichmentConfig, FilterState, KnownDomains, TicketPage,
};
use tokio::sync::{watch, RwLock};

use crate::api::TicketApi;
use crate::crawl::{fetch_all_tickets, CrawlFailure, CrawlLimits, TicketQuery};
use crate::error::ApiClientError;

#[derive(Debug, Clone, Default)]
pub struct LoaderSettings {
    pub limits: CrawlLimits,
    pub enrichment: EnrichmentConfig,
}

/// Everything one load produced. Replaced wholesale on each applied load.
#[derive(Debug)]
pub struct TicketSnapshot {
    pub generation: u64,
    pub profile: Profile,
    pub projects: Vec<Project>,
    pub directory: CompanyDirectory,
    /// Company filter choices offered to this viewer.
    pub companies: Vec<CompanyOption>,
    pub tickets: Vec<EnrichedTicket>,
    pub failures: Vec<CrawlFailure>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied { generation: u64, tickets: usize },
    /// A newer load finished first; this result was dropped.
    Stale { generation: u64 },
}

#[derive(Default)]
struct ListState {
    filter: FilterState,
    snapshot: Option<Arc<TicketSnapshot>>,
}

pub struct TicketListLoader<A: ?Sized> {
    api: Arc<A>,
    guesser: Arc<dyn CompanyGuesser>,
    settings: LoaderSettings,
    generation: AtomicU64,
    shutdown_tx: watch::Sender<bool>,
    state: RwLock<ListState>,
}

impl<A: TicketApi + ?Sized> TicketListLoader<A> {
    pub fn new(api: Arc<A>, settings: LoaderSettings) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            api,
            guesser: Arc::new(KnownDomains::default()),
            settings,
            generation: AtomicU64::new(0),
            shutdown_tx,
            state: RwLock::new(ListState::default()),
        }
    }

    pub fn with_guesser(mut self, guesser: Arc<dyn CompanyGuesser>) -> Self {
        self.guesser = guesser;
        self
    }

    /// Cancel in-flight loads; later loads fail with `Cancelled`.
    pub fn close(&self) {
        self.shutdown_tx.send_replace(true);
        tracing::debug!("ticket list loader closed");
    }

    pub fn is_closed(&self) -> bool {
        *self.shutdown_tx.borrow()
    }

    /// Run a full load and apply it unless a newer one already landed.
    pub async fn refresh(&self) -> TicketdeskResult<LoadOutcome> {
        if self.is_closed() {
            return Err(TicketdeskError::Cancelled);
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let query = {
            let state = self.state.read().await;
            TicketQuery {
                status: state.filter.status(),
                priority: state.filter.priority(),
                company: None,
            }
        };

        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let snapshot = tokio::select! {
            _ = shutdown_rx.wait_for(|closed| *closed) => {
                tracing::debug!(generation, "load cancelled");
                return Err(TicketdeskError::Cancelled);
            }
            result = self.load(generation, query) => result?,
        };

        if self.is_closed() {
            return Err(TicketdeskError::Cancelled);
        }
        Ok(self.apply(snapshot).await)
    }

    async fn load(&self, generation: u64, query: TicketQuery) -> TicketdeskResult<TicketSnapshot> {
        let profile = self.api.fetch_profile().await?;
        let admin = profile.admin;
        let own_company = profile.company_id().map(str::to_owned);

        let projects_fut = async {
            match (admin, own_company.as_deref()) {
                (true, _) => self.api.fetch_projects().await,
                (false, Some(company_id)) => self.api.fetch_projects_by_company(company_id).await,
                (false, None) => Ok(Vec::new()),
            }
        };
        let users_fut = async {
            if admin {
                self.api.fetch_users().await
            } else {
                Ok(Vec::new())
            }
        };
        let (projects, users) = tokio::join!(projects_fut, users_fut);
        let projects: Vec<Project> = or_empty(projects, "projects");
        let users: Vec<User> = or_empty(users, "users");

        let mut directory = CompanyDirectory::with_known(&self.settings.enrichment);
        directory.observe_projects(&projects);
        let companies = if admin {
            directory.observe_users(&users, self.guesser.as_ref());
            directory.options()
        } else if let Some(company) = &profile.company {
            directory.observe_profile_company(company);
            vec![CompanyOption {
                id: company.id.clone(),
                name: directory.get(&company.id).unwrap_or(company.name.as_str()).to_owned(),
            }]
        } else {
            Vec::new()
        };

        let crawl = fetch_all_tickets(self.api.as_ref(), &query, self.settings.limits).await;
        let tickets = enrich(
            &crawl.tickets,
            &projects,
            &directory,
            self.guesser.as_ref(),
            &self.settings.enrichment,
        );

        tracing::info!(
            generation,
            admin,
            tickets = tickets.len(),
            companies = companies.len(),
            partial = crawl.is_partial(),
            "ticket list loaded"
        );

        Ok(TicketSnapshot {
            generation,
            profile,
            projects,
            directory,
            companies,
            tickets,
            failures: crawl.failures,
        })
    }

    async fn apply(&self, snapshot: TicketSnapshot) -> LoadOutcome {
        let generation = snapshot.generation;
        let mut state = self.state.write().await;

        if let Some(current) = &state.snapshot {
            if current.generation >= generation {
                tracing::debug!(generation, current = current.generation, "discarding stale load");
                return LoadOutcome::Stale { generation };
            }
        }

        if state.filter.viewer_id() != Some(snapshot.profile.id.as_str()) {
            state.filter.set_viewer(Some(snapshot.profile.id.clone()));
        }
        let tickets = snapshot.tickets.len();
        state.snapshot = Some(Arc::new(snapshot));
        LoadOutcome::Applied { generation, tickets }
    }

    pub async fn filter(&self) -> FilterState {
        self.state.read().await.filter.clone()
    }

    /// Mutate the filter. Returns whatever the closure returns, typically
    /// the "needs re-fetch" flag from `set_status` / `set_priority`.
    pub async fn update_filter<R>(&self, f: impl FnOnce(&mut FilterState) -> R) -> R {
        let mut state = self.state.write().await;
        f(&mut state.filter)
    }

    pub async fn snapshot(&self) -> Option<Arc<TicketSnapshot>> {
        self.state.read().await.snapshot.clone()
    }

    /// The visible page for the current filter, or `None` before the first load.
    pub async fn current_page(&self) -> Option<TicketPage> {
        let state = self.state.read().await;
        state
            .snapshot
            .as_ref()
            .map(|snapshot| view(&snapshot.tickets, &state.filter))
    }
}

fn or_empty<T>(result: Result<Vec<T>, ApiClientError>, what: &'static str) -> Vec<T> {
    result.unwrap_or_else(|e| {
        tracing::warn!(source = what, error = %e, "lookup failed, continuing without it");
        Vec::new()
    })
}
