//! Projects a viewer may file tickets against.

use ticketdesk_common::error::{TicketdeskError, TicketdeskResult};
use ticketdesk_common::models::{Profile, Project};

use crate::api::TicketApi;
use crate::error::ApiClientError;

/// Company id shared by guest accounts.
pub const GUEST_COMPANY_ID: &str = "a2v5y745epnpeda";
/// Project every staff guest files into.
pub const STAFF_GUEST_PROJECT_ID: &str = "cgmtck3kg64pu2v";
const STAFF_GUEST_PROJECT_NAME: &str = "dffd";
const STAFF_EMAIL_SUFFIX: &str = "@atelier.ovh";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectChoice {
    pub id: String,
    pub name: String,
    /// Imposed by account type rather than picked from the company's projects.
    pub forced: bool,
}

impl From<Project> for ProjectChoice {
    fn from(project: Project) -> Self {
        let name = if project.name.trim().is_empty() {
            project.id.clone()
        } else {
            project.name
        };
        Self {
            id: project.id,
            name,
            forced: false,
        }
    }
}

pub fn is_guest(profile: &Profile) -> bool {
    profile.company_id() == Some(GUEST_COMPANY_ID)
}

/// Guests with a staff email always file into the staff guest project.
pub fn forced_project(profile: &Profile) -> Option<ProjectChoice> {
    let staff = profile
        .email
        .as_deref()
        .is_some_and(|email| email.trim().to_ascii_lowercase().ends_with(STAFF_EMAIL_SUFFIX));
    (is_guest(profile) && staff).then(|| ProjectChoice {
        id: STAFF_GUEST_PROJECT_ID.to_owned(),
        name: STAFF_GUEST_PROJECT_NAME.to_owned(),
        forced: true,
    })
}

/// Choices in server order; the first one is the default.
///
/// Admins choose among every project, other members among their company's.
/// Guests without a forced project get no choices.
pub async fn project_choices<A>(api: &A, profile: &Profile) -> Result<Vec<ProjectChoice>, ApiClientError>
where
    A: TicketApi + ?Sized,
{
    if let Some(forced) = forced_project(profile) {
        return Ok(vec![forced]);
    }
    if is_guest(profile) {
        return Ok(Vec::new());
    }

    let projects = match (profile.admin, profile.company_id()) {
        (true, _) => api.fetch_projects().await?,
        (false, Some(company_id)) => api.fetch_projects_by_company(company_id).await?,
        (false, None) => Vec::new(),
    };
    Ok(projects.into_iter().map(ProjectChoice::from).collect())
}

/// Pick the project for a new ticket.
///
/// With no request the first choice is used. A requested id or name must be
/// one of the choices; a forced project overrides any request.
pub fn select_project(choices: &[ProjectChoice], requested: Option<&str>) -> TicketdeskResult<String> {
    if let Some(forced) = choices.iter().find(|c| c.forced) {
        return Ok(forced.id.clone());
    }

    match requested.map(str::trim).filter(|r| !r.is_empty()) {
        Some(wanted) => choices
            .iter()
            .find(|c| c.id == wanted || c.name.eq_ignore_ascii_case(wanted))
            .map(|c| c.id.clone())
            .ok_or_else(|| {
                TicketdeskError::Validation(format!("project '{wanted}' is not available to you"))
            }),
        None => choices
            .first()
            .map(|c| c.id.clone())
            .ok_or_else(|| TicketdeskError::Validation("no project is available to file a ticket in".into())),
    }
}
