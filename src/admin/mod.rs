pub mod records;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::adaptor::{
    AdminEndpoint, FailurePolicy, FilterSource, GridSource, InitBarrier, PagedAdaptor, Projection,
};
use crate::api::RemoteFetch;
use records::{LookupRecord, RoleRecord, SkillRecord, StateRecord, StatusCodeRecord, UserRecord};

/// Admin screens backed by a paged grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AdminGrid {
    Users,
    Roles,
    States,
    Skills,
    TaxTerms,
    Workflow,
    LeadSources,
    LeadStatuses,
    LeadIndustries,
    Education,
    Eligibility,
    Experience,
    DocumentTypes,
    JobOptions,
    StatusCodes,
}

impl AdminGrid {
    pub const ALL: [AdminGrid; 15] = [
        AdminGrid::Users,
        AdminGrid::Roles,
        AdminGrid::States,
        AdminGrid::Skills,
        AdminGrid::TaxTerms,
        AdminGrid::Workflow,
        AdminGrid::LeadSources,
        AdminGrid::LeadStatuses,
        AdminGrid::LeadIndustries,
        AdminGrid::Education,
        AdminGrid::Eligibility,
        AdminGrid::Experience,
        AdminGrid::DocumentTypes,
        AdminGrid::JobOptions,
        AdminGrid::StatusCodes,
    ];

    /// URL / CLI name
    pub fn slug(self) -> &'static str {
        match self {
            AdminGrid::Users => "users",
            AdminGrid::Roles => "roles",
            AdminGrid::States => "states",
            AdminGrid::Skills => "skills",
            AdminGrid::TaxTerms => "tax-terms",
            AdminGrid::Workflow => "workflow",
            AdminGrid::LeadSources => "lead-sources",
            AdminGrid::LeadStatuses => "lead-statuses",
            AdminGrid::LeadIndustries => "lead-industries",
            AdminGrid::Education => "education",
            AdminGrid::Eligibility => "eligibility",
            AdminGrid::Experience => "experience",
            AdminGrid::DocumentTypes => "document-types",
            AdminGrid::JobOptions => "job-options",
            AdminGrid::StatusCodes => "status-codes",
        }
    }

    /// (plural, singular) entity names as the backend spells them
    fn entity(self) -> (&'static str, &'static str) {
        match self {
            AdminGrid::Users => ("Users", "User"),
            AdminGrid::Roles => ("Roles", "Role"),
            AdminGrid::States => ("States", "State"),
            AdminGrid::Skills => ("Skills", "Skill"),
            AdminGrid::TaxTerms => ("TaxTerms", "TaxTerm"),
            AdminGrid::Workflow => ("Workflow", "Workflow"),
            AdminGrid::LeadSources => ("LeadSources", "LeadSource"),
            AdminGrid::LeadStatuses => ("LeadStatuses", "LeadStatus"),
            AdminGrid::LeadIndustries => ("LeadIndustries", "LeadIndustry"),
            AdminGrid::Education => ("Education", "Education"),
            AdminGrid::Eligibility => ("Eligibility", "Eligibility"),
            AdminGrid::Experience => ("Experience", "Experience"),
            AdminGrid::DocumentTypes => ("DocumentTypes", "DocumentType"),
            AdminGrid::JobOptions => ("JobOptions", "JobOption"),
            AdminGrid::StatusCodes => ("StatusCodes", "StatusCode"),
        }
    }

    pub fn title(self) -> &'static str {
        self.entity().0
    }

    /// Local-storage key holding this page's persisted filter seed
    pub fn storage_key(self) -> String {
        format!("auto{}", self.entity().1)
    }

    /// `Admin/Get{Plural}`, answering `{ "{Plural}": ..., "Count": n }`
    pub fn list_endpoint(self) -> AdminEndpoint {
        let (plural, _) = self.entity();
        AdminEndpoint::get(format!("Admin/Get{}", plural)).result_field(plural)
    }

    /// `Admin/Search{Singular}`, answering a bare array of display strings
    pub fn search_endpoint(self) -> AdminEndpoint {
        let (_, singular) = self.entity();
        AdminEndpoint::get(format!("Admin/Search{}", singular)).projection(Projection::bare())
    }

    /// Build the grid's read adaptor with the record type for this screen
    pub fn grid_source(
        self,
        client: Arc<dyn RemoteFetch>,
        barrier: Arc<InitBarrier>,
        filter: FilterSource,
        policy: FailurePolicy,
    ) -> Box<dyn GridSource> {
        let endpoint = self.list_endpoint();
        match self {
            AdminGrid::Users => Box::new(
                PagedAdaptor::<UserRecord>::new(endpoint, client, barrier, filter).with_policy(policy),
            ),
            AdminGrid::Roles => Box::new(
                PagedAdaptor::<RoleRecord>::new(endpoint, client, barrier, filter).with_policy(policy),
            ),
            AdminGrid::States => Box::new(
                PagedAdaptor::<StateRecord>::new(endpoint, client, barrier, filter).with_policy(policy),
            ),
            AdminGrid::Skills => Box::new(
                PagedAdaptor::<SkillRecord>::new(endpoint, client, barrier, filter).with_policy(policy),
            ),
            AdminGrid::StatusCodes => Box::new(
                PagedAdaptor::<StatusCodeRecord>::new(endpoint, client, barrier, filter).with_policy(policy),
            ),
            _ => Box::new(
                PagedAdaptor::<LookupRecord>::new(endpoint, client, barrier, filter).with_policy(policy),
            ),
        }
    }

    /// Build the autocomplete adaptor for the page's search box
    pub fn search_source(
        self,
        client: Arc<dyn RemoteFetch>,
        barrier: Arc<InitBarrier>,
        policy: FailurePolicy,
    ) -> Box<dyn GridSource> {
        Box::new(
            PagedAdaptor::<String>::new(self.search_endpoint(), client, barrier, FilterSource::FirstPredicate)
                .with_policy(policy),
        )
    }
}

impl fmt::Display for AdminGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for AdminGrid {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        AdminGrid::ALL
            .iter()
            .copied()
            .find(|grid| grid.slug() == wanted || grid.title().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| format!("unknown admin grid: {}", s))
    }
}
