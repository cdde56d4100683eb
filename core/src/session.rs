//! Explicit session context handed to the planner at construction.
//!
//! Who is looking (representative, company, admin) and on whose behalf.
//! Core logic reads identity from here and nowhere else.

use crate::types::{GigId, RepId, Role};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedSession {
    pub role: Role,
    /// The signed-in representative (rep lens) or the one being inspected.
    pub rep_id: Option<RepId>,
    pub company_id: Option<String>,
    /// Gigs owned by the company; drives the company-lens fetch.
    #[serde(default)]
    pub company_gigs: Vec<GigId>,
}

impl SchedSession {
    pub fn rep(rep_id: &str) -> Self {
        Self {
            role: Role::Rep,
            rep_id: Some(rep_id.to_string()),
            company_id: None,
            company_gigs: Vec::new(),
        }
    }

    pub fn company(company_id: &str, gigs: Vec<GigId>) -> Self {
        Self {
            role: Role::Company,
            rep_id: None,
            company_id: Some(company_id.to_string()),
            company_gigs: gigs,
        }
    }

    pub fn admin() -> Self {
        Self { role: Role::Admin, rep_id: None, company_id: None, company_gigs: Vec::new() }
    }
}
