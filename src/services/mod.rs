//! Business logic services

pub mod catalog;
pub mod integrity;
pub mod loans;
pub mod overdue;
pub mod reports;

use crate::{config::LoanPolicyConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub loans: loans::LoansService,
    pub reports: reports::ReportsService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, policy: LoanPolicyConfig) -> Self {
        Self {
            catalog: catalog::CatalogService::new(repository.clone()),
            loans: loans::LoansService::new(repository.clone(), policy.clone()),
            reports: reports::ReportsService::new(repository, policy),
        }
    }
}
