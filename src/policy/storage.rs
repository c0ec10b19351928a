//! Storage traits for tenant policies and subjects.
//!
//! Persistence is delegated to the backing database; these traits are the
//! seam. In-memory implementations are provided for tests and development.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use super::types::TenantPolicy;

/// Read access to per-tenant policy rows.
#[async_trait]
pub trait PolicyStore: Send + Sync {
    /// Get the policy for a tenant. `None` means the tenant has no policy
    /// row; callers apply [`TenantPolicy::restrictive_default`].
    async fn get_policy(&self, tenant_id: &str) -> Result<Option<TenantPolicy>>;

    /// Create or replace the policy for a tenant.
    async fn put_policy(&self, tenant_id: &str, policy: &TenantPolicy) -> Result<()>;
}

/// A player or signup candidate with a known date of birth.
///
/// `portal_access` and `payment_enabled` are the persisted grants the
/// birthday sweep maintains; age itself is never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: String,
    pub tenant_id: String,
    pub date_of_birth: NaiveDate,
    pub portal_access: bool,
    pub payment_enabled: bool,
}

impl Subject {
    #[must_use]
    pub fn new(id: impl Into<String>, tenant_id: impl Into<String>, dob: NaiveDate) -> Self {
        Self {
            id: id.into(),
            tenant_id: tenant_id.into(),
            date_of_birth: dob,
            portal_access: false,
            payment_enabled: false,
        }
    }
}

/// Subject rows the birthday sweep iterates.
#[async_trait]
pub trait SubjectStore: Send + Sync {
    /// All subjects with a known date of birth.
    async fn list_subjects(&self) -> Result<Vec<Subject>>;

    async fn get_subject(&self, subject_id: &str) -> Result<Option<Subject>>;

    /// Grant portal access. Monotonic: never revoked by the sweep.
    async fn grant_portal_access(&self, subject_id: &str) -> Result<()>;

    /// Grant payment capability. Monotonic: never revoked by the sweep.
    async fn grant_payment(&self, subject_id: &str) -> Result<()>;
}

/// In-memory policy store for testing.
#[derive(Default, Clone)]
pub struct InMemoryPolicyStore {
    inner: std::sync::Arc<std::sync::RwLock<std::collections::HashMap<String, TenantPolicy>>>,
}

impl InMemoryPolicyStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PolicyStore for InMemoryPolicyStore {
    async fn get_policy(&self, tenant_id: &str) -> Result<Option<TenantPolicy>> {
        Ok(self.inner.read().unwrap().get(tenant_id).cloned())
    }

    async fn put_policy(&self, tenant_id: &str, policy: &TenantPolicy) -> Result<()> {
        self.inner
            .write()
            .unwrap()
            .insert(tenant_id.to_string(), policy.clone());
        Ok(())
    }
}

/// In-memory subject store for testing.
#[derive(Default, Clone)]
pub struct InMemorySubjectStore {
    inner: std::sync::Arc<std::sync::RwLock<std::collections::HashMap<String, Subject>>>,
}

impl InMemorySubjectStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a subject for testing.
    pub fn seed(&self, subject: Subject) {
        self.inner
            .write()
            .unwrap()
            .insert(subject.id.clone(), subject);
    }
}

#[async_trait]
impl SubjectStore for InMemorySubjectStore {
    async fn list_subjects(&self) -> Result<Vec<Subject>> {
        let mut subjects: Vec<Subject> = self.inner.read().unwrap().values().cloned().collect();
        subjects.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(subjects)
    }

    async fn get_subject(&self, subject_id: &str) -> Result<Option<Subject>> {
        Ok(self.inner.read().unwrap().get(subject_id).cloned())
    }

    async fn grant_portal_access(&self, subject_id: &str) -> Result<()> {
        if let Some(subject) = self.inner.write().unwrap().get_mut(subject_id) {
            subject.portal_access = true;
        }
        Ok(())
    }

    async fn grant_payment(&self, subject_id: &str) -> Result<()> {
        if let Some(subject) = self.inner.write().unwrap().get_mut(subject_id) {
            subject.payment_enabled = true;
        }
        Ok(())
    }
}
