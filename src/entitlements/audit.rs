//! Feature audit log entries.
//!
//! Every plan-feature write appends one entry capturing the old and new
//! value plus actor identity. The log is the only durable record of who
//! changed what feature for which plan; it is append-only and never pruned
//! by this crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::features::FeatureValue;

/// Identity and request metadata of the actor making a change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorIdentity {
    pub actor_id: String,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub reason: Option<String>,
}

impl ActorIdentity {
    #[must_use]
    pub fn new(actor_id: impl Into<String>) -> Self {
        Self {
            actor_id: actor_id.into(),
            ip: None,
            user_agent: None,
            reason: None,
        }
    }

    #[must_use]
    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = Some(ip.into());
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// One appended audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureAuditEntry {
    pub id: String,
    /// What kind of entity was changed (currently always "plan").
    pub entity_type: String,
    /// The plan code.
    pub entity_id: String,
    pub feature_key: String,
    /// Effective value before the write; `None` when the feature was absent.
    pub old_value: Option<FeatureValue>,
    pub new_value: Option<FeatureValue>,
    pub changed_by: String,
    pub change_reason: Option<String>,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl FeatureAuditEntry {
    /// Build an entry for a plan-feature write.
    #[must_use]
    pub fn plan_feature_change(
        plan_code: &str,
        feature_key: &str,
        old_value: Option<FeatureValue>,
        new_value: Option<FeatureValue>,
        actor: &ActorIdentity,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            entity_type: "plan".to_string(),
            entity_id: plan_code.to_string(),
            feature_key: feature_key.to_string(),
            old_value,
            new_value,
            changed_by: actor.actor_id.clone(),
            change_reason: actor.reason.clone(),
            ip: actor.ip.clone(),
            user_agent: actor.user_agent.clone(),
            timestamp: Utc::now(),
        }
    }

    /// Emit the entry to the tracing log as well.
    pub fn log(&self) {
        tracing::info!(
            target: "pitchside::entitlements::audit",
            plan = %self.entity_id,
            feature = %self.feature_key,
            old = %self.old_value.as_ref().map(ToString::to_string).unwrap_or_else(|| "absent".into()),
            new = %self.new_value.as_ref().map(ToString::to_string).unwrap_or_else(|| "absent".into()),
            changed_by = %self.changed_by,
            "Plan feature changed"
        );
    }
}
