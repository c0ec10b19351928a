//! Tenant policy configuration and evaluation outcome types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Who a tenant's users are expected to be.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudienceMode {
    /// Every user is an adult; age thresholds are ignored.
    AdultOnly,
    /// Adults and minors side by side (the common club setup).
    Mixed,
    /// Players are minors; adults appear only as guardians.
    YouthOnly,
}

impl AudienceMode {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AdultOnly => "adult_only",
            Self::Mixed => "mixed",
            Self::YouthOnly => "youth_only",
        }
    }
}

/// Error returned when parsing an audience mode string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseAudienceModeError {
    invalid_value: String,
}

impl fmt::Display for ParseAudienceModeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid audience mode: '{}' (expected: adult_only, mixed, or youth_only)",
            self.invalid_value
        )
    }
}

impl std::error::Error for ParseAudienceModeError {}

impl FromStr for AudienceMode {
    type Err = ParseAudienceModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "adult_only" => Ok(Self::AdultOnly),
            "mixed" => Ok(Self::Mixed),
            "youth_only" => Ok(Self::YouthOnly),
            _ => Err(ParseAudienceModeError {
                invalid_value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for AudienceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Age and consent policy for one tenant.
///
/// Created at tenant provisioning and mutated only by tenant admins. A tenant
/// without a policy row gets [`TenantPolicy::restrictive_default`] rather than
/// an error.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantPolicy {
    pub audience_mode: AudienceMode,
    /// Below this age a parent must act as booking agent.
    pub parent_required_below: u8,
    /// From this age a minor may manage their own bookings.
    pub teen_self_access_at: u8,
    /// Age at which a subject is treated as an adult.
    pub adult_age: u8,
    /// Whether self-managing teens may also pay.
    pub allow_teen_payments: bool,
}

impl TenantPolicy {
    /// The hard-coded fallback applied when a tenant has no policy row.
    ///
    /// Most restrictive: youth-only, every minor parent-required, no teen
    /// payments.
    #[must_use]
    pub fn restrictive_default() -> Self {
        Self {
            audience_mode: AudienceMode::YouthOnly,
            parent_required_below: 18,
            teen_self_access_at: 18,
            adult_age: 18,
            allow_teen_payments: false,
        }
    }

    /// Check the threshold ordering invariant:
    /// `parent_required_below <= teen_self_access_at <= adult_age`.
    ///
    /// Enforced when a policy is written, not by the evaluator — the three
    /// age comparisons are independent, so a violating policy degrades
    /// rather than crashes.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.parent_required_below > self.teen_self_access_at {
            return Err(crate::error::PitchsideError::bad_request(format!(
                "parent_required_below ({}) must not exceed teen_self_access_at ({})",
                self.parent_required_below, self.teen_self_access_at
            )));
        }
        if self.teen_self_access_at > self.adult_age {
            return Err(crate::error::PitchsideError::bad_request(format!(
                "teen_self_access_at ({}) must not exceed adult_age ({})",
                self.teen_self_access_at, self.adult_age
            )));
        }
        Ok(())
    }
}

impl Default for TenantPolicy {
    fn default() -> Self {
        Self {
            audience_mode: AudienceMode::Mixed,
            parent_required_below: 13,
            teen_self_access_at: 13,
            adult_age: 18,
            allow_teen_payments: false,
        }
    }
}

/// Who must complete a payment for the subject.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayerParty {
    Parent,
    Player,
}

impl PayerParty {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Parent => "parent",
            Self::Player => "player",
        }
    }
}

impl fmt::Display for PayerParty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-capability permissions computed for a subject.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowedActions {
    pub book: bool,
    pub pay: bool,
    pub view_schedules: bool,
    pub manage_profile: bool,
    pub invite_others: bool,
    pub manage_dependents: bool,
}

/// Result of evaluating a tenant policy against a subject's date of birth.
///
/// Ephemeral: recomputed on every request and never cached beyond a single
/// request lifecycle, because the subject's age changes daily.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyOutcome {
    /// A parent must act as booking agent.
    pub parent_required: bool,
    /// Whether guardian-facing UI sections apply.
    pub show_parent_sections: bool,
    /// The subject is a self-managing teen.
    pub teen_self: bool,
    pub who_can_pay: PayerParty,
    pub guardian_consent_needed: bool,
    pub allowed: AllowedActions,
}
