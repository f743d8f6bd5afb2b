use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::BellmanError;

/// Trial length granted on first-ever enrollment.
pub const TRIAL_DAYS: i64 = 7;

/// Payment/trial entitlement state for one recipient.
///
/// Created empty at account creation. The trial window is set exactly
/// once, on first enrollment; `paid` flips true on payment confirmation
/// and never reverts automatically. The dispatch engine only reads this
/// state; mutation belongs to the trial/payment lifecycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessState {
    pub paid: bool,
    #[serde(default)]
    pub trial_start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub trial_end: Option<DateTime<Utc>>,
}

impl AccessState {
    /// Paid, or inside an active trial window.
    pub fn has_active_access(&self, now: DateTime<Utc>) -> bool {
        self.paid || self.trial_end.is_some_and(|end| now < end)
    }

    /// Start the one-time trial window `[now, now + 7 days]`.
    pub fn start_trial(&mut self, now: DateTime<Utc>) -> Result<(), BellmanError> {
        if self.trial_start.is_some() {
            return Err(BellmanError::TrialAlreadyStarted);
        }
        self.trial_start = Some(now);
        self.trial_end = Some(now + Duration::days(TRIAL_DAYS));
        Ok(())
    }

    /// Mark the account paid. Irrevocable from the engine's point of view.
    pub fn mark_paid(&mut self) {
        self.paid = true;
    }
}

/// One enrolled recipient as seen by the dispatch engine.
///
/// `user_id` is `None` when the enrollment references a deleted
/// account; such recipients are filtered out before composition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientPrefs {
    #[serde(default)]
    pub user_id: Option<Uuid>,
    pub name: String,
    #[serde(default)]
    pub push_token: Option<String>,
    #[serde(default = "default_push_enabled")]
    pub push_enabled: bool,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub access: AccessState,
}

fn default_push_enabled() -> bool {
    true
}

impl RecipientPrefs {
    pub fn resolvable(&self) -> bool {
        self.user_id.is_some()
    }
}
