//! Ownership tagging and filtering
//!
//! The backend is shared by every anonymous client and cannot be trusted to
//! keep their records apart. Every record leaving this crate goes through
//! [`filter`], and every record sent to the backend goes through [`tag`].
//!
//! Filtering rules, applied identically to every record kind:
//! - no `userId` (or an empty one): legacy record, adopted by the current identity
//! - `userId` of another identity: dropped
//! - `userId` of the current identity: kept unchanged

use crate::error::{ZeroPassError, ZeroPassResult};
use crate::identity::Identity;
use crate::types::{
    EvaluationLog, RuleSet, RuleTemplate, Scenario, ScenarioTestResult, SimulationRequest,
    SimulationResult,
};
use tracing::{debug, warn};

/// A record carrying an optional `userId` ownership tag
pub trait OwnedRecord {
    /// Current tag, if any
    fn owner(&self) -> Option<&str>;

    /// Overwrite the tag
    fn set_owner(&mut self, user_id: String);
}

macro_rules! impl_owned_record {
    ($($ty:ty),* $(,)?) => {
        $(
            impl OwnedRecord for $ty {
                fn owner(&self) -> Option<&str> {
                    self.user_id.as_deref()
                }

                fn set_owner(&mut self, user_id: String) {
                    self.user_id = Some(user_id);
                }
            }
        )*
    };
}

impl_owned_record!(
    RuleSet,
    SimulationRequest,
    SimulationResult,
    EvaluationLog,
    RuleTemplate,
    Scenario,
    ScenarioTestResult,
);

/// Copy of `record` tagged to `identity`, overwriting any previous tag.
pub fn tag<T: OwnedRecord + Clone>(record: &T, identity: &Identity) -> T {
    let mut tagged = record.clone();
    tagged.set_owner(identity.id.clone());
    tagged
}

/// Keep only records `identity` may see, adopting untagged ones.
///
/// Relative order of kept records is preserved.
pub fn filter<T: OwnedRecord>(records: Vec<T>, identity: &Identity) -> Vec<T> {
    let total = records.len();
    let mut adopted = 0usize;

    let kept: Vec<T> = records
        .into_iter()
        .filter_map(|mut record| match record.owner() {
            None | Some("") => {
                record.set_owner(identity.id.clone());
                adopted += 1;
                Some(record)
            }
            Some(owner) if owner == identity.id => Some(record),
            Some(_) => None,
        })
        .collect();

    let dropped = total - kept.len();
    if dropped > 0 {
        warn!(
            user_id = %identity.id,
            dropped,
            "Dropped records owned by another identity"
        );
    }
    if adopted > 0 {
        debug!(user_id = %identity.id, adopted, "Adopted untagged legacy records");
    }

    kept
}

/// Local pre-write check: fail when `record` is tagged to someone else.
pub fn ensure_owned<T: OwnedRecord>(record: &T, identity: &Identity) -> ZeroPassResult<()> {
    match record.owner() {
        Some(owner) if !owner.is_empty() && owner != identity.id => {
            Err(ZeroPassError::ownership_with_owner(
                "Record belongs to a different identity",
                owner,
            ))
        }
        _ => Ok(()),
    }
}
