//! Effective-dated version resolution.
//!
//! Selection rule, applied identically to stream configs and priors:
//! 1. Among all versions, take the one with the greatest `effective_from`
//!    that is at or before the evaluated timestamp.
//! 2. Ties in `effective_from` break toward the highest `version` number.
//! 3. If the timestamp precedes every version, fall back to the earliest
//!    known version rather than failing, so early-history backfills stay
//!    evaluable.
//!
//! Zero versions is the caller's `NotConfigured` condition; this module
//! just returns `None`.

use chrono::{DateTime, Utc};

/// Anything that carries effective-dating metadata.
pub trait Versioned {
    fn effective_from(&self) -> DateTime<Utc>;
    fn version(&self) -> u32;
}

impl Versioned for crate::StreamConfig {
    fn effective_from(&self) -> DateTime<Utc> {
        self.effective_from
    }

    fn version(&self) -> u32 {
        self.version
    }
}

impl Versioned for crate::PriorConfig {
    fn effective_from(&self) -> DateTime<Utc> {
        self.effective_from
    }

    fn version(&self) -> u32 {
        self.version
    }
}

/// Select the single version in force at `at`.
///
/// Returns `None` only when `versions` is empty.
pub fn resolve_effective<'a, T: Versioned>(
    versions: impl IntoIterator<Item = &'a T>,
    at: DateTime<Utc>,
) -> Option<&'a T> {
    let mut in_force: Option<&T> = None;
    let mut earliest: Option<&T> = None;

    for candidate in versions {
        let better_earliest = match earliest {
            None => true,
            Some(current) => {
                (candidate.effective_from(), std::cmp::Reverse(candidate.version()))
                    < (current.effective_from(), std::cmp::Reverse(current.version()))
            }
        };
        if better_earliest {
            earliest = Some(candidate);
        }

        if candidate.effective_from() > at {
            continue;
        }
        let better_in_force = match in_force {
            None => true,
            Some(current) => {
                (candidate.effective_from(), candidate.version())
                    > (current.effective_from(), current.version())
            }
        };
        if better_in_force {
            in_force = Some(candidate);
        }
    }

    in_force.or(earliest)
}
