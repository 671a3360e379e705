/*!
 * Language pack version policy.
 *
 * Each locale carries a `crowdin_version` counter that advances only when the
 * number of approved translations changes, and starts over at 1 whenever the
 * pack is built for a newer software release.
 */

use anyhow::{anyhow, Result};
use log::warn;

use crate::metadata::{LocaleMetadata, RemoteTranslationStatus};

/// Three-way comparison of software version strings
pub trait VersionComparator: Send + Sync {
    /// Negative if `a` is older than `b`, zero if equal, positive if newer
    fn version_diff(&self, a: &str, b: &str) -> Result<i64>;
}

/// Compares dot separated numeric versions component by component.
///
/// The result is the difference of the leftmost differing component, so
/// `0.10.1` vs `0.9.4` yields `1`. Missing trailing components count as zero
/// and a component such as `3-rc1` compares on its numeric prefix.
#[derive(Debug, Clone, Copy, Default)]
pub struct DottedVersionComparator;

impl DottedVersionComparator {
    fn parse(version: &str) -> Result<Vec<i64>> {
        version
            .trim()
            .split('.')
            .map(|part| {
                let digits: String = part.chars().take_while(|c| c.is_ascii_digit()).collect();
                digits
                    .parse::<i64>()
                    .map_err(|_| anyhow!("Invalid version component '{}' in '{}'", part, version))
            })
            .collect()
    }
}

impl VersionComparator for DottedVersionComparator {
    fn version_diff(&self, a: &str, b: &str) -> Result<i64> {
        let a_parts = Self::parse(a)?;
        let b_parts = Self::parse(b)?;
        let len = a_parts.len().max(b_parts.len());

        for i in 0..len {
            let diff = a_parts.get(i).copied().unwrap_or(0) - b_parts.get(i).copied().unwrap_or(0);
            if diff != 0 {
                return Ok(diff);
            }
        }
        Ok(0)
    }
}

/// Decide the `crowdin_version` for a locale in this run.
///
/// Returns 1 when there is no usable baseline (no previous record, no
/// translated count, or a previous software version that is older than
/// `software_version` or cannot be compared). Returns the previous version
/// unchanged when the approved count has not moved, and the previous version
/// plus one otherwise.
pub fn next_version(
    previous: Option<&LocaleMetadata>,
    current: &RemoteTranslationStatus,
    software_version: &str,
    comparator: &dyn VersionComparator,
) -> u32 {
    let Some(previous) = previous else {
        return 1;
    };

    let total_translated = match previous.total_translated {
        Some(total) if total > 0 => total,
        _ => return 1,
    };

    let Some(previous_software) = previous.software_version.as_deref() else {
        return 1;
    };

    match comparator.version_diff(previous_software, software_version) {
        Ok(diff) if diff < 0 => return 1,
        Ok(_) => {}
        Err(e) => {
            warn!("Cannot compare software versions for '{}': {}", previous.code, e);
            return 1;
        }
    }

    if total_translated == current.approved {
        previous.crowdin_version.unwrap_or(1)
    } else {
        previous.crowdin_version.unwrap_or(0) + 1
    }
}
