//! Result-limit bounds for the acquisition operations
//!
//! Callers pass a numeric limit with every query. Each source accepts a
//! different range; out-of-range values are clamped rather than rejected,
//! since most operations have no error channel to report them on.

use std::ops::RangeInclusive;

use tracing::debug;

/// Drug labels and adverse events (openFDA allows far more; keep replies small)
pub const OPENFDA_LIMITS: RangeInclusive<usize> = 1..=100;

/// PubMed and Google Scholar article searches
pub const ARTICLE_LIMITS: RangeInclusive<usize> = 1..=20;

/// WHO health-indicator data points
pub const INDICATOR_LIMITS: RangeInclusive<usize> = 1..=50;

pub const DEFAULT_LIMIT: usize = 10;

/// Clamp a requested limit into `bounds`
///
/// # Arguments
/// * `requested` - Caller's limit, `None` for the default
/// * `bounds` - Inclusive range accepted by the source
///
/// # Example
/// ```
/// use medical_sources::utils::limits::{clamp_limit, ARTICLE_LIMITS};
/// assert_eq!(clamp_limit(Some(500), ARTICLE_LIMITS), 20);
/// ```
pub fn clamp_limit(requested: Option<usize>, bounds: RangeInclusive<usize>) -> usize {
    let limit = requested.unwrap_or(DEFAULT_LIMIT);
    let clamped = limit.clamp(*bounds.start(), *bounds.end());
    if clamped != limit {
        debug!(
            "Limit {} outside {}..={}, using {}",
            limit,
            bounds.start(),
            bounds.end(),
            clamped
        );
    }
    clamped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_limit() {
        assert_eq!(clamp_limit(None, ARTICLE_LIMITS), 10);
        assert_eq!(clamp_limit(Some(0), INDICATOR_LIMITS), 1);
        assert_eq!(clamp_limit(Some(51), INDICATOR_LIMITS), 50);
        assert_eq!(clamp_limit(Some(42), OPENFDA_LIMITS), 42);
    }
}
