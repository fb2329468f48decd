//! Dashboard statistics over an edition's application set.

use serde::Serialize;

use super::applications::domain::{ApplicationStatus, VendorApplication};
use super::pricing::{compute_total, PriceConfig};

/// Counts per status plus the projected revenue for one edition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditionStats {
    pub total: usize,
    pub pending: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub details_submitted: usize,
    pub validated: usize,
    pub revenue: u32,
}

/// Reduce the record set into dashboard statistics.
///
/// Revenue is a commutative fold of [`compute_total`], so the result does not
/// depend on iteration order; only records with a complete declaration
/// contribute (the calculator returns zero for the rest).
pub fn aggregate(records: &[VendorApplication], config: &PriceConfig) -> EditionStats {
    let mut stats = EditionStats {
        total: records.len(),
        pending: 0,
        accepted: 0,
        rejected: 0,
        details_submitted: 0,
        validated: 0,
        revenue: 0,
    };

    for record in records {
        match record.status {
            ApplicationStatus::Pending => stats.pending += 1,
            ApplicationStatus::Accepted => stats.accepted += 1,
            ApplicationStatus::Rejected => stats.rejected += 1,
            ApplicationStatus::DetailsSubmitted => stats.details_submitted += 1,
            ApplicationStatus::Validated => stats.validated += 1,
        }
        stats.revenue += compute_total(record, config);
    }

    stats
}
