//! genomics.rs
//!
//! Utility functions for genomics-related tasks

/// Strip "chr" prefix, so both "chr1" and "1" normalize to "1".
pub(crate) fn normalize_contig(contig: &str) -> &str {
    contig.strip_prefix("chr").unwrap_or(contig)
}

/// Whether two contig names refer to the same contig after normalization.
pub(crate) fn same_contig(a: &str, b: &str) -> bool {
    normalize_contig(a) == normalize_contig(b)
}
