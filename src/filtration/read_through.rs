// Copyright 2024 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

use anyhow::Result;

use crate::annotation::AnnotationIndex;
use crate::candidate::Candidate;
use crate::filtration::{Filter, FilterTag};
use crate::utils;

/// Discards candidates whose breakpoints lie on the same contig closer than
/// `min_distance`, as they are likely transcriptional read-through events.
#[derive(new, CopyGetters, Debug, Clone)]
pub struct ReadThroughFilter {
    #[getset(get_copy = "pub")]
    min_distance: u64,
}

impl Filter for ReadThroughFilter {
    fn tag(&self) -> FilterTag {
        FilterTag::ReadThrough
    }

    fn is_artifact(&self, candidate: &Candidate, _annotation: &AnnotationIndex) -> Result<bool> {
        let (a, b) = candidate.alignments().sides();
        if !utils::same_contig(a.contig(), b.contig()) {
            return Ok(false);
        }
        let distance = (a.breakpoint_position()? - b.breakpoint_position()?).unsigned_abs();
        Ok(distance < self.min_distance)
    }
}

#[cfg(test)]
mod tests {
    use bio_types::strand::ReqStrand::{Forward, Reverse};

    use super::*;
    use crate::alignment::tests::record;
    use crate::candidate::tests::discordant;

    fn is_read_through(candidate: &Candidate) -> bool {
        ReadThroughFilter::new(10000)
            .is_artifact(candidate, &AnnotationIndex::default())
            .unwrap()
    }

    #[test]
    fn test_close_breakpoints() {
        // breakpoints 150 and 9000
        let candidate = discordant(
            "a",
            record("1", 100, Forward, "50M"),
            record("chr1", 9000, Reverse, "50M"),
        );
        assert!(is_read_through(&candidate));
    }

    #[test]
    fn test_distant_breakpoints() {
        // breakpoints 150 and 10150 are exactly min_distance apart
        let candidate = discordant(
            "a",
            record("1", 100, Forward, "50M"),
            record("1", 10150, Reverse, "50M"),
        );
        assert!(!is_read_through(&candidate));
    }

    #[test]
    fn test_other_contig() {
        let candidate = discordant(
            "a",
            record("1", 100, Forward, "50M"),
            record("2", 100, Reverse, "50M"),
        );
        assert!(!is_read_through(&candidate));
    }
}
