// Copyright 2024 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Detection of fragments folding back onto themselves.
//!
//! If one side's breakpoint is covered by aligned bases of the other side, the two
//! alignments stem from the same stretch of DNA read twice, e.g. because of an
//! adapter or primer induced hairpin, and do not indicate a rearrangement.

use anyhow::Result;

use crate::alignment::{breakpoint_position, breakpoint_within_segment};
use crate::annotation::AnnotationIndex;
use crate::candidate::{Candidate, ChimericAlignments};
use crate::filtration::{Filter, FilterTag};

#[derive(new, CopyGetters, Debug, Clone)]
pub struct HairpinFilter {
    /// Accepted for compatibility, not used by the comparison.
    #[getset(get_copy = "pub")]
    max_mate_gap: u64,
}

impl Filter for HairpinFilter {
    fn tag(&self) -> FilterTag {
        FilterTag::Hairpin
    }

    fn is_artifact(&self, candidate: &Candidate, _annotation: &AnnotationIndex) -> Result<bool> {
        Ok(match candidate.alignments() {
            ChimericAlignments::DiscordantMates { mate1, mate2 } => {
                let breakpoint1 = breakpoint_position(mate1)?;
                let breakpoint2 = breakpoint_position(mate2)?;
                breakpoint_within_segment(breakpoint1, mate2)?
                    || breakpoint_within_segment(breakpoint2, mate1)?
            }
            ChimericAlignments::SplitRead {
                split_read,
                supplementary,
                mate1,
            } => {
                let breakpoint_split_read = breakpoint_position(split_read)?;
                let breakpoint_supplementary = breakpoint_position(supplementary)?;
                breakpoint_within_segment(breakpoint_split_read, supplementary)?
                    || breakpoint_within_segment(breakpoint_supplementary, split_read)?
                    || match mate1 {
                        Some(mate1) => breakpoint_within_segment(breakpoint_supplementary, mate1)?,
                        None => false,
                    }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use bio_types::strand::ReqStrand::{Forward, Reverse};

    use super::*;
    use crate::alignment::tests::record;
    use crate::alignment::AlignmentRecord;
    use crate::candidate::tests::discordant;

    fn split_read(
        split_read: AlignmentRecord,
        supplementary: AlignmentRecord,
        mate1: Option<AlignmentRecord>,
    ) -> Candidate {
        Candidate::new(
            "split".to_owned(),
            ChimericAlignments::SplitRead {
                split_read,
                supplementary,
                mate1,
            },
        )
    }

    fn is_hairpin(candidate: &Candidate) -> bool {
        HairpinFilter::new(200)
            .is_artifact(candidate, &AnnotationIndex::default())
            .unwrap()
    }

    #[test]
    fn test_discordant_mates_overlapping() {
        // mate1 ends at 150, which is covered by mate2
        let candidate = discordant(
            "a",
            record("1", 100, Forward, "50M"),
            record("1", 140, Forward, "60M"),
        );
        assert!(is_hairpin(&candidate));
    }

    #[test]
    fn test_discordant_mates_symmetric() {
        // mate1 breakpoint 100 (reverse) lies outside mate2, but mate2's
        // breakpoint 120 (forward end) is covered by mate1
        let candidate = discordant(
            "a",
            record("1", 100, Reverse, "50M"),
            record("1", 60, Forward, "60M"),
        );
        assert!(is_hairpin(&candidate));
    }

    #[test]
    fn test_discordant_mates_apart() {
        let candidate = discordant(
            "a",
            record("1", 100, Forward, "50M"),
            record("1", 200, Reverse, "50M"),
        );
        assert!(!is_hairpin(&candidate));
        let candidate = discordant(
            "a",
            record("1", 100, Forward, "50M"),
            record("1", 200, Forward, "50M"),
        );
        assert!(!is_hairpin(&candidate));
    }

    #[test]
    fn test_breakpoint_in_intron_is_not_covered() {
        // mate1's breakpoint 150 falls into the skipped region of mate2
        let candidate = discordant(
            "a",
            record("1", 100, Forward, "50M"),
            record("1", 120, Reverse, "20M100N30M"),
        );
        assert!(!is_hairpin(&candidate));
    }

    #[test]
    fn test_split_read() {
        let candidate = split_read(
            record("1", 1000, Forward, "60M40S"),
            record("1", 1030, Forward, "60S40M"),
            None,
        );
        // split read breakpoint 1060 lies in the supplementary alignment [1030, 1070]
        assert!(is_hairpin(&candidate));

        let candidate = split_read(
            record("1", 1000, Forward, "60M40S"),
            record("1", 5000, Forward, "60S40M"),
            None,
        );
        assert!(!is_hairpin(&candidate));
    }

    #[test]
    fn test_split_read_with_mate() {
        // supplementary breakpoint 5040 lies only within the mate
        let candidate = split_read(
            record("1", 1000, Forward, "60M40S"),
            record("1", 5000, Forward, "60S40M"),
            Some(record("1", 5020, Reverse, "100M")),
        );
        assert!(is_hairpin(&candidate));

        let candidate = split_read(
            record("1", 1000, Forward, "60M40S"),
            record("1", 5000, Forward, "60S40M"),
            Some(record("1", 8000, Reverse, "100M")),
        );
        assert!(!is_hairpin(&candidate));
    }

    #[test]
    fn test_max_mate_gap_is_inert() {
        let candidate = discordant(
            "a",
            record("1", 100, Forward, "50M"),
            record("1", 140, Forward, "60M"),
        );
        for max_mate_gap in &[0, 1, 200, 100000] {
            let filter = HairpinFilter::new(*max_mate_gap);
            assert_eq!(filter.max_mate_gap(), *max_mate_gap);
            assert!(filter
                .is_artifact(&candidate, &AnnotationIndex::default())
                .unwrap());
        }
    }

    #[test]
    fn test_malformed_record() {
        let candidate = discordant(
            "a",
            record("1", 100, Forward, "50M"),
            record("1", 140, Forward, "60S"),
        );
        assert!(HairpinFilter::new(200)
            .is_artifact(&candidate, &AnnotationIndex::default())
            .is_err());
    }
}
