// Copyright 2024 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

use std::collections::HashSet;

use anyhow::Result;

use crate::annotation::AnnotationIndex;
use crate::candidate::Candidate;
use crate::filtration::{Filter, FilterTag};
use crate::utils::normalize_contig;

/// Discards candidates with any record outside the contigs of interest.
#[derive(Debug, Clone)]
pub struct UninterestingContigsFilter {
    interesting_contigs: HashSet<String>,
}

impl UninterestingContigsFilter {
    pub fn new(interesting_contigs: &[String]) -> Self {
        UninterestingContigsFilter {
            interesting_contigs: interesting_contigs
                .iter()
                .map(|contig| normalize_contig(contig).to_owned())
                .collect(),
        }
    }
}

impl Filter for UninterestingContigsFilter {
    fn tag(&self) -> FilterTag {
        FilterTag::UninterestingContigs
    }

    fn is_artifact(&self, candidate: &Candidate, _annotation: &AnnotationIndex) -> Result<bool> {
        Ok(candidate
            .alignments()
            .records()
            .iter()
            .any(|(_, record)| !self.interesting_contigs.contains(normalize_contig(record.contig()))))
    }
}

#[cfg(test)]
mod tests {
    use bio_types::strand::ReqStrand::{Forward, Reverse};

    use super::*;
    use crate::alignment::tests::record;
    use crate::candidate::tests::discordant;
    use crate::candidate::ChimericAlignments;

    fn filter() -> UninterestingContigsFilter {
        UninterestingContigsFilter::new(&["chr1".to_owned(), "2".to_owned(), "X".to_owned()])
    }

    #[test]
    fn test_interesting() {
        let candidate = discordant(
            "a",
            record("1", 100, Forward, "50M"),
            record("chrX", 100, Reverse, "50M"),
        );
        assert!(!filter()
            .is_artifact(&candidate, &AnnotationIndex::default())
            .unwrap());
    }

    #[test]
    fn test_uninteresting_mate() {
        let candidate = Candidate::new(
            "b".to_owned(),
            ChimericAlignments::SplitRead {
                split_read: record("1", 100, Forward, "50M50S"),
                supplementary: record("2", 100, Forward, "50S50M"),
                mate1: Some(record("GL000220.1", 100, Reverse, "100M")),
            },
        );
        assert!(filter()
            .is_artifact(&candidate, &AnnotationIndex::default())
            .unwrap());
    }
}
