// Copyright 2024 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

use std::fmt;

use bio_types::strand::ReqStrand;
use itertools::Itertools;

use crate::alignment::AlignmentRecord;
use crate::annotation::AnnotationIndex;
use crate::errors::{self, Error};
use crate::filtration::FilterTag;
use crate::utils;

/// Role of an alignment record within a candidate.
#[derive(
    Display,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumString,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Mate1,
    Mate2,
    SplitRead,
    Supplementary,
}

/// The alignment records jointly supporting a fusion candidate.
#[derive(Debug, Clone, PartialEq, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ChimericAlignments {
    /// Mates of a pair aligning to two distinct loci.
    DiscordantMates {
        mate1: AlignmentRecord,
        mate2: AlignmentRecord,
    },
    /// A read split at the junction, optionally with its unsplit mate.
    SplitRead {
        split_read: AlignmentRecord,
        supplementary: AlignmentRecord,
        mate1: Option<AlignmentRecord>,
    },
}

impl ChimericAlignments {
    /// Assemble from role-tagged records. Valid shapes are mate1 + mate2 or
    /// split_read + supplementary with an optional mate1, in any order.
    pub fn from_roles(name: &str, records: Vec<(Role, AlignmentRecord)>) -> Result<Self, Error> {
        let roles = records.iter().map(|(role, _)| *role).collect_vec();
        if roles.iter().unique().count() != roles.len() {
            return Err(errors::invalid_candidate(
                name,
                &format!("duplicate roles in {}", roles.iter().join(",")),
            ));
        }

        let (mut mate1, mut mate2, mut split_read, mut supplementary) = (None, None, None, None);
        for (role, record) in records {
            match role {
                Role::Mate1 => mate1 = Some(record),
                Role::Mate2 => mate2 = Some(record),
                Role::SplitRead => split_read = Some(record),
                Role::Supplementary => supplementary = Some(record),
            }
        }

        match (mate1, mate2, split_read, supplementary) {
            (Some(mate1), Some(mate2), None, None) => {
                Ok(ChimericAlignments::DiscordantMates { mate1, mate2 })
            }
            (mate1, None, Some(split_read), Some(supplementary)) => {
                Ok(ChimericAlignments::SplitRead {
                    split_read,
                    supplementary,
                    mate1,
                })
            }
            _ => Err(errors::invalid_candidate(
                name,
                &format!(
                    "roles {} form neither discordant mates nor a split read",
                    roles.iter().join(",")
                ),
            )),
        }
    }

    /// The two records spanning the junction: both mates, or split read and
    /// supplementary alignment.
    pub fn sides(&self) -> (&AlignmentRecord, &AlignmentRecord) {
        match self {
            ChimericAlignments::DiscordantMates { mate1, mate2 } => (mate1, mate2),
            ChimericAlignments::SplitRead {
                split_read,
                supplementary,
                ..
            } => (split_read, supplementary),
        }
    }

    pub fn records(&self) -> Vec<(Role, &AlignmentRecord)> {
        match self {
            ChimericAlignments::DiscordantMates { mate1, mate2 } => {
                vec![(Role::Mate1, mate1), (Role::Mate2, mate2)]
            }
            ChimericAlignments::SplitRead {
                split_read,
                supplementary,
                mate1,
            } => {
                let mut records = vec![
                    (Role::SplitRead, split_read),
                    (Role::Supplementary, supplementary),
                ];
                if let Some(mate1) = mate1 {
                    records.push((Role::Mate1, mate1));
                }
                records
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        self.into()
    }

    fn annotate(self, annotation: &AnnotationIndex) -> Self {
        match self {
            ChimericAlignments::DiscordantMates { mate1, mate2 } => {
                ChimericAlignments::DiscordantMates {
                    mate1: mate1.annotate(annotation),
                    mate2: mate2.annotate(annotation),
                }
            }
            ChimericAlignments::SplitRead {
                split_read,
                supplementary,
                mate1,
            } => ChimericAlignments::SplitRead {
                split_read: split_read.annotate(annotation),
                supplementary: supplementary.annotate(annotation),
                mate1: mate1.map(|mate1| mate1.annotate(annotation)),
            },
        }
    }
}

/// Outcome of filtering a candidate. Anything but `Unfiltered` is final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    Unfiltered,
    Filtered(FilterTag),
    /// Excluded because a record could not be resolved to breakpoints.
    Malformed,
}

impl Verdict {
    pub fn is_unfiltered(&self) -> bool {
        *self == Verdict::Unfiltered
    }
}

impl Default for Verdict {
    fn default() -> Self {
        Verdict::Unfiltered
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Unfiltered => write!(f, "."),
            Verdict::Filtered(tag) => write!(f, "{}", tag),
            Verdict::Malformed => write!(f, "malformed_alignment"),
        }
    }
}

/// A group of chimeric alignments supporting one fusion candidate.
#[derive(new, Getters, Debug, Clone, PartialEq)]
pub struct Candidate {
    #[getset(get = "pub")]
    name: String,
    #[getset(get = "pub")]
    alignments: ChimericAlignments,
    #[new(default)]
    verdict: Verdict,
}

impl Candidate {
    pub fn verdict(&self) -> Verdict {
        self.verdict
    }

    /// Record the verdict. A candidate is only ever judged once.
    pub fn set_verdict(&mut self, verdict: Verdict) {
        assert!(
            self.verdict.is_unfiltered(),
            "bug: candidate {} already has verdict {}, refusing to overwrite with {}",
            self.name,
            self.verdict,
            verdict
        );
        self.verdict = verdict;
    }

    /// Annotate all records with the genes they overlap.
    pub fn annotate(self, annotation: &AnnotationIndex) -> Self {
        Candidate {
            alignments: self.alignments.annotate(annotation),
            ..self
        }
    }

    /// Whether the two sides share a gene or, failing that, lie on the same contig.
    /// Only such candidates are subject to filtering.
    pub fn shares_gene_or_contig(&self) -> bool {
        let (a, b) = self.alignments.sides();
        !a.genes().intersect(b.genes()).is_empty() || utils::same_contig(a.contig(), b.contig())
    }

    /// Human readable listing of the candidate's records for diagnostics.
    pub fn describe(&self) -> String {
        format!(
            "{} ({})",
            self.name,
            self.alignments
                .records()
                .into_iter()
                .map(|(role, record)| format!(
                    "{}={}:{}{} {}",
                    role,
                    record.contig(),
                    record.start(),
                    match record.strand() {
                        ReqStrand::Forward => '+',
                        ReqStrand::Reverse => '-',
                    },
                    record.cigar()
                ))
                .join(", ")
        )
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use bio_types::strand::ReqStrand::{Forward, Reverse};

    use super::*;
    use crate::alignment::tests::record;
    use crate::annotation::tests::feature;
    use crate::annotation::FeatureKind;

    pub(crate) fn discordant(name: &str, mate1: AlignmentRecord, mate2: AlignmentRecord) -> Candidate {
        Candidate::new(
            name.to_owned(),
            ChimericAlignments::DiscordantMates { mate1, mate2 },
        )
    }

    #[test]
    fn test_from_roles() {
        let alignments = ChimericAlignments::from_roles(
            "r1",
            vec![
                (Role::Mate2, record("1", 200, Reverse, "50M")),
                (Role::Mate1, record("1", 100, Forward, "50M")),
            ],
        )
        .unwrap();
        assert_eq!(alignments.kind(), "discordant_mates");
        assert_eq!(alignments.sides().0.start(), 100);

        let alignments = ChimericAlignments::from_roles(
            "r2",
            vec![
                (Role::SplitRead, record("1", 100, Forward, "30M20S")),
                (Role::Supplementary, record("2", 500, Forward, "30S20M")),
                (Role::Mate1, record("1", 20, Reverse, "50M")),
            ],
        )
        .unwrap();
        assert_eq!(alignments.kind(), "split_read");
        assert_eq!(alignments.records().len(), 3);
    }

    #[test]
    fn test_from_roles_invalid_shapes() {
        let invalid = |roles: Vec<Role>| {
            ChimericAlignments::from_roles(
                "r",
                roles
                    .into_iter()
                    .map(|role| (role, record("1", 100, Forward, "50M")))
                    .collect(),
            )
        };
        assert!(invalid(vec![Role::Mate1]).is_err());
        assert!(invalid(vec![Role::Mate1, Role::Mate1]).is_err());
        assert!(invalid(vec![Role::Mate1, Role::Mate2, Role::SplitRead]).is_err());
        assert!(invalid(vec![Role::SplitRead, Role::Mate2, Role::Supplementary]).is_err());
        assert!(invalid(vec![Role::Supplementary, Role::Mate1]).is_err());
    }

    #[test]
    fn test_shares_gene_or_contig() {
        let annotation = AnnotationIndex::new(vec![
            feature("A", FeatureKind::Gene, "1", 0, 1000),
            feature("A", FeatureKind::Gene, "5", 0, 1000),
            feature("B", FeatureKind::Gene, "2", 0, 1000),
        ]);
        let same_contig = discordant(
            "a",
            record("1", 100, Forward, "50M"),
            record("1", 5000, Reverse, "50M"),
        )
        .annotate(&annotation);
        assert!(same_contig.shares_gene_or_contig());

        // distinct contigs, but a gene id annotated on both
        let shared_gene = discordant(
            "b",
            record("1", 100, Forward, "50M"),
            record("5", 100, Reverse, "50M"),
        )
        .annotate(&annotation);
        assert!(shared_gene.shares_gene_or_contig());

        let unrelated = discordant(
            "c",
            record("1", 100, Forward, "50M"),
            record("2", 100, Reverse, "50M"),
        )
        .annotate(&annotation);
        assert!(!unrelated.shares_gene_or_contig());

        let unannotated = discordant(
            "d",
            record("chr3", 100, Forward, "50M"),
            record("3", 100, Reverse, "50M"),
        );
        assert!(unannotated.shares_gene_or_contig());
    }

    #[test]
    fn test_set_verdict_once() {
        let mut candidate = discordant(
            "a",
            record("1", 100, Forward, "50M"),
            record("1", 300, Reverse, "50M"),
        );
        assert!(candidate.verdict().is_unfiltered());
        candidate.set_verdict(Verdict::Filtered(FilterTag::Hairpin));
        assert_eq!(candidate.verdict(), Verdict::Filtered(FilterTag::Hairpin));
        assert_eq!(candidate.verdict().to_string(), "hairpin");
    }

    #[test]
    #[should_panic(expected = "bug:")]
    fn test_set_verdict_twice() {
        let mut candidate = discordant(
            "a",
            record("1", 100, Forward, "50M"),
            record("1", 300, Reverse, "50M"),
        );
        candidate.set_verdict(Verdict::Filtered(FilterTag::Hairpin));
        candidate.set_verdict(Verdict::Filtered(FilterTag::ReadThrough));
    }

    #[test]
    fn test_describe() {
        let candidate = discordant(
            "read1",
            record("1", 100, Forward, "50M"),
            record("1", 300, Reverse, "10S40M"),
        );
        assert_eq!(
            candidate.describe(),
            "read1 (mate1=1:100+ 50M, mate2=1:300- 10S40M)"
        );
    }
}
