// Copyright 2024 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Aligned segments of chimeric reads and the breakpoints they imply.

use bio_types::strand::ReqStrand;
use rust_htslib::bam;
use rust_htslib::bam::record::CigarString;

use crate::annotation::{AnnotationIndex, GeneSet};
use crate::errors::{self, Error};

pub(crate) mod cigar;

use self::cigar::{ReferenceRuns, RunKind};

/// One aligned segment of a read.
///
/// The start is 0-based, the end implied by the CIGAR string is exclusive.
#[derive(new, Getters, CopyGetters, Debug, Clone, PartialEq)]
pub struct AlignmentRecord {
    #[getset(get = "pub")]
    contig: String,
    #[getset(get_copy = "pub")]
    start: i64,
    #[getset(get_copy = "pub")]
    strand: ReqStrand,
    #[getset(get = "pub")]
    cigar: CigarString,
    /// End position as reported by the stage that produced the record, if any.
    #[new(default)]
    #[getset(get_copy = "pub")]
    declared_end: Option<i64>,
    /// Genes overlapping the aligned span.
    #[new(default)]
    #[getset(get = "pub")]
    genes: GeneSet,
}

impl AlignmentRecord {
    /// Convert a BAM record aligned to the given contig.
    pub fn from_bam(record: &bam::Record, contig: &str) -> Self {
        let strand = if record.is_reverse() {
            ReqStrand::Reverse
        } else {
            ReqStrand::Forward
        };
        AlignmentRecord::new(
            contig.to_owned(),
            record.pos(),
            strand,
            record.cigar().take(),
        )
    }

    pub fn with_declared_end(mut self, end: i64) -> Self {
        self.declared_end = Some(end);
        self
    }

    /// Annotate the record with the genes overlapping its aligned span.
    ///
    /// Malformed records stay without genes, the defect surfaces once
    /// breakpoints are queried.
    pub fn annotate(mut self, annotation: &AnnotationIndex) -> Self {
        self.genes = match self.aligned_span() {
            Ok((start, end)) => annotation.gene_set(&self.contig, start, end - 1),
            Err(e) => {
                debug!("Not annotating record: {}", e);
                GeneSet::default()
            }
        };
        self
    }

    fn runs(&self) -> ReferenceRuns<'_> {
        ReferenceRuns::new(&self.cigar, self.start)
    }

    fn malformed(&self, msg: &str) -> Error {
        errors::malformed_alignment(&self.contig, self.start, &self.cigar.to_string(), msg)
    }

    /// Walk the CIGAR string and return the exclusive end of the alignment,
    /// checking consistency with the start and the declared end.
    fn checked_end(&self) -> Result<i64, Error> {
        if self.start < 0 {
            return Err(self.malformed("negative start position"));
        }
        if !self.runs().any(|run| run.kind == RunKind::Aligned) {
            return Err(self.malformed("no aligned bases"));
        }
        let end = cigar::reference_end(&self.cigar, self.start)
            .ok_or_else(|| self.malformed("reference position overflows"))?;
        match self.declared_end {
            Some(declared) if declared != end => Err(self.malformed(&format!(
                "declared end {} differs from end {} implied by CIGAR",
                declared, end
            ))),
            _ => Ok(end),
        }
    }

    /// Reference interval `[start, end)` consumed by the alignment.
    pub fn aligned_span(&self) -> Result<(i64, i64), Error> {
        Ok((self.start, self.checked_end()?))
    }

    /// Edge of the alignment facing the fusion junction.
    ///
    /// On the forward strand, this is the position right after the last aligned
    /// base, on the reverse strand the alignment start.
    pub fn breakpoint_position(&self) -> Result<i64, Error> {
        self.checked_end()?;
        match self.strand {
            ReqStrand::Forward => self
                .runs()
                .filter(|run| run.kind == RunKind::Aligned)
                .last()
                .map(|run| run.end())
                .ok_or_else(|| self.malformed("no aligned bases")),
            ReqStrand::Reverse => Ok(self.start),
        }
    }

    /// Whether the given position is covered by aligned (neither deleted nor
    /// skipped) bases of this record. Both ends of each aligned run count as inside.
    pub fn breakpoint_within_segment(&self, point: i64) -> Result<bool, Error> {
        self.checked_end()?;
        Ok(self
            .runs()
            .filter(|run| run.kind == RunKind::Aligned)
            .any(|run| run.start <= point && point <= run.end()))
    }
}

/// Reference interval `[start, end)` consumed by the given record.
pub fn aligned_span(record: &AlignmentRecord) -> Result<(i64, i64), Error> {
    record.aligned_span()
}

/// Breakpoint implied by the given record, see `AlignmentRecord::breakpoint_position`.
pub fn breakpoint_position(record: &AlignmentRecord) -> Result<i64, Error> {
    record.breakpoint_position()
}

/// Whether `point` lies within aligned bases of `record`.
pub fn breakpoint_within_segment(point: i64, record: &AlignmentRecord) -> Result<bool, Error> {
    record.breakpoint_within_segment(point)
}
