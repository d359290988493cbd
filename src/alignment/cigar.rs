// Copyright 2024 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

use std::slice;

use rust_htslib::bam::record::Cigar;

/// How a CIGAR operation relates to the reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RunKind {
    /// Consumes read and reference (M, =, X).
    Aligned,
    /// Consumes reference only (D, N).
    Skipped,
    /// Does not consume reference (I, S, H, P).
    Unanchored,
}

impl From<&Cigar> for RunKind {
    fn from(op: &Cigar) -> Self {
        match op {
            Cigar::Match(_) | Cigar::Equal(_) | Cigar::Diff(_) => RunKind::Aligned,
            Cigar::Del(_) | Cigar::RefSkip(_) => RunKind::Skipped,
            Cigar::Ins(_) | Cigar::SoftClip(_) | Cigar::HardClip(_) | Cigar::Pad(_) => {
                RunKind::Unanchored
            }
        }
    }
}

/// A stretch of reference covered by a single CIGAR operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ReferenceRun {
    pub(crate) kind: RunKind,
    pub(crate) start: i64,
    pub(crate) len: i64,
}

impl ReferenceRun {
    /// Saturates instead of overflowing; callers check `reference_end` first.
    pub(crate) fn end(&self) -> i64 {
        self.start.saturating_add(self.len)
    }
}

/// Reference position after the last reference consuming operation, or `None`
/// if it is not representable.
pub(crate) fn reference_end(ops: &[Cigar], start: i64) -> Option<i64> {
    ops.iter()
        .filter(|op| RunKind::from(*op) != RunKind::Unanchored)
        .try_fold(start, |pos, op| pos.checked_add(i64::from(op.len())))
}

/// Iterator over the reference consuming operations of a CIGAR string,
/// annotated with the reference position they start at.
pub(crate) struct ReferenceRuns<'a> {
    ops: slice::Iter<'a, Cigar>,
    pos: i64,
}

impl<'a> ReferenceRuns<'a> {
    pub(crate) fn new(ops: &'a [Cigar], start: i64) -> Self {
        ReferenceRuns {
            ops: ops.iter(),
            pos: start,
        }
    }
}

impl<'a> Iterator for ReferenceRuns<'a> {
    type Item = ReferenceRun;

    fn next(&mut self) -> Option<ReferenceRun> {
        for op in &mut self.ops {
            let kind = RunKind::from(op);
            if kind == RunKind::Unanchored {
                continue;
            }
            let run = ReferenceRun {
                kind,
                start: self.pos,
                len: op.len() as i64,
            };
            self.pos = run.end();
            return Some(run);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;
    use rust_htslib::bam::record::CigarString;
    use std::convert::TryFrom;

    use super::*;

    #[test]
    fn test_reference_runs() {
        let cigar = CigarString::try_from("5S10M2I3D20M100N5=1X4H").unwrap();
        let runs = ReferenceRuns::new(&cigar, 1000).collect_vec();
        let expected = vec![
            (RunKind::Aligned, 1000, 10),
            (RunKind::Skipped, 1010, 3),
            (RunKind::Aligned, 1013, 20),
            (RunKind::Skipped, 1033, 100),
            (RunKind::Aligned, 1133, 5),
            (RunKind::Aligned, 1138, 1),
        ];
        assert_eq!(
            runs.iter().map(|run| (run.kind, run.start, run.len)).collect_vec(),
            expected
        );
        assert_eq!(runs.last().unwrap().end(), 1139);
    }

    #[test]
    fn test_reference_end() {
        let cigar = CigarString::try_from("5S10M3D20M4H").unwrap();
        assert_eq!(reference_end(&cigar, 100), Some(133));
        assert_eq!(reference_end(&cigar, i64::MAX - 33), Some(i64::MAX));
        assert_eq!(reference_end(&cigar, i64::MAX - 10), None);
        let runs = ReferenceRuns::new(&cigar, i64::MAX - 10).collect_vec();
        assert_eq!(runs.last().unwrap().end(), i64::MAX);
    }

    #[test]
    fn test_no_reference_runs() {
        let cigar = CigarString::try_from("50S").unwrap();
        assert_eq!(ReferenceRuns::new(&cigar, 10).count(), 0);
    }
}
