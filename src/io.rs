// Copyright 2024 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Reading fusion candidates and writing their verdicts.

use std::convert::TryFrom;
use std::fs::File;
use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use bio_types::strand::ReqStrand;
use itertools::Itertools;
use rust_htslib::bam::record::CigarString;

use crate::alignment::AlignmentRecord;
use crate::annotation::AnnotationIndex;
use crate::candidate::{Candidate, ChimericAlignments, Role};
use crate::errors::Error;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RecordSpec {
    pub role: Role,
    pub contig: String,
    pub start: i64,
    pub strand: String,
    pub cigar: String,
    #[serde(default)]
    pub end: Option<i64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CandidateSpec {
    pub name: String,
    pub alignments: Vec<RecordSpec>,
}

fn parse_strand(value: &str) -> Result<ReqStrand, Error> {
    match value {
        "+" => Ok(ReqStrand::Forward),
        "-" => Ok(ReqStrand::Reverse),
        _ => Err(Error::InvalidStrandInfo {
            value: value.to_owned(),
        }),
    }
}

impl RecordSpec {
    pub fn into_record(self) -> Result<(Role, AlignmentRecord), Error> {
        let strand = parse_strand(&self.strand)?;
        let cigar = CigarString::try_from(self.cigar.as_str()).map_err(|_| Error::InvalidCigar {
            cigar: self.cigar.clone(),
        })?;
        let mut record = AlignmentRecord::new(self.contig, self.start, strand, cigar);
        if let Some(end) = self.end {
            record = record.with_declared_end(end);
        }
        Ok((self.role, record))
    }
}

impl CandidateSpec {
    pub fn into_candidate(self) -> Result<Candidate, Error> {
        let records = self
            .alignments
            .into_iter()
            .map(RecordSpec::into_record)
            .collect::<Result<Vec<_>, Error>>()?;
        let alignments = ChimericAlignments::from_roles(&self.name, records)?;
        Ok(Candidate::new(self.name, alignments))
    }
}

/// Parse candidates from JSON or YAML, depending on the file extension, and
/// annotate them with overlapping genes.
pub fn read_candidates<P: AsRef<Path>>(
    path: P,
    annotation: &AnnotationIndex,
) -> Result<Vec<Candidate>> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    let reader = || {
        File::open(path).with_context(|| format!("unable to open candidates {}", path.display()))
    };
    let specs: Vec<CandidateSpec> = match extension.as_deref() {
        Some("json") => serde_json::from_reader(reader()?)
            .with_context(|| format!("invalid candidates in {}", path.display()))?,
        Some("yaml") | Some("yml") => serde_yaml::from_reader(reader()?)
            .with_context(|| format!("invalid candidates in {}", path.display()))?,
        _ => {
            return Err(Error::UnsupportedInputFormat {
                path: path.to_owned(),
            }
            .into())
        }
    };

    let candidates = specs
        .into_iter()
        .map(|spec| Ok(spec.into_candidate()?.annotate(annotation)))
        .collect::<Result<Vec<_>>>()?;
    info!("Read {} candidates from {}.", candidates.len(), path.display());
    Ok(candidates)
}

#[derive(Serialize, Debug)]
struct VerdictRecord<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    verdict: String,
}

/// Write one tab-separated line per candidate with its name, kind and verdict,
/// where `.` denotes candidates that passed all filters.
pub fn write_verdicts<W: io::Write>(writer: W, candidates: &[Candidate]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(writer);
    for candidate in candidates {
        writer.serialize(VerdictRecord {
            name: candidate.name(),
            kind: candidate.alignments().kind(),
            verdict: candidate.verdict().to_string(),
        })?;
    }
    writer.flush()?;
    Ok(())
}

/// Names of candidates that passed all filters.
pub fn remaining_names(candidates: &[Candidate]) -> Vec<&str> {
    candidates
        .iter()
        .filter(|candidate| candidate.verdict().is_unfiltered())
        .map(|candidate| candidate.name().as_str())
        .collect_vec()
}
