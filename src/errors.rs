// Copyright 2024 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum Error {
    #[error("malformed alignment on contig {contig} at {start} (CIGAR {cigar}): {msg}")]
    MalformedAlignment {
        contig: String,
        start: i64,
        cigar: String,
        msg: String,
    },
    #[error("unknown filter {name} in configuration; valid filters are: {valid}")]
    UnknownFilter { name: String, valid: String },
    #[error("invalid candidate {name}: {msg}")]
    InvalidCandidate { name: String, msg: String },
    #[error("invalid strand information '{value}', must be '+' or '-'")]
    InvalidStrandInfo { value: String },
    #[error("invalid CIGAR string '{cigar}'")]
    InvalidCigar { cigar: String },
    #[error("invalid GTF feature specification '{spec}', expected KEY=VALUE pairs with keys gene_id, gene_name, feature_gene, feature_exon")]
    InvalidGtfFeatures { spec: String },
    #[error("invalid GTF record in line {line}: {msg}")]
    InvalidGtfRecord { line: u64, msg: String },
    #[error("unsupported candidate file format {path:?}, expected .json, .yaml or .yml")]
    UnsupportedInputFormat { path: PathBuf },
}

pub(crate) fn malformed_alignment(contig: &str, start: i64, cigar: &str, msg: &str) -> Error {
    Error::MalformedAlignment {
        contig: contig.to_owned(),
        start,
        cigar: cigar.to_owned(),
        msg: msg.to_owned(),
    }
}

pub(crate) fn invalid_candidate(name: &str, msg: &str) -> Error {
    Error::InvalidCandidate {
        name: name.to_owned(),
        msg: msg.to_owned(),
    }
}
