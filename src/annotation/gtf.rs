// Copyright 2024 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

use std::io;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use bio_types::strand::Strand;
use regex::Regex;

use crate::annotation::{Feature, FeatureKind, GeneId};
use crate::errors::Error;
use crate::utils;

lazy_static! {
    static ref ATTRIBUTE_RE: Regex =
        Regex::new(r#"(?P<key>[^\s;]+)\s+"?(?P<value>[^";]*)"?"#).unwrap();
}

/// Which GTF attributes and feature types make up genes and exons.
///
/// Can be parsed from a string like
/// `gene_id=gene_id gene_name=gene_name|gene_id feature_gene=gene feature_exon=exon`,
/// where `|` separates alternative attributes tried from left to right.
#[derive(Debug, Clone, PartialEq, Getters)]
#[getset(get = "pub")]
pub struct GtfFeatures {
    gene_id: Vec<String>,
    gene_name: Vec<String>,
    feature_gene: String,
    feature_exon: String,
}

impl Default for GtfFeatures {
    fn default() -> Self {
        GtfFeatures {
            gene_id: vec!["gene_id".to_owned()],
            gene_name: vec!["gene_name".to_owned(), "gene_id".to_owned()],
            feature_gene: "gene".to_owned(),
            feature_exon: "exon".to_owned(),
        }
    }
}

impl FromStr for GtfFeatures {
    type Err = Error;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidGtfFeatures {
            spec: spec.to_owned(),
        };
        let mut features = GtfFeatures::default();
        for item in utils::split_list(spec) {
            let mut tokens = item.splitn(2, '=');
            let (key, value) = match (tokens.next(), tokens.next()) {
                (Some(key), Some(value)) if !value.is_empty() => (key, value),
                _ => return Err(invalid()),
            };
            let alternatives = || value.split('|').map(|v| v.to_owned()).collect();
            match key {
                "gene_id" => features.gene_id = alternatives(),
                "gene_name" => features.gene_name = alternatives(),
                "feature_gene" => features.feature_gene = value.to_owned(),
                "feature_exon" => features.feature_exon = value.to_owned(),
                _ => return Err(invalid()),
            }
        }
        Ok(features)
    }
}

impl GtfFeatures {
    fn kind(&self, feature_type: &str) -> Option<FeatureKind> {
        if feature_type == self.feature_gene {
            Some(FeatureKind::Gene)
        } else if feature_type == self.feature_exon {
            Some(FeatureKind::Exon)
        } else {
            None
        }
    }
}

fn first_attribute<'a>(attributes: &'a [(&'a str, &'a str)], keys: &[String]) -> Option<&'a str> {
    keys.iter().find_map(|key| {
        attributes
            .iter()
            .find(|(k, _)| *k == key.as_str())
            .map(|(_, value)| *value)
    })
}

/// Read gene and exon features from the GTF file at the given path.
pub fn read_features<P: AsRef<Path>>(path: P, gtf_features: &GtfFeatures) -> Result<Vec<Feature>> {
    let reader = std::fs::File::open(path.as_ref())
        .with_context(|| format!("unable to open annotation {}", path.as_ref().display()))?;
    let features = parse_features(reader, gtf_features)
        .with_context(|| format!("unable to parse annotation {}", path.as_ref().display()))?;
    info!(
        "Read {} gene and exon features from {}.",
        features.len(),
        path.as_ref().display()
    );
    Ok(features)
}

/// Parse gene and exon features from GTF formatted input.
///
/// GTF coordinates are 1-based and inclusive, they are converted to 0-based inclusive.
/// Lines with other feature types are skipped.
pub fn parse_features<R: io::Read>(reader: R, gtf_features: &GtfFeatures) -> Result<Vec<Feature>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .comment(Some(b'#'))
        .flexible(true)
        .quoting(false)
        .from_reader(reader);

    let mut features = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map_or(0, |pos| pos.line());
        let invalid = |msg: &str| Error::InvalidGtfRecord {
            line,
            msg: msg.to_owned(),
        };
        if record.len() < 9 {
            return Err(invalid("expected 9 tab-separated columns").into());
        }
        let kind = match gtf_features.kind(&record[2]) {
            Some(kind) => kind,
            None => continue,
        };

        let start: i64 = record[3]
            .parse()
            .map_err(|_| invalid("start is not an integer"))?;
        let end: i64 = record[4]
            .parse()
            .map_err(|_| invalid("end is not an integer"))?;
        if start < 1 || end < start {
            return Err(invalid("start must be positive and not larger than end").into());
        }
        let strand = record[6]
            .chars()
            .next()
            .and_then(|c| Strand::from_char(&c).ok())
            .ok_or_else(|| invalid("strand must be '+', '-' or '.'"))?;

        let attributes: Vec<(&str, &str)> = ATTRIBUTE_RE
            .captures_iter(&record[8])
            .filter_map(|caps| {
                Some((
                    caps.name("key")?.as_str(),
                    caps.name("value")?.as_str(),
                ))
            })
            .collect();
        let gene_id = first_attribute(&attributes, gtf_features.gene_id())
            .ok_or_else(|| invalid("missing gene identifier attribute"))?;
        let gene_name = first_attribute(&attributes, gtf_features.gene_name()).map(|name| name.to_owned());

        features.push(Feature::new(
            GeneId::from(gene_id),
            gene_name,
            kind,
            record[0].to_owned(),
            strand,
            start - 1,
            end - 1,
        ));
    }

    Ok(features)
}
