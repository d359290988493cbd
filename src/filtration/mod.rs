// Copyright 2024 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Artifact filters for fusion candidates and the pipeline running them.

use std::time::Duration;

use anyhow::Result;
use itertools::Itertools;
use progress_logger::ProgressLogger;
use rayon::prelude::*;
use strum::IntoEnumIterator;

use crate::annotation::AnnotationIndex;
use crate::candidate::{Candidate, Verdict};
use crate::config::FiltrationConfig;

pub mod hairpin;
pub mod read_through;
pub mod uninteresting_contigs;

pub use hairpin::HairpinFilter;
pub use read_through::ReadThroughFilter;
pub use uninteresting_contigs::UninterestingContigsFilter;

/// Names of the registered filters. Declaration order is evaluation priority.
#[derive(
    Display,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum FilterTag {
    UninterestingContigs,
    Hairpin,
    ReadThrough,
}

impl FilterTag {
    fn instantiate(self, config: &FiltrationConfig) -> Box<dyn Filter> {
        match self {
            FilterTag::UninterestingContigs => Box::new(UninterestingContigsFilter::new(
                config.uninteresting_contigs().interesting_contigs(),
            )),
            FilterTag::Hairpin => Box::new(HairpinFilter::new(config.hairpin().max_mate_gap())),
            FilterTag::ReadThrough => Box::new(ReadThroughFilter::new(
                config.read_through().min_distance(),
            )),
        }
    }
}

/// A criterion identifying artifactual candidates.
pub trait Filter: Send + Sync {
    fn tag(&self) -> FilterTag;

    /// Whether the candidate is an artifact of the kind detected by this filter.
    /// Errors mark the candidate as malformed.
    fn is_artifact(&self, candidate: &Candidate, annotation: &AnnotationIndex) -> Result<bool>;
}

/// Runs an ordered set of filters over fusion candidates.
///
/// Every candidate receives at most one verdict: candidates that already carry one
/// are skipped, and the first filter firing on a candidate decides.
pub struct Filtration {
    filters: Vec<Box<dyn Filter>>,
}

impl Filtration {
    /// Set up all filters enabled in the given configuration, in priority order.
    pub fn new(config: &FiltrationConfig) -> Result<Self> {
        config.validate()?;
        let filters = FilterTag::iter()
            .filter(|tag| config.is_enabled(*tag))
            .map(|tag| tag.instantiate(config))
            .collect_vec();
        let filtration = Filtration::with_filters(filters);
        info!(
            "Enabled filters: {}",
            if filtration.filters.is_empty() {
                "none".to_owned()
            } else {
                filtration.tags().iter().join(", ")
            }
        );
        Ok(filtration)
    }

    /// Use the given filters, evaluated in the given order.
    pub fn with_filters(filters: Vec<Box<dyn Filter>>) -> Self {
        Filtration { filters }
    }

    pub fn tags(&self) -> Vec<FilterTag> {
        self.filters.iter().map(|filter| filter.tag()).collect()
    }

    /// Filter a single candidate. Returns whether it remains.
    ///
    /// Candidates with a record that does not resolve to a reference span are
    /// excluded as malformed before anything else.
    /// Candidates whose sides share neither a gene nor a contig are not subject to
    /// filtering and remain without consulting any filter.
    pub fn process(&self, candidate: &mut Candidate, annotation: &AnnotationIndex) -> bool {
        if !candidate.verdict().is_unfiltered() {
            return false;
        }
        let malformed = candidate
            .alignments()
            .records()
            .into_iter()
            .find_map(|(_, record)| record.aligned_span().err());
        if let Some(e) = malformed {
            warn!("Excluding candidate {}: {}", candidate.describe(), e);
            candidate.set_verdict(Verdict::Malformed);
            return false;
        }
        if !candidate.shares_gene_or_contig() {
            debug!(
                "Candidate {} joins distinct contigs without common gene, not filtering.",
                candidate.name()
            );
            return true;
        }

        for filter in &self.filters {
            match filter.is_artifact(candidate, annotation) {
                Ok(true) => {
                    debug!("Candidate {} discarded by filter {}.", candidate.name(), filter.tag());
                    candidate.set_verdict(Verdict::Filtered(filter.tag()));
                    return false;
                }
                Ok(false) => (),
                Err(e) => {
                    warn!("Excluding candidate {}: {}", candidate.describe(), e);
                    candidate.set_verdict(Verdict::Malformed);
                    return false;
                }
            }
        }
        true
    }

    /// Filter all candidates sequentially. Returns the number of remaining candidates.
    pub fn run(&self, candidates: &mut [Candidate], annotation: &AnnotationIndex) -> usize {
        let mut progress_logger = ProgressLogger::builder()
            .with_items_name("candidates")
            .with_frequency(Duration::from_secs(20))
            .start();
        let mut remaining = 0;
        for candidate in candidates.iter_mut() {
            if self.process(candidate, annotation) {
                remaining += 1;
            }
            progress_logger.update(1u64);
        }
        progress_logger.stop();

        log_summary(candidates, remaining);
        remaining
    }

    /// Filter all candidates in parallel. Verdicts and the returned number of remaining
    /// candidates are the same as with `run`.
    pub fn run_parallel(&self, candidates: &mut [Candidate], annotation: &AnnotationIndex) -> usize {
        let remaining = candidates
            .par_iter_mut()
            .map(|candidate| self.process(candidate, annotation) as usize)
            .sum();

        log_summary(candidates, remaining);
        remaining
    }
}

fn log_summary(candidates: &[Candidate], remaining: usize) {
    for (verdict, count) in candidates
        .iter()
        .map(|candidate| candidate.verdict())
        .filter(|verdict| !verdict.is_unfiltered())
        .counts()
        .into_iter()
        .sorted_by_key(|(verdict, _)| verdict.to_string())
    {
        info!("{} candidates with verdict {}.", count, verdict);
    }
    info!(
        "{} of {} candidates remaining after filtering.",
        remaining,
        candidates.len()
    );
}
