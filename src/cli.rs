// Copyright 2024 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use derive_builder::Builder;
use structopt::StructOpt;
use strum::IntoEnumIterator;

use crate::annotation::gtf::{self, GtfFeatures};
use crate::annotation::AnnotationIndex;
use crate::config::FiltrationConfig;
use crate::filtration::{FilterTag, Filtration};
use crate::io as candidate_io;

#[derive(Debug, StructOpt, Clone)]
#[structopt(
    name = "fusionsieve",
    about = "Artifact filtering for chimeric alignments supporting gene fusion candidates.",
    setting = structopt::clap::AppSettings::ColoredHelp,
)]
pub enum FusionSieve {
    #[structopt(
        name = "filter",
        about = "Discard fusion candidates that are likely artifacts. Writes a TSV with the verdict per candidate.",
        setting = structopt::clap::AppSettings::ColoredHelp,
    )]
    Filter {
        #[structopt(
            long,
            parse(from_os_str),
            help = "GTF file with gene and exon annotation."
        )]
        annotation: PathBuf,
        #[structopt(
            long,
            parse(from_os_str),
            help = "Candidates to filter, as JSON (.json) or YAML (.yaml, .yml)."
        )]
        candidates: PathBuf,
        #[structopt(
            long,
            parse(from_os_str),
            help = "YAML file enabling or disabling filters and setting their parameters."
        )]
        config: Option<PathBuf>,
        #[structopt(
            long = "disable-filters",
            help = "Comma-separated list of filters to disable (see list-filters)."
        )]
        disable_filters: Option<String>,
        #[structopt(
            long = "gtf-features",
            help = "GTF attributes and feature types to use, e.g. \
                    'gene_id=gene_id gene_name=gene_name|gene_id feature_gene=gene feature_exon=exon'."
        )]
        gtf_features: Option<GtfFeatures>,
        #[structopt(
            long,
            parse(from_os_str),
            help = "TSV file to write verdicts to (if omitted, write to STDOUT)."
        )]
        output: Option<PathBuf>,
        #[structopt(long, short = "t", default_value = "1", help = "Number of threads to use.")]
        threads: usize,
        #[structopt(long, short = "v", help = "Log debug messages.")]
        verbose: bool,
    },
    #[structopt(name = "list-filters", about = "List all available filters in evaluation order.")]
    ListFilters,
}

impl FusionSieve {
    pub fn verbose(&self) -> bool {
        match self {
            FusionSieve::Filter { verbose, .. } => *verbose,
            FusionSieve::ListFilters => false,
        }
    }
}

/// One filtering run from annotation and candidate files to verdicts.
#[derive(Builder)]
#[builder(pattern = "owned")]
pub struct FilterRun {
    annotation: PathBuf,
    candidates: PathBuf,
    #[builder(default)]
    config: FiltrationConfig,
    #[builder(default)]
    gtf_features: GtfFeatures,
    #[builder(default)]
    output: Option<PathBuf>,
    #[builder(default = "1")]
    threads: usize,
}

impl FilterRunBuilder {
    /// Load the filter configuration from the given YAML file.
    pub fn config_path<P: AsRef<Path>>(self, path: P) -> Result<Self> {
        Ok(self.config(FiltrationConfig::from_path(path)?))
    }
}

impl FilterRun {
    /// Filter all candidates and write their verdicts. Returns the number of
    /// remaining candidates. A single thread filters sequentially with progress
    /// reporting, more threads use a dedicated rayon pool.
    pub fn run(&self) -> Result<usize> {
        let filtration = Filtration::new(&self.config)?;
        let annotation = AnnotationIndex::new(gtf::read_features(
            &self.annotation,
            &self.gtf_features,
        )?);
        let mut candidates = candidate_io::read_candidates(&self.candidates, &annotation)?;

        let remaining = if self.threads <= 1 {
            filtration.run(&mut candidates, &annotation)
        } else {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.threads)
                .build()?;
            pool.install(|| filtration.run_parallel(&mut candidates, &annotation))
        };
        debug!(
            "Remaining candidates: {}",
            candidate_io::remaining_names(&candidates).join(", ")
        );

        match self.output {
            Some(ref path) => candidate_io::write_verdicts(
                File::create(path)
                    .with_context(|| format!("unable to create output {}", path.display()))?,
                &candidates,
            )?,
            None => candidate_io::write_verdicts(io::stdout(), &candidates)?,
        }
        Ok(remaining)
    }
}

pub fn run(opt: FusionSieve) -> Result<()> {
    match opt {
        FusionSieve::Filter {
            annotation,
            candidates,
            config,
            disable_filters,
            gtf_features,
            output,
            threads,
            ..
        } => {
            let mut builder = FilterRunBuilder::default()
                .annotation(annotation)
                .candidates(candidates)
                .output(output)
                .threads(threads)
                .gtf_features(gtf_features.unwrap_or_default());
            let mut filter_config = match config {
                Some(path) => FiltrationConfig::from_path(path)?,
                None => FiltrationConfig::default(),
            };
            if let Some(list) = disable_filters {
                filter_config.disable(&list)?;
            }
            builder = builder.config(filter_config);
            builder.build()?.run()?;
        }
        FusionSieve::ListFilters => {
            for tag in FilterTag::iter() {
                println!("{}", tag);
            }
        }
    }
    Ok(())
}
