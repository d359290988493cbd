// Copyright 2024 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Gene and exon annotation, indexed per contig for overlap queries.

use std::collections::{HashMap, HashSet};
use std::iter::FromIterator;

use bio::data_structures::interval_tree::ArrayBackedIntervalTree;
use bio_types::strand::Strand;
use itertools::Itertools;

use crate::utils::normalize_contig;

pub mod gtf;

pub use gtf::GtfFeatures;

#[derive(
    Derefable, PartialEq, Eq, PartialOrd, Ord, Debug, Clone, Hash, Serialize, Deserialize,
)]
pub struct GeneId(#[deref] String);

impl From<&str> for GeneId {
    fn from(id: &str) -> Self {
        GeneId(id.to_owned())
    }
}

impl From<String> for GeneId {
    fn from(id: String) -> Self {
        GeneId(id)
    }
}

#[derive(Display, Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum FeatureKind {
    Gene,
    Exon,
}

/// A gene or exon of the annotation. Coordinates are 0-based and inclusive.
#[derive(new, Getters, CopyGetters, Debug, Clone, PartialEq)]
pub struct Feature {
    #[getset(get = "pub")]
    gene_id: GeneId,
    #[getset(get = "pub")]
    gene_name: Option<String>,
    #[getset(get_copy = "pub")]
    kind: FeatureKind,
    #[getset(get = "pub")]
    contig: String,
    #[getset(get_copy = "pub")]
    strand: Strand,
    #[getset(get_copy = "pub")]
    start: i64,
    #[getset(get_copy = "pub")]
    end: i64,
}

impl Feature {
    pub fn contains(&self, pos: i64) -> bool {
        self.start <= pos && pos <= self.end
    }
}

/// Unordered set of gene identifiers.
#[derive(Derefable, Default, Debug, Clone, PartialEq, Eq)]
pub struct GeneSet(#[deref] HashSet<GeneId>);

impl GeneSet {
    /// Genes occurring in both sets.
    pub fn intersect(&self, other: &GeneSet) -> GeneSet {
        self.0.intersection(&other.0).cloned().collect()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.0.iter().map(|id| id.as_str()).sorted().collect()
    }
}

impl FromIterator<GeneId> for GeneSet {
    fn from_iter<I: IntoIterator<Item = GeneId>>(iter: I) -> Self {
        GeneSet(iter.into_iter().collect())
    }
}

/// Interval index over gene and exon features.
///
/// Each contig gets its own array backed interval tree, holding indices into the
/// feature vector. Contig names are normalized, such that `chr1` and `1` are
/// the same contig. Duplicate features are retained and reported as often as they
/// were given; use `gene_set` for a de-duplicated view.
#[derive(Default)]
pub struct AnnotationIndex {
    features: Vec<Feature>,
    trees: HashMap<String, ArrayBackedIntervalTree<i64, usize>>,
}

impl AnnotationIndex {
    pub fn new(features: Vec<Feature>) -> Self {
        let mut trees: HashMap<String, ArrayBackedIntervalTree<i64, usize>> = HashMap::new();
        for (i, feature) in features.iter().enumerate() {
            if feature.end < feature.start {
                warn!(
                    "Skipping feature of gene {} with inverted interval {}:{}-{}.",
                    *feature.gene_id, feature.contig, feature.start, feature.end
                );
                continue;
            }
            trees
                .entry(normalize_contig(&feature.contig).to_owned())
                .or_insert_with(ArrayBackedIntervalTree::new)
                .insert(feature.start..feature.end.saturating_add(1), i);
        }
        // sorts the entries and computes the implicit tree
        for tree in trees.values_mut() {
            tree.index();
        }

        let index = AnnotationIndex { features, trees };
        info!(
            "Indexed {} features on contigs {}.",
            index.len(),
            index.contigs().sorted().join(", ")
        );
        index
    }

    /// All features intersecting the inclusive interval `[start, end]` on the given contig.
    ///
    /// Unknown contigs and inverted intervals yield an empty result.
    pub fn overlapping_genes(&self, contig: &str, start: i64, end: i64) -> Vec<&Feature> {
        if end < start {
            return Vec::new();
        }
        match self.trees.get(normalize_contig(contig)) {
            Some(tree) => tree
                .find(start..end.saturating_add(1))
                .into_iter()
                .map(|entry| &self.features[*entry.data()])
                .sorted_by_key(|feature| (feature.start, feature.end))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Identifiers of the genes intersecting the inclusive interval `[start, end]`.
    pub fn gene_set(&self, contig: &str, start: i64, end: i64) -> GeneSet {
        self.overlapping_genes(contig, start, end)
            .into_iter()
            .map(|feature| feature.gene_id.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Normalized names of the contigs holding at least one feature.
    pub fn contigs(&self) -> impl Iterator<Item = &str> {
        self.trees.keys().map(|contig| contig.as_str())
    }
}
