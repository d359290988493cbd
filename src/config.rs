// Copyright 2024 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

use std::collections::BTreeMap;
use std::convert::TryFrom;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use itertools::Itertools;
use strum::IntoEnumIterator;

use crate::errors::Error;
use crate::filtration::FilterTag;
use crate::utils;

fn default_max_mate_gap() -> u64 {
    200
}

fn default_min_read_through_distance() -> u64 {
    10000
}

fn default_interesting_contigs() -> Vec<String> {
    (1..=22)
        .map(|i| i.to_string())
        .chain(vec!["X".to_owned(), "Y".to_owned()])
        .collect()
}

#[derive(Deserialize, CopyGetters, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
#[getset(get_copy = "pub")]
pub struct HairpinConfig {
    /// Maximum gap between mates. Accepted for compatibility, does not affect the filter.
    #[serde(default = "default_max_mate_gap")]
    max_mate_gap: u64,
}

impl Default for HairpinConfig {
    fn default() -> Self {
        HairpinConfig {
            max_mate_gap: default_max_mate_gap(),
        }
    }
}

#[derive(Deserialize, CopyGetters, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
#[getset(get_copy = "pub")]
pub struct ReadThroughConfig {
    #[serde(default = "default_min_read_through_distance")]
    min_distance: u64,
}

impl Default for ReadThroughConfig {
    fn default() -> Self {
        ReadThroughConfig {
            min_distance: default_min_read_through_distance(),
        }
    }
}

#[derive(Deserialize, Getters, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
#[getset(get = "pub")]
pub struct UninterestingContigsConfig {
    #[serde(default = "default_interesting_contigs")]
    interesting_contigs: Vec<String>,
}

impl Default for UninterestingContigsConfig {
    fn default() -> Self {
        UninterestingContigsConfig {
            interesting_contigs: default_interesting_contigs(),
        }
    }
}

/// Which filters run, and their thresholds.
///
/// Filters not mentioned under `filters` are enabled.
#[derive(Deserialize, Getters, Default, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
#[getset(get = "pub")]
pub struct FiltrationConfig {
    #[serde(default)]
    filters: BTreeMap<String, bool>,
    #[serde(default)]
    hairpin: HairpinConfig,
    #[serde(default)]
    read_through: ReadThroughConfig,
    #[serde(default)]
    uninteresting_contigs: UninterestingContigsConfig,
}

impl FiltrationConfig {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let yaml = fs::read_to_string(path.as_ref()).with_context(|| {
            format!("unable to read filter configuration {}", path.as_ref().display())
        })?;
        let config = FiltrationConfig::try_from(yaml.as_str()).with_context(|| {
            format!("invalid filter configuration {}", path.as_ref().display())
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Ensure that all filter names refer to registered filters.
    pub fn validate(&self) -> Result<(), Error> {
        for name in self.filters.keys() {
            parse_filter_name(name)?;
        }
        Ok(())
    }

    pub fn is_enabled(&self, tag: FilterTag) -> bool {
        let name: &'static str = tag.into();
        self.filters.get(name).copied().unwrap_or(true)
    }

    pub fn set_enabled(&mut self, tag: FilterTag, enabled: bool) {
        let name: &'static str = tag.into();
        self.filters.insert(name.to_owned(), enabled);
    }

    /// Disable the filters given as comma- or whitespace-separated list.
    pub fn disable(&mut self, list: &str) -> Result<(), Error> {
        for name in utils::split_list(list) {
            let tag = parse_filter_name(name)?;
            self.set_enabled(tag, false);
        }
        Ok(())
    }
}

impl<'a> TryFrom<&'a str> for FiltrationConfig {
    type Error = serde_yaml::Error;

    fn try_from(yaml: &str) -> Result<Self, Self::Error> {
        serde_yaml::from_str(yaml)
    }
}

fn parse_filter_name(name: &str) -> Result<FilterTag, Error> {
    FilterTag::from_str(name).map_err(|_| Error::UnknownFilter {
        name: name.to_owned(),
        valid: FilterTag::iter().join(", "),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FiltrationConfig::default();
        assert!(FilterTag::iter().all(|tag| config.is_enabled(tag)));
        assert_eq!(config.hairpin().max_mate_gap(), 200);
        assert_eq!(config.read_through().min_distance(), 10000);
        assert_eq!(config.uninteresting_contigs().interesting_contigs().len(), 24);
    }

    #[test]
    fn test_parse_yaml() {
        let config = FiltrationConfig::try_from(
            "filters:\n  read_through: false\nhairpin:\n  max_mate_gap: 500\n",
        )
        .unwrap();
        config.validate().unwrap();
        assert!(config.is_enabled(FilterTag::Hairpin));
        assert!(!config.is_enabled(FilterTag::ReadThrough));
        assert_eq!(config.hairpin().max_mate_gap(), 500);
        assert_eq!(config.read_through().min_distance(), 10000);
    }

    #[test]
    fn test_empty_yaml() {
        let config = FiltrationConfig::try_from("{}").unwrap();
        assert_eq!(config, FiltrationConfig::default());
    }

    #[test]
    fn test_unknown_filter() {
        let config = FiltrationConfig::try_from("filters:\n  hairpins: false\n").unwrap();
        match config.validate() {
            Err(Error::UnknownFilter { name, valid }) => {
                assert_eq!(name, "hairpins");
                assert_eq!(valid, "uninteresting_contigs, hairpin, read_through");
            }
            res => panic!("expected unknown filter error, got {:?}", res),
        }
    }

    #[test]
    fn test_unknown_section() {
        assert!(FiltrationConfig::try_from("mismatches:\n  pvalue: 0.01\n").is_err());
    }

    #[test]
    fn test_disable() {
        let mut config = FiltrationConfig::default();
        config.disable("hairpin, uninteresting_contigs").unwrap();
        assert!(!config.is_enabled(FilterTag::Hairpin));
        assert!(!config.is_enabled(FilterTag::UninterestingContigs));
        assert!(config.is_enabled(FilterTag::ReadThrough));
        assert!(config.disable("blacklist").is_err());
    }
}
