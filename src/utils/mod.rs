// Copyright 2024 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

use itertools::Itertools;

pub(crate) mod genomics;

pub(crate) use genomics::{normalize_contig, same_contig};

/// Split a comma- or whitespace-separated list, dropping empty items.
pub(crate) fn split_list(list: &str) -> Vec<&str> {
    list.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|item| !item.is_empty())
        .collect_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_list() {
        assert_eq!(split_list("hairpin, read_through"), vec!["hairpin", "read_through"]);
        assert_eq!(split_list("1 2,,X"), vec!["1", "2", "X"]);
        assert!(split_list("").is_empty());
    }
}
