// Copyright 2024 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

#[macro_use]
extern crate log;
#[macro_use]
extern crate serde_derive;
#[macro_use]
extern crate derive_new;
#[macro_use]
extern crate getset;
#[macro_use]
extern crate strum_macros;
#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate derefable;

pub mod alignment;
pub mod annotation;
pub mod candidate;
pub mod cli;
pub mod config;
pub mod errors;
pub mod filtration;
pub mod io;
pub(crate) mod utils;

pub use crate::alignment::AlignmentRecord;
pub use crate::annotation::{AnnotationIndex, Feature, GeneSet};
pub use crate::candidate::{Candidate, ChimericAlignments, Verdict};
pub use crate::config::FiltrationConfig;
pub use crate::filtration::{FilterTag, Filtration};
