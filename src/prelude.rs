//! To ease access to most frequently items
//!

pub use crate::io::{csv::*, embeddedbson::*, embedtxt::*, model::*, output::*, results::*};

pub use crate::embedding::*;
pub use crate::error::BenchError;
pub use crate::graph::*;

pub use crate::classifier::binarizer::MultiLabelBinarizer;
pub use crate::classifier::logistic::{LogisticParams, LogisticRegression};
pub use crate::classifier::onevsrest::OneVsRestLogistic;
pub use crate::classifier::{BinaryClassifier, MultiLabelClassifier};

pub use crate::validation::link::*;
pub use crate::validation::nodelabel::*;
pub use crate::validation::params::*;
pub use crate::validation::split::*;

pub use crate::config::*;
