//! Transforms label sets into indicator rows.

use std::collections::BTreeSet;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Classes are sorted, column j of the indicator matrix corresponds to classes\[j\].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MultiLabelBinarizer {
    classes: Vec<String>,
}

impl MultiLabelBinarizer {
    pub fn new() -> Self {
        MultiLabelBinarizer { classes: Vec::new() }
    }

    /// registers all labels found in label sets
    pub fn fit(&mut self, label_sets: &[Vec<String>]) -> &mut Self {
        let classes: BTreeSet<&String> = label_sets.iter().flatten().collect();
        self.classes = classes.into_iter().cloned().collect();
        log::debug!("binarizer fitted with {} classes", self.classes.len());
        self
    }

    pub fn get_classes(&self) -> &[String] {
        &self.classes
    }

    /// indicator matrix (label_sets.len(), nb classes). Labels not seen in fit are ignored.
    pub fn transform(&self, label_sets: &[Vec<String>]) -> Array2<u8> {
        let mut indicator = Array2::<u8>::zeros((label_sets.len(), self.classes.len()));
        for (i, labels) in label_sets.iter().enumerate() {
            for label in labels {
                match self.classes.binary_search(label) {
                    Ok(j) => indicator[[i, j]] = 1,
                    Err(_) => log::warn!("unknown label {} ignored", label),
                }
            }
        }
        indicator
    }
} // end of impl MultiLabelBinarizer

#[cfg(test)]
mod tests {

    use super::*;
    use ndarray::array;

    fn sets(raw: &[&[&str]]) -> Vec<Vec<String>> {
        raw.iter()
            .map(|s| s.iter().map(|l| l.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_binarizer() {
        let labels = sets(&[&["b", "a"], &["c"], &[]]);
        let mut binarizer = MultiLabelBinarizer::new();
        binarizer.fit(&labels);
        assert_eq!(binarizer.get_classes(), &["a", "b", "c"]);
        let indicator = binarizer.transform(&labels);
        assert_eq!(indicator, array![[1u8, 1, 0], [0, 0, 1], [0, 0, 0]]);
        // unknown label
        let indicator = binarizer.transform(&sets(&[&["z", "c"]]));
        assert_eq!(indicator, array![[0u8, 0, 1]]);
    }
} // end of mod tests
