//! Assembles feature matrices from embedded vectors.
//!
//! An edge (u,v) is represented by the Hadamard (element wise) product of the vectors of u and v,
//! so (u,v) and (v,u) get the same features. A node is represented by its vector.

use ndarray::{Array1, Array2};

use crate::embedding::EmbeddingTable;
use crate::error::BenchError;
use crate::graph::NodeId;

/// Hadamard product of the vectors of both nodes
pub fn edge_feature(embeddings: &EmbeddingTable, node1: &str, node2: &str) -> Result<Array1<f64>, BenchError> {
    let v1 = embeddings.get_embedded_node(node1)?;
    let v2 = embeddings.get_embedded_node(node2)?;
    Ok(&v1 * &v2)
}

/// Features and labels for positive and negative edges. Rows are positive edges first (label 1)
/// then negative edges (label 0).
pub fn edge_features(
    embeddings: &EmbeddingTable,
    positive: &[(NodeId, NodeId)],
    negative: &[(NodeId, NodeId)],
) -> Result<(Array2<f64>, Array1<u8>), BenchError> {
    let nb_rows = positive.len() + negative.len();
    let mut features = Array2::<f64>::zeros((nb_rows, embeddings.get_dimension()));
    let mut labels = Array1::<u8>::zeros(nb_rows);
    let edges = positive.iter().map(|e| (e, 1u8)).chain(negative.iter().map(|e| (e, 0u8)));
    for (row, ((node1, node2), label)) in edges.enumerate() {
        features.row_mut(row).assign(&edge_feature(embeddings, node1, node2)?);
        labels[row] = label;
    }
    log::debug!(
        "edge features : {} positive, {} negative, dimension {}",
        positive.len(),
        negative.len(),
        embeddings.get_dimension()
    );
    Ok((features, labels))
} // end of edge_features

/// rows of the embedding of nodes, in order
pub fn node_features(embeddings: &EmbeddingTable, nodes: &[NodeId]) -> Result<Array2<f64>, BenchError> {
    let mut features = Array2::<f64>::zeros((nodes.len(), embeddings.get_dimension()));
    for (row, node) in nodes.iter().enumerate() {
        features.row_mut(row).assign(&embeddings.get_embedded_node(node)?);
    }
    Ok(features)
}

// end of mod tests
