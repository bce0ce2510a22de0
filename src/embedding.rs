//! Describes the embedded vectors and the embedding training collaborator.
//!
//! Embedded vectors are stored in an Array2\<f64\>, each row corresponds to a node.
//! The association between a node id and its row is given by an IndexSet (the node indexation):
//! given a node id we get its rank with IndexSet::get_index_of,
//! given a rank we get the original node id with IndexSet::get_index.
//!
//! No embedding algorithm is implemented here. Embeddings are produced by an external program
//! (spectral, factorization, random walk or autoencoder methods) driven through the trait [EmbedderT],
//! or reloaded from a previous dump.

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::anyhow;
use indexmap::IndexSet;
use ndarray::{Array2, ArrayView1};

use crate::error::BenchError;
use crate::graph::NodeId;
use crate::io::embeddedbson::bson_load;
use crate::io::embedtxt::text_load;

/// The embedding table: a fixed length f64 vector for each node id.
#[derive(Clone, Debug)]
pub struct EmbeddingTable {
    /// association of node id to a rank (row in data)
    nodeindexation: IndexSet<NodeId>,
    /// array (n,d) with n number of nodes, d dimension of embedding
    data: Array2<f64>,
} // end of EmbeddingTable

impl EmbeddingTable {
    /// nodeindexation must have as many entries as data has rows
    pub fn new(nodeindexation: IndexSet<NodeId>, data: Array2<f64>) -> Result<Self, BenchError> {
        if nodeindexation.len() != data.nrows() {
            log::error!(
                "embedding table with {} node ids and {} vectors",
                nodeindexation.len(),
                data.nrows()
            );
            return Err(BenchError::DimensionMismatch {
                expected: nodeindexation.len(),
                got: data.nrows(),
            });
        }
        Ok(EmbeddingTable {
            nodeindexation,
            data,
        })
    } // end of new

    /// builds a table from (node, vector) couples. All vectors must have the same length.
    /// If a node appears twice the last vector is kept.
    pub fn from_rows<I>(rows: I) -> Result<Self, BenchError>
    where
        I: IntoIterator<Item = (NodeId, Vec<f64>)>,
    {
        let mut nodeindexation = IndexSet::<NodeId>::new();
        let mut values = Vec::<f64>::new();
        let mut dim: Option<usize> = None;
        for (node, vector) in rows {
            let expected = *dim.get_or_insert(vector.len());
            if vector.len() != expected {
                log::error!("node {} has vector of length {}, expected {}", node, vector.len(), expected);
                return Err(BenchError::DimensionMismatch {
                    expected,
                    got: vector.len(),
                });
            }
            let (rank, inserted) = nodeindexation.insert_full(node);
            if inserted {
                values.extend_from_slice(&vector);
            } else {
                log::warn!("node {} has more than one vector, keeping last", nodeindexation[rank]);
                values[rank * expected..(rank + 1) * expected].copy_from_slice(&vector);
            }
        }
        let dim = dim.unwrap_or(0);
        let nb_values = values.len();
        let data = Array2::from_shape_vec((nodeindexation.len(), dim), values).map_err(|_| {
            BenchError::DimensionMismatch {
                expected: nodeindexation.len() * dim,
                got: nb_values,
            }
        })?;
        Ok(EmbeddingTable {
            nodeindexation,
            data,
        })
    } // end of from_rows

    /// get dimension of vectors
    pub fn get_dimension(&self) -> usize {
        self.data.ncols()
    }

    /// get number of nodes embedded
    pub fn get_nb_nodes(&self) -> usize {
        self.data.nrows()
    }

    /// to retrieve the indexation
    pub fn get_node_indexation(&self) -> &IndexSet<NodeId> {
        &self.nodeindexation
    }

    /// the whole array of embedded vectors
    pub fn get_embedded(&self) -> &Array2<f64> {
        &self.data
    }

    /// get rank of a node id
    pub fn get_node_rank(&self, node: &str) -> Option<usize> {
        self.nodeindexation.get_index_of(node)
    }

    /// get vector of a node given its rank
    pub fn get_embedded_rank(&self, rank: usize) -> ArrayView1<f64> {
        self.data.row(rank)
    }

    /// get vector of a node, fails with [BenchError::MissingEmbedding] if node was not embedded
    pub fn get_embedded_node(&self, node: &str) -> Result<ArrayView1<f64>, BenchError> {
        match self.nodeindexation.get_index_of(node) {
            Some(rank) => Ok(self.data.row(rank)),
            None => {
                log::error!("no embedding for node {}", node);
                Err(BenchError::MissingEmbedding(node.to_string()))
            }
        }
    }
} // end of impl EmbeddingTable

//==============================================================================

/// The embedding training collaborator.
/// Given the file of a (train) graph edge list, produces the embedding table of its nodes.
pub trait EmbedderT {
    fn embed(&mut self, graph_file: &Path) -> Result<EmbeddingTable, anyhow::Error>;
} // end of trait EmbedderT

/// loads an embedding file, bson dump if extension is bson, text format otherwise
pub fn load_embedding(path: &Path) -> Result<EmbeddingTable, anyhow::Error> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("bson") => bson_load(path),
        _ => text_load(path),
    }
} // end of load_embedding

/// Runs an external embedding program.
///
/// The command template is run through `sh -c` after substitution of the placeholders
/// `{input}` (graph edge list), `{output}` (embedding file to produce), `{method}`, `{dim}` and `{seed}`.
/// Example : `python -m mytool --method {method} --input {input} --output {output} --dimensions {dim}`
pub struct CommandEmbedder {
    /// the command template
    template: String,
    /// name of the embedding method, passed to the command
    method: String,
    /// embedding dimension asked for
    dimension: usize,
    ///
    seed: u64,
    /// where the command writes its embedding
    output: PathBuf,
} // end of CommandEmbedder

impl CommandEmbedder {
    pub fn new(template: &str, method: &str, dimension: usize, seed: u64, output: PathBuf) -> Self {
        CommandEmbedder {
            template: template.to_string(),
            method: method.to_string(),
            dimension,
            seed,
            output,
        }
    }

    /// returns the command line that will be run for a given graph file
    pub fn command_line(&self, graph_file: &Path) -> String {
        self.template
            .replace("{input}", &graph_file.display().to_string())
            .replace("{output}", &self.output.display().to_string())
            .replace("{method}", &self.method)
            .replace("{dim}", &self.dimension.to_string())
            .replace("{seed}", &self.seed.to_string())
    }

    pub fn get_output(&self) -> &Path {
        &self.output
    }
} // end of impl CommandEmbedder

impl EmbedderT for CommandEmbedder {
    fn embed(&mut self, graph_file: &Path) -> Result<EmbeddingTable, anyhow::Error> {
        let command_line = self.command_line(graph_file);
        log::info!("running embedding command : {}", command_line);
        let status = Command::new("sh").arg("-c").arg(&command_line).status()?;
        if !status.success() {
            log::error!("embedding command failed with status {}", status);
            return Err(anyhow!("embedding command {:?} failed : {}", command_line, status));
        }
        let table = load_embedding(&self.output)?;
        log::info!(
            "embedding method {} produced {} vectors of dimension {}",
            self.method,
            table.get_nb_nodes(),
            table.get_dimension()
        );
        Ok(table)
    }
} // end of impl EmbedderT for CommandEmbedder

/// An embedding already computed, the graph file is ignored.
pub struct PrecomputedEmbedder {
    path: PathBuf,
}

impl PrecomputedEmbedder {
    pub fn new(path: PathBuf) -> Self {
        PrecomputedEmbedder { path }
    }
}

impl EmbedderT for PrecomputedEmbedder {
    fn embed(&mut self, graph_file: &Path) -> Result<EmbeddingTable, anyhow::Error> {
        log::info!(
            "using precomputed embedding {:?} for graph {:?}",
            self.path,
            graph_file
        );
        load_embedding(&self.path)
    }
}

//==============================================================================

// end of mod tests
