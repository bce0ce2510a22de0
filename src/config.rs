//! Description of one benchmark run, as given on the command line.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::embedding::{CommandEmbedder, EmbedderT, PrecomputedEmbedder};
use crate::error::BenchError;
use crate::validation::params::{check_ratio, DEFAULT_TEST_RATIO};

/// default embedding dimension
pub const DEFAULT_DIMENSION: usize = 100;

/// The downstream task run after embedding
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Task {
    /// embed the whole graph and fit a link predictor on it, no evaluation
    None,
    LinkPrediction,
    NodeClassification,
}

impl Task {
    pub fn as_str(&self) -> &'static str {
        match self {
            Task::None => "none",
            Task::LinkPrediction => "link-prediction",
            Task::NodeClassification => "node-classification",
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Task {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Task::None),
            "link-prediction" => Ok(Task::LinkPrediction),
            "node-classification" => Ok(Task::NodeClassification),
            _ => Err(BenchError::InvalidTaskConfiguration(format!(
                "unknown task {}, expecting none, link-prediction or node-classification",
                s
            ))),
        }
    }
}

/// Where embeddings come from
#[derive(Clone, Debug, PartialEq)]
pub enum EmbeddingSource {
    /// command template run on the graph file, see [CommandEmbedder]
    Command(String),
    /// an existing embedding file
    File(PathBuf),
}

/// All parameters of a run.
#[derive(Clone, Debug)]
pub struct BenchConfig {
    /// graph edge list
    pub input: PathBuf,
    /// embedding file produced
    pub output: PathBuf,
    pub task: Task,
    /// name of the embedding method
    pub method: String,
    pub dimension: usize,
    pub test_ratio: f64,
    pub seed: u64,
    pub weighted: bool,
    pub directed: bool,
    pub label_file: Option<PathBuf>,
    /// file where result records are appended
    pub result_file: Option<PathBuf>,
    pub training_edgelist: Option<PathBuf>,
    pub testing_edgelist: Option<PathBuf>,
    pub embedding_source: Option<EmbeddingSource>,
    /// where the fitted classifier is dumped
    pub save_model: Option<PathBuf>,
} // end of BenchConfig

impl BenchConfig {
    /// a config with default values for all optional parameters
    pub fn new(input: PathBuf, output: PathBuf, task: Task, method: &str) -> Self {
        BenchConfig {
            input,
            output,
            task,
            method: method.to_string(),
            dimension: DEFAULT_DIMENSION,
            test_ratio: DEFAULT_TEST_RATIO,
            seed: 0,
            weighted: false,
            directed: false,
            label_file: None,
            result_file: None,
            training_edgelist: None,
            testing_edgelist: None,
            embedding_source: None,
            save_model: None,
        }
    }

    /// checks the coherence of parameters before anything is run
    pub fn validate(&self) -> Result<(), BenchError> {
        check_ratio(self.test_ratio)?;
        if self.task == Task::NodeClassification && self.label_file.is_none() {
            log::error!("node classification asked without label file");
            return Err(BenchError::InvalidTaskConfiguration(
                "node classification needs a label file".to_string(),
            ));
        }
        if self.training_edgelist.is_some() != self.testing_edgelist.is_some() {
            log::error!("training and testing edge lists must be given together");
            return Err(BenchError::InvalidTaskConfiguration(
                "training and testing edge lists must be given together".to_string(),
            ));
        }
        if self.embedding_source.is_none() {
            log::error!("no embedding command and no embedding file");
            return Err(BenchError::InvalidTaskConfiguration(
                "an embedding command or an embedding file is needed".to_string(),
            ));
        }
        if self.dimension == 0 {
            return Err(BenchError::InvalidTaskConfiguration("dimension must be positive".to_string()));
        }
        Ok(())
    } // end of validate

    /// true if train and test edges are supplied instead of split randomly
    pub fn has_edge_lists(&self) -> bool {
        self.training_edgelist.is_some() && self.testing_edgelist.is_some()
    }

    /// builds the embedding collaborator. A command embedder writes its result in output.
    pub fn make_embedder(&self) -> Result<Box<dyn EmbedderT>, BenchError> {
        match &self.embedding_source {
            Some(EmbeddingSource::Command(template)) => Ok(Box::new(CommandEmbedder::new(
                template,
                &self.method,
                self.dimension,
                self.seed,
                self.output.clone(),
            ))),
            Some(EmbeddingSource::File(path)) => {
                if self.task == Task::LinkPrediction && !self.has_edge_lists() {
                    log::warn!(
                        "precomputed embedding {:?} was not trained on the random train graph, held out edges may have been seen",
                        path
                    );
                }
                Ok(Box::new(PrecomputedEmbedder::new(path.clone())))
            }
            None => Err(BenchError::InvalidTaskConfiguration(
                "an embedding command or an embedding file is needed".to_string(),
            )),
        }
    } // end of make_embedder

    /// where the link prediction train graph is materialized, next to the output embedding
    pub fn train_graph_path(&self) -> PathBuf {
        let dir = self.output.parent().unwrap_or_else(|| Path::new(""));
        let stem = self
            .input
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "graph".to_string());
        dir.join(format!("{}_train_{}.edgelist", stem, self.seed))
    }
} // end of impl BenchConfig

#[cfg(test)]
mod tests {

    use super::*;

    fn config(task: Task) -> BenchConfig {
        let mut config = BenchConfig::new(
            PathBuf::from("data/graph.edgelist"),
            PathBuf::from("out/embedding.txt"),
            task,
            "Laplacian",
        );
        config.embedding_source = Some(EmbeddingSource::File(PathBuf::from("embedding.txt")));
        config
    }

    #[test]
    fn test_task_parse() {
        assert_eq!("link-prediction".parse::<Task>().unwrap(), Task::LinkPrediction);
        assert_eq!(Task::NodeClassification.to_string(), "node-classification");
        assert!(matches!(
            "clustering".parse::<Task>(),
            Err(BenchError::InvalidTaskConfiguration(_))
        ));
    }

    #[test]
    fn test_validate() {
        assert!(config(Task::LinkPrediction).validate().is_ok());
        // node classification without labels
        let mut bad = config(Task::NodeClassification);
        assert!(matches!(bad.validate(), Err(BenchError::InvalidTaskConfiguration(_))));
        bad.label_file = Some(PathBuf::from("labels.txt"));
        assert!(bad.validate().is_ok());
        // ratio
        let mut bad = config(Task::LinkPrediction);
        bad.test_ratio = 1.5;
        assert!(bad.validate().is_err());
        // only one edge list
        let mut bad = config(Task::LinkPrediction);
        bad.training_edgelist = Some(PathBuf::from("train.txt"));
        assert!(bad.validate().is_err());
        bad.testing_edgelist = Some(PathBuf::from("test.txt"));
        assert!(bad.validate().is_ok());
        // no embedding
        let mut bad = config(Task::None);
        bad.embedding_source = None;
        assert!(bad.validate().is_err());
        assert!(bad.make_embedder().is_err());
    }

    #[test]
    fn test_train_graph_path() {
        let mut config = config(Task::LinkPrediction);
        config.seed = 4;
        assert_eq!(config.train_graph_path(), PathBuf::from("out/graph_train_4.edgelist"));
    }
} // end of mod tests
