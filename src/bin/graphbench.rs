//! an executable to benchmark a graph embedding method
//! example usage:
//! graphbench --input graph.edgelist --output embedding.txt --method DeepWalk --task link-prediction
//!     --embed-cmd "python -m embedtool --method {method} --input {input} --output {output} --dimensions {dim} --seed {seed}"
//! graphbench --input graph.edgelist --output embedding.txt --method Laplacian --task node-classification
//!     --label-file labels.txt --embeddings precomputed.txt --eval-result-file results.json
//!
//! The embedding is produced by the command given with --embed-cmd (placeholders {input}, {output}, {method}, {dim}, {seed}),
//! or read from an existing file given with --embeddings.
//! For link prediction the command is run on the train graph, which is dumped next to the output file and removed afterwards.
//!
//! Logging is driven by RUST_LOG, for example RUST_LOG=info.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::anyhow;
use clap::{arg, Arg, ArgMatches, Command};
use cpu_time::ProcessTime;
use env_logger::Builder;
use petgraph::{Directed, EdgeType, Undirected};

use graphbench::prelude::*;

fn parse_config(matches: &ArgMatches) -> Result<BenchConfig, anyhow::Error> {
    log::debug!("in parse_config");
    let input = match matches.value_of("input") {
        Some(str) => PathBuf::from(str),
        _ => return Err(anyhow!("no input graph")),
    };
    let output = match matches.value_of("output") {
        Some(str) => PathBuf::from(str),
        _ => return Err(anyhow!("no output file")),
    };
    let task = match matches.value_of("task") {
        Some(str) => str.parse::<Task>()?,
        _ => Task::None,
    };
    let method = matches.value_of("method").unwrap_or("unknown");
    let mut config = BenchConfig::new(input, output, task, method);
    //
    if let Some(str) = matches.value_of("dimensions") {
        config.dimension = str
            .parse::<usize>()
            .map_err(|_| anyhow!("could not parse dimensions {}", str))?;
    }
    if let Some(str) = matches.value_of("testingratio") {
        config.test_ratio = str
            .parse::<f64>()
            .map_err(|_| anyhow!("could not parse testing ratio {}", str))?;
    }
    if let Some(str) = matches.value_of("seed") {
        config.seed = str
            .parse::<u64>()
            .map_err(|_| anyhow!("could not parse seed {}", str))?;
    }
    config.weighted = matches.is_present("weighted");
    config.directed = matches.is_present("directed");
    config.label_file = matches.value_of("label-file").map(PathBuf::from);
    config.result_file = matches.value_of("eval-result-file").map(PathBuf::from);
    config.training_edgelist = matches.value_of("training-edgelist").map(PathBuf::from);
    config.testing_edgelist = matches.value_of("testing-edgelist").map(PathBuf::from);
    config.save_model = matches.value_of("save-model").map(PathBuf::from);
    // a precomputed embedding wins over a command
    config.embedding_source = match (matches.value_of("embeddings"), matches.value_of("embed-cmd")) {
        (Some(path), cmd) => {
            if cmd.is_some() {
                log::warn!("both --embeddings and --embed-cmd given, using embeddings file {}", path);
            }
            Some(EmbeddingSource::File(PathBuf::from(path)))
        }
        (None, Some(cmd)) => Some(EmbeddingSource::Command(cmd.to_string())),
        (None, None) => None,
    };
    Ok(config)
} // end of parse_config

// embeds graph_file, with timing. A precomputed embedding is copied to output.
fn embed_graph(config: &BenchConfig, graph_file: &Path) -> Result<EmbeddingTable, anyhow::Error> {
    let mut embedder = config.make_embedder()?;
    let cpu_start = ProcessTime::now();
    let sys_start = SystemTime::now();
    let embeddings = embedder.embed(graph_file)?;
    log::info!(
        "embedding {} sys time(s) {:.2e} cpu time(s) {:.2e}",
        config.method,
        sys_start.elapsed().map(|d| d.as_secs_f64()).unwrap_or(0.),
        cpu_start.elapsed().as_secs_f64()
    );
    if let Some(EmbeddingSource::File(path)) = &config.embedding_source {
        if path != &config.output {
            Output::new(&config.output).dump(&embeddings)?;
        }
    }
    if embeddings.get_dimension() != config.dimension {
        log::warn!(
            "embedding dimension {} differs from dimension asked {}",
            embeddings.get_dimension(),
            config.dimension
        );
    }
    Ok(embeddings)
} // end of embed_graph

fn print_banner(title: &str, line: &str) {
    println!("{} {} {}", "#".repeat(9), title, "#".repeat(9));
    println!("{}", line);
    println!("{}", "#".repeat(50));
}

fn do_link_prediction<Ty: EdgeType>(config: &BenchConfig) -> Result<BTreeMap<String, f64>, anyhow::Error> {
    // the full input graph is the reference for negative sampling, even with supplied edge lists
    let graph = load_graph::<Ty>(&config.input, config.weighted)?;
    let mut split = match (&config.training_edgelist, &config.testing_edgelist) {
        (Some(train_file), Some(test_file)) => GraphSplit::<Ty>::from_edge_list_files(&graph, train_file, test_file)?,
        _ => split_train_test_graph(&graph, &SplitParams::new(config.test_ratio, config.seed))?,
    };
    // the embedder needs a file for the train graph
    let (train_file, generated) = match &config.training_edgelist {
        Some(path) => (path.clone(), false),
        None => (split.materialize(config.train_graph_path())?.to_path_buf(), true),
    };
    let embeddings = embed_graph(config, &train_file);
    if generated {
        if let Err(e) = std::fs::remove_file(&train_file) {
            log::warn!("could not remove train graph file {:?} : {}", train_file, e);
        }
    }
    let embeddings = embeddings?;
    //
    let cpu_start = ProcessTime::now();
    let params = LinkPredictionParams::new(config.seed, LogisticParams::default());
    let metrics = evaluate_link_prediction(
        &embeddings,
        split.get_original(),
        split.get_train(),
        split.get_test_edges(),
        &params,
        config.save_model.as_deref(),
    )?;
    log::info!("link prediction cpu time(s) {:.2e}", cpu_start.elapsed().as_secs_f64());
    print_banner(
        "Link Prediction Performance",
        &format!(
            "AUC-ROC: {:.3}, AUC-PR: {:.3}, Accuracy: {:.3}, F1: {:.3}, MCC: {:.3}",
            metrics.auc_roc, metrics.auc_pr, metrics.accuracy, metrics.f1, metrics.mcc
        ),
    );
    Ok(metrics.to_map())
} // end of do_link_prediction

fn do_node_classification(config: &BenchConfig) -> Result<BTreeMap<String, f64>, anyhow::Error> {
    let label_file = config
        .label_file
        .as_ref()
        .ok_or_else(|| anyhow!("node classification needs a label file"))?;
    let node_labels = load_labels(label_file)?;
    let embeddings = embed_graph(config, &config.input)?;
    let model_output = config
        .save_model
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_NODE_MODEL_OUTPUT));
    let params = NodeClassificationParams::new(
        config.test_ratio,
        config.seed,
        LogisticParams::default(),
        model_output,
        true,
    );
    let cpu_start = ProcessTime::now();
    let metrics = evaluate_node_classification(&embeddings, &node_labels, &params)?;
    log::info!("node classification cpu time(s) {:.2e}", cpu_start.elapsed().as_secs_f64());
    print_banner(
        "Node Classification Performance",
        &format!(
            "Accuracy: {:.3}, MCC: {:.3}, Micro-F1: {:.3}, Macro-F1: {:.3}",
            metrics.accuracy, metrics.mcc, metrics.micro_f1, metrics.macro_f1
        ),
    );
    Ok(metrics.to_map())
} // end of do_node_classification

// returns metrics if the task evaluates something
fn run<Ty: EdgeType>(config: &BenchConfig) -> Result<Option<BTreeMap<String, f64>>, anyhow::Error> {
    log::info!(
        "running task {} on {:?}, method {}, directed : {}",
        config.task,
        config.input,
        config.method,
        config.directed
    );
    match config.task {
        Task::LinkPrediction => Ok(Some(do_link_prediction::<Ty>(config)?)),
        Task::NodeClassification => Ok(Some(do_node_classification(config)?)),
        Task::None => {
            let graph = load_graph::<Ty>(&config.input, config.weighted)?;
            let embeddings = embed_graph(config, &config.input)?;
            let params = LinkPredictionParams::new(config.seed, LogisticParams::default());
            fit_link_predictor(&embeddings, &graph, &params, config.save_model.as_deref())?;
            Ok(None)
        }
    }
} // end of run

pub fn main() {
    //
    Builder::from_default_env().init();
    log::info!("logger initialized");
    //
    let matches = Command::new("graphbench")
        .about("evaluates a graph embedding on link prediction or node classification")
        .arg_required_else_help(true)
        .arg(
            Arg::new("input")
                .long("input")
                .takes_value(true)
                .required(true)
                .help("input graph edge list"),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .takes_value(true)
                .required(true)
                .help("embedding file, bson if extension is .bson, text otherwise"),
        )
        .arg(
            Arg::new("task")
                .long("task")
                .takes_value(true)
                .possible_values(["none", "link-prediction", "node-classification"])
                .default_value("none"),
        )
        .args(&[
            arg!(--method <method> "name of the embedding method").required(false),
            arg!(--testingratio <ratio> "fraction of edges or nodes held out").required(false),
            arg!(--dimensions <dim> "embedding dimension").required(false),
            arg!(--seed <seed> "random seed").required(false),
            arg!(--weighted "graph has a weight column"),
            arg!(--directed "graph is directed"),
        ])
        .arg(
            Arg::new("label-file")
                .long("label-file")
                .takes_value(true)
                .help("node labels, one node per line followed by its labels"),
        )
        .arg(
            Arg::new("eval-result-file")
                .long("eval-result-file")
                .takes_value(true)
                .help("json result records are appended to this file"),
        )
        .arg(
            Arg::new("training-edgelist")
                .long("training-edgelist")
                .takes_value(true)
                .requires("testing-edgelist"),
        )
        .arg(
            Arg::new("testing-edgelist")
                .long("testing-edgelist")
                .takes_value(true)
                .requires("training-edgelist"),
        )
        .arg(
            Arg::new("embed-cmd")
                .long("embed-cmd")
                .takes_value(true)
                .help("embedding command, placeholders {input} {output} {method} {dim} {seed}"),
        )
        .arg(
            Arg::new("embeddings")
                .long("embeddings")
                .takes_value(true)
                .help("precomputed embedding file"),
        )
        .arg(
            Arg::new("save-model")
                .long("save-model")
                .takes_value(true)
                .help("file where the fitted classifier is dumped"),
        )
        .get_matches();
    //
    let config = match parse_config(&matches) {
        Ok(config) => config,
        Err(e) => {
            log::error!("error parsing arguments : {}", e);
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = config.validate() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
    let res = if config.directed {
        run::<Directed>(&config)
    } else {
        run::<Undirected>(&config)
    };
    match res {
        Ok(Some(results)) => {
            if let Some(result_file) = &config.result_file {
                let record = ResultRecord::new(
                    &config.input.display().to_string(),
                    config.task.as_str(),
                    &config.method,
                    config.dimension,
                    config.seed,
                    results,
                );
                if let Err(e) = append_result(&record, result_file) {
                    log::error!("could not append result to {:?} : {}", result_file, e);
                    std::process::exit(1);
                }
            }
        }
        Ok(None) => {}
        Err(e) => {
            log::error!("{} failed : {:?}", config.task, e);
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
} // end of main
