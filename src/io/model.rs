//! Persistence of fitted classifiers.
//!
//! The file contains 2 bson documents :
//! 1. a header with key "header" giving the format version and the kind of model
//! 2. the model itself, serialized with serde.

use std::fs::OpenOptions;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use bson::{bson, Document};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::classifier::logistic::LogisticRegression;
use crate::classifier::onevsrest::OneVsRestLogistic;
use crate::error::BenchError;

const MODEL_FORMAT_VERSION: i64 = 1;

/// A model that can be dumped. KIND is checked at reload.
pub trait PersistentModel: Serialize + DeserializeOwned {
    const KIND: &'static str;
}

impl PersistentModel for LogisticRegression {
    const KIND: &'static str = "logistic_regression";
}

impl PersistentModel for OneVsRestLogistic {
    const KIND: &'static str = "one_vs_rest_logistic";
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ModelHeader {
    pub version: i64,
    pub kind: String,
}

/// dumps model in path, overwriting the file
pub fn dump_model<M: PersistentModel>(model: &M, path: &Path) -> Result<(), BenchError> {
    log::info!("dumping {} model in {:?}", M::KIND, path);
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?;
    let mut bufwriter = BufWriter::new(file);
    let mut header = Document::new();
    header.insert(
        "header",
        bson!({
            "version": MODEL_FORMAT_VERSION,
            "kind": M::KIND,
        }),
    );
    header.to_writer(&mut bufwriter)?;
    let doc = bson::to_document(model)?;
    doc.to_writer(&mut bufwriter)?;
    bufwriter.flush()?;
    Ok(())
} // end of dump_model

/// reloads a model dumped by [dump_model]
pub fn load_model<M: PersistentModel>(path: &Path) -> Result<M, BenchError> {
    log::info!("reloading {} model from {:?}", M::KIND, path);
    let file = OpenOptions::new().read(true).open(path)?;
    let mut bufreader = BufReader::new(file);
    let doc = Document::from_reader(&mut bufreader)?;
    let header = doc
        .get("header")
        .ok_or_else(|| BenchError::ModelFormat("no header document".to_string()))?
        .clone();
    let header: ModelHeader = bson::from_bson(header)?;
    if header.version != MODEL_FORMAT_VERSION {
        log::error!("model format version {} not supported", header.version);
        return Err(BenchError::ModelFormat(format!("version {}", header.version)));
    }
    if header.kind != M::KIND {
        log::error!("model file holds a {}, expected {}", header.kind, M::KIND);
        return Err(BenchError::ModelFormat(format!(
            "model kind {}, expected {}",
            header.kind,
            M::KIND
        )));
    }
    let doc = Document::from_reader(&mut bufreader)?;
    Ok(bson::from_document(doc)?)
} // end of load_model

// end of mod tests
