//! module to do bson io for embedding tables
//!
//!  Data are formatted in bson Documents, each value has a key.
//!
//!  The encoding is done in 3 parts:
//! 1. A header structure with key "header". The structure is described below see struct [Header](EmbeddedBsonHeader)
//! - a version index
//! - dimension of vectors
//! - number of vectors
//!
//! 2. The embedded vectors, one document for each vector, the key is the rank of the vector.
//!    So the first vector has key "0", the second "1" ...
//!
//! 3. The node indexation in a last document :
//!    each node id is a key associated to the node rank as i64.
//!

// Note : a Bson document must not be larger than 16Mb!
// So we need to have many Documents in the file dumped

use anyhow::anyhow;

use std::fs::OpenOptions;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use bson::{bson, Bson, Document};
use serde::{Deserialize, Serialize};

use indexmap::IndexSet;
use ndarray::{Array2, ArrayView1};
use num::cast::FromPrimitive;

use crate::embedding::EmbeddingTable;
use crate::graph::NodeId;

/// current version of dump format
const BSON_EMBEDDING_VERSION: i64 = 1;

/// This structure defines the header of the bson document
#[derive(Debug, Serialize, Deserialize)]
pub struct EmbeddedBsonHeader {
    /// version of dump format
    pub version: i64,
    /// dimension of the embedding (length of vectors)
    pub dimension: i64,
    /// number of vectors.
    pub nbdata: i64,
} // end of EmbeddedBsonHeader

/// dump an embedding table in bson format in file path.
pub fn bson_dump(table: &EmbeddingTable, path: &Path) -> Result<(), anyhow::Error> {
    //
    log::info!("entering bson_dump");
    //
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .map_err(|e| anyhow!("could not open file : {}, {}", path.display(), e))?;
    let mut bufwriter = BufWriter::new(file);
    // dump header part
    let dim: i64 = FromPrimitive::from_usize(table.get_dimension())
        .ok_or_else(|| anyhow!("dimension does not fit in i64"))?;
    let nbdata: i64 = FromPrimitive::from_usize(table.get_nb_nodes())
        .ok_or_else(|| anyhow!("number of nodes does not fit in i64"))?;
    let mut doc = Document::new();
    let bson_header = bson!({
        "version": BSON_EMBEDDING_VERSION,
        "dimension": dim,
        "nbdata": nbdata
        }
    );
    doc.insert("header", bson_header);
    doc.to_writer(&mut bufwriter).map_err(|e| {
        log::error!("dump header bson in {} failed", path.display());
        anyhow!("dump of bson failed: {}", e)
    })?;
    // now loop on data vectors
    for i in 0..table.get_nb_nodes() {
        let mut doc = Document::new();
        let data: Vec<Bson> = table
            .get_embedded_rank(i)
            .iter()
            .map(|x| Bson::Double(*x))
            .collect();
        doc.insert(i.to_string(), data);
        doc.to_writer(&mut bufwriter).map_err(|e| {
            log::error!("bson dump error in node {i}");
            anyhow!("bson dump error for node {i} {}", e)
        })?;
    }
    // We dump nodeindexation as a document with each key being nodeid
    let mut bson_indexation = Document::new();
    for (rank, node_id) in table.get_node_indexation().iter().enumerate() {
        bson_indexation.insert(node_id.clone(), rank as i64);
    }
    bson_indexation
        .to_writer(&mut bufwriter)
        .map_err(|e| anyhow!("dump of bson indexation failed: {}", e))?;
    bufwriter.flush()?;
    //
    log::info!("bson dump in file {} finished", path.display());
    Ok(())
} // end of bson_dump

/// reloads an embedding table from a previous bson dump
pub fn bson_load(path: &Path) -> Result<EmbeddingTable, anyhow::Error> {
    //
    log::info!("entering bson_load, file name : {:?}", path);
    //
    let file = OpenOptions::new().read(true).open(path).map_err(|e| {
        log::error!("reload of bson dump failed");
        anyhow!("reload failed: {}", e)
    })?;
    let mut bufreader = BufReader::new(file);
    // load header
    let doc = Document::from_reader(&mut bufreader).map_err(|e| {
        log::error!("could not load document from file {}", path.display());
        anyhow!(e)
    })?;
    let bson_header = doc
        .get("header")
        .ok_or_else(|| anyhow!("could not find header in document"))?
        .clone();
    let header: EmbeddedBsonHeader = bson::from_bson(bson_header)?;
    log::info!("header : {:?}", header);
    if header.version != BSON_EMBEDDING_VERSION {
        log::error!("header format version : {}", header.version);
        return Err(anyhow!("format version error, inconsistent with header"));
    }
    let nb_data: usize =
        FromPrimitive::from_i64(header.nbdata).ok_or_else(|| anyhow!("bad nbdata in header"))?;
    let dim: usize =
        FromPrimitive::from_i64(header.dimension).ok_or_else(|| anyhow!("bad dimension in header"))?;
    log::debug!("bson_load , nb_data = {nb_data}, dim : {dim}");
    let mut array = Array2::<f64>::zeros((0, dim));
    for i in 0..nb_data {
        // we have one document for each node
        let doc = Document::from_reader(&mut bufreader).map_err(|e| {
            log::error!("could not load document for node {i} from file {}", path.display());
            anyhow!(e)
        })?;
        let key = i.to_string();
        let record = doc
            .get(&key)
            .ok_or_else(|| anyhow!("could not get record for key {:?}", key))?;
        let data_1d: Vec<f64> = bson::from_bson(record.clone())?;
        array
            .push_row(ArrayView1::from(data_1d.as_slice()))
            .map_err(|_| anyhow!("could not insert array vector {:?}", i))?;
    }
    log::info!("\t finished bson decoding of embedded vectors");
    // node indexation
    let bson_indexation = Document::from_reader(&mut bufreader)
        .map_err(|e| anyhow!("could not find indexation document in {} : {}", path.display(), e))?;
    let mut ranked = Vec::<(i64, NodeId)>::with_capacity(bson_indexation.len());
    for (node_id, rank) in bson_indexation.iter() {
        let rank = rank
            .as_i64()
            .ok_or_else(|| anyhow!("could not get node rank for node_id {}", node_id))?;
        ranked.push((rank, node_id.clone()));
    }
    ranked.sort_unstable_by_key(|(rank, _)| *rank);
    let node_indexation: IndexSet<NodeId> = ranked.into_iter().map(|(_, id)| id).collect();
    if node_indexation.len() != nb_data {
        return Err(anyhow!(
            "indexation has {} nodes, header announces {}",
            node_indexation.len(),
            nb_data
        ));
    }
    Ok(EmbeddingTable::new(node_indexation, array)?)
} // end of bson_load

// end of mod tests
