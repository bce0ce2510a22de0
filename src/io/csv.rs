//! Construct or dump a graph from an edge list, read node label files.
//!
//! An edge list has one edge per line : `node1 node2 [weight]`.
//! Fields are separated by spaces, tabulations or commas (the delimiter is guessed from the first data line).
//! Lines beginning with # are comments.
//!
//! A label file has one node per line : `node label1 label2 ...`

use std::fs::OpenOptions;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::anyhow;
use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use petgraph::EdgeType;

use crate::graph::{GraphData, NodeId};
use crate::validation::nodelabel::NodeLabels;

/// guess delimiter from first non comment line : tabulation, comma or space
pub fn get_delimiter(filepath: &Path) -> anyhow::Result<u8> {
    let file = OpenOptions::new().read(true).open(filepath).map_err(|e| {
        log::error!("could not open file {:?}", filepath.as_os_str());
        anyhow!("could not open file {:?} : {}", filepath, e)
    })?;
    let reader = BufReader::new(file);
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line.contains('\t') {
            return Ok(b'\t');
        } else if line.contains(',') {
            return Ok(b',');
        } else {
            return Ok(b' ');
        }
    }
    // empty file, any delimiter will do
    Ok(b' ')
} // end of get_delimiter

// returns records of file with empty fields (runs of spaces) filtered out
fn read_records(filepath: &Path) -> anyhow::Result<Vec<Vec<String>>> {
    let delim = get_delimiter(filepath)?;
    log::debug!("reading {:?} with delimiter {:?}", filepath, delim as char);
    let file = OpenOptions::new().read(true).open(filepath)?;
    let mut rdr = ReaderBuilder::new()
        .delimiter(delim)
        .has_headers(false)
        .flexible(true)
        .comment(Some(b'#'))
        .trim(Trim::All)
        .from_reader(file);
    //
    let mut records = Vec::<Vec<String>>::new();
    let mut record = StringRecord::new();
    while rdr.read_record(&mut record)? {
        let fields: Vec<String> = record
            .iter()
            .filter(|field| !field.is_empty())
            .map(|field| field.to_string())
            .collect();
        if !fields.is_empty() {
            records.push(fields);
        }
    }
    log::debug!("read {} records from {:?}", records.len(), filepath);
    Ok(records)
} // end of read_records

/// reads an edge list as (node1, node2, weight) triplets. Weight defaults to 1. when absent.
pub fn load_edge_list(filepath: &Path) -> anyhow::Result<Vec<(NodeId, NodeId, f64)>> {
    let records = read_records(filepath)?;
    let mut edges = Vec::<(NodeId, NodeId, f64)>::with_capacity(records.len());
    for (i, fields) in records.into_iter().enumerate() {
        if fields.len() < 2 {
            log::error!("record {} of {:?} has less than 2 fields", i, filepath);
            return Err(anyhow!("record {} of {:?} is not an edge : {:?}", i, filepath, fields));
        }
        let weight = match fields.get(2) {
            Some(str) => str
                .parse::<f64>()
                .map_err(|_| anyhow!("record {} of {:?} : cannot parse weight {}", i, filepath, str))?,
            None => 1.,
        };
        let mut fields = fields.into_iter();
        let (node1, node2) = match (fields.next(), fields.next()) {
            (Some(node1), Some(node2)) => (node1, node2),
            _ => return Err(anyhow!("record {} of {:?} is not an edge", i, filepath)),
        };
        edges.push((node1, node2, weight));
    }
    Ok(edges)
} // end of load_edge_list

/// loads a graph from an edge list. Ty is Directed or Undirected.
/// If weighted is false, weights present in file are ignored.
pub fn load_graph<Ty: EdgeType>(filepath: &Path, weighted: bool) -> anyhow::Result<GraphData<Ty>> {
    log::info!(
        "loading graph {:?}, weighted : {}, directed : {}",
        filepath,
        weighted,
        Ty::is_directed()
    );
    let edges = load_edge_list(filepath)?;
    let mut graph = GraphData::<Ty>::new(weighted);
    let mut nb_duplicates = 0usize;
    for (node1, node2, weight) in &edges {
        if node1 != node2 && !graph.add_edge(node1, node2, *weight) {
            nb_duplicates += 1;
        }
        if node1 == node2 {
            // keep node even if its only edge is a self loop
            graph.add_node(node1);
            log::warn!("self loop on node {} dropped", node1);
        }
    }
    if nb_duplicates > 0 {
        log::warn!("{} duplicated edges in {:?}", nb_duplicates, filepath);
    }
    log::info!(
        "graph loaded, nb nodes : {}, nb edges : {}",
        graph.get_nb_nodes(),
        graph.get_nb_edges()
    );
    Ok(graph)
} // end of load_graph

/// reads a node label file and returns node list and label sets
pub fn load_labels(filepath: &Path) -> anyhow::Result<NodeLabels> {
    let records = read_records(filepath)?;
    let mut nodes = Vec::<NodeId>::with_capacity(records.len());
    let mut labels = Vec::<Vec<String>>::with_capacity(records.len());
    for fields in records {
        let mut fields = fields.into_iter();
        if let Some(node) = fields.next() {
            nodes.push(node);
            labels.push(fields.collect());
        }
    }
    log::info!("loaded labels for {} nodes from {:?}", nodes.len(), filepath);
    Ok(NodeLabels::new(nodes, labels)?)
} // end of load_labels

/// dumps graph as an edge list (space separated), with weights if graph is weighted.
/// This is the file handed to the embedding program.
pub fn dump_edge_list<Ty: EdgeType>(graph: &GraphData<Ty>, filepath: &Path) -> anyhow::Result<()> {
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(filepath)
        .map_err(|e| anyhow!("could not open file {:?} : {}", filepath, e))?;
    let mut wtr = WriterBuilder::new()
        .delimiter(b' ')
        .has_headers(false)
        .from_writer(file);
    for edge in graph.edges() {
        let (node1, node2) = match (graph.get_node_id(edge.0), graph.get_node_id(edge.1)) {
            (Some(node1), Some(node2)) => (node1, node2),
            _ => return Err(anyhow!("edge with unindexed node rank {:?}", edge)),
        };
        if graph.is_weighted() {
            wtr.write_record(&[node1.as_str(), node2.as_str(), edge.2.to_string().as_str()])?;
        } else {
            wtr.write_record(&[node1.as_str(), node2.as_str()])?;
        }
    }
    wtr.flush()?;
    log::info!("dumped {} edges in {:?}", graph.get_nb_edges(), filepath);
    Ok(())
} // end of dump_edge_list

// end of mod tests
