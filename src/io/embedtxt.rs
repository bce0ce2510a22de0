//! Text format of embeddings as written by word2vec like tools :
//!
//! an optional header line `nb_nodes dimension` then one line per node `node v1 v2 ... vd`,
//! values separated by spaces.

use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::anyhow;

use crate::embedding::EmbeddingTable;
use crate::graph::NodeId;

// true if fields look like a `nb_nodes dimension` header, given the length of the following line
fn is_header(fields: &[&str], next_len: Option<usize>) -> bool {
    if fields.len() != 2 {
        return false;
    }
    match (fields[0].parse::<usize>(), fields[1].parse::<usize>()) {
        (Ok(_), Ok(dim)) => match next_len {
            Some(len) => len == dim + 1,
            None => true,
        },
        _ => false,
    }
} // end of is_header

/// loads an embedding table from a text file
pub fn text_load(path: &Path) -> Result<EmbeddingTable, anyhow::Error> {
    log::info!("loading text embedding {:?}", path);
    let file = OpenOptions::new()
        .read(true)
        .open(path)
        .map_err(|e| anyhow!("could not open file {:?} : {}", path, e))?;
    let lines: Vec<String> = BufReader::new(file)
        .lines()
        .collect::<Result<Vec<String>, _>>()?
        .into_iter()
        .filter(|line| !line.trim().is_empty())
        .collect();
    //
    let mut rows = Vec::<(NodeId, Vec<f64>)>::with_capacity(lines.len());
    let mut announced: Option<usize> = None;
    for (i, line) in lines.iter().enumerate() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if i == 0 {
            let next_len = lines.get(1).map(|l| l.split_whitespace().count());
            if is_header(&fields, next_len) {
                announced = fields[0].parse::<usize>().ok();
                log::debug!("embedding header : {}", line);
                continue;
            }
        }
        let mut values = Vec::<f64>::with_capacity(fields.len().saturating_sub(1));
        for field in &fields[1..] {
            let value = field
                .parse::<f64>()
                .map_err(|_| anyhow!("line {} of {:?} : cannot parse {} as f64", i, path, field))?;
            values.push(value);
        }
        rows.push((fields[0].to_string(), values));
    }
    if let Some(nb_nodes) = announced {
        if nb_nodes != rows.len() {
            log::warn!("header announces {} nodes, got {}", nb_nodes, rows.len());
        }
    }
    let table = EmbeddingTable::from_rows(rows)?;
    log::info!(
        "loaded {} vectors of dimension {}",
        table.get_nb_nodes(),
        table.get_dimension()
    );
    Ok(table)
} // end of text_load

/// dumps an embedding table in text format with a header line
pub fn text_dump(table: &EmbeddingTable, path: &Path) -> Result<(), anyhow::Error> {
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .map_err(|e| anyhow!("could not open file {:?} : {}", path, e))?;
    let mut writer = BufWriter::new(file);
    writeln!(writer, "{} {}", table.get_nb_nodes(), table.get_dimension())?;
    for (rank, node) in table.get_node_indexation().iter().enumerate() {
        write!(writer, "{}", node)?;
        for value in table.get_embedded_rank(rank).iter() {
            write!(writer, " {}", value)?;
        }
        writeln!(writer)?;
    }
    writer.flush()?;
    Ok(())
} // end of text_dump

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn test_header_detection() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("with_header.txt");
        std::fs::write(&path, "2 3\na 1 2 3\nb 4 5 6\n").unwrap();
        let table = text_load(&path).unwrap();
        assert_eq!(table.get_nb_nodes(), 2);
        assert_eq!(table.get_dimension(), 3);
        // dimension 1 vectors with integer node ids, no header
        let path = dir.path().join("no_header.txt");
        std::fs::write(&path, "1 2\n3 4\n").unwrap();
        let table = text_load(&path).unwrap();
        assert_eq!(table.get_nb_nodes(), 2);
        assert_eq!(table.get_embedded_node("3").unwrap()[0], 4.);
    }

    #[test]
    fn test_text_dump_reload() {
        let table = EmbeddingTable::from_rows(vec![
            ("x".to_string(), vec![0.1, -0.2]),
            ("y".to_string(), vec![1.5, 2.25]),
        ])
        .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("emb.txt");
        text_dump(&table, &path).unwrap();
        let reloaded = text_load(&path).unwrap();
        assert_eq!(reloaded.get_embedded(), table.get_embedded());
        assert_eq!(reloaded.get_node_rank("y"), Some(1));
    }
} // end of mod tests
