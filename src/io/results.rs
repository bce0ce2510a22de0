//! Result records: one json object per line appended to a result file, keys sorted.
//!
//! ```text
//! {"date":"2022-05-03-101512","dimension":100,"input":"graph.edgelist","method":"node2vec","results":{"accuracy":0.8, ...},"seed":0,"task":"link-prediction","user":"jpb"}
//! ```

use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::BenchError;

/// date format of records
pub const DATE_FORMAT: &str = "%Y-%m-%d-%H%M%S";

/// One evaluation run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub input: String,
    pub task: String,
    pub method: String,
    pub dimension: usize,
    pub user: String,
    pub date: String,
    pub seed: u64,
    /// metric name to value
    pub results: BTreeMap<String, f64>,
} // end of ResultRecord

// user name from environment
fn current_user() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string())
}

impl ResultRecord {
    /// a record for the current user at the current local time
    pub fn new(input: &str, task: &str, method: &str, dimension: usize, seed: u64, results: BTreeMap<String, f64>) -> Self {
        ResultRecord {
            input: input.to_string(),
            task: task.to_string(),
            method: method.to_string(),
            dimension,
            user: current_user(),
            date: chrono::Local::now().format(DATE_FORMAT).to_string(),
            seed,
            results,
        }
    }

    /// json text on one line with keys sorted
    pub fn to_json_line(&self) -> Result<String, BenchError> {
        // going through a Value sorts keys of the struct
        let value = serde_json::to_value(self)?;
        Ok(serde_json::to_string(&value)?)
    }
} // end of impl ResultRecord

/// appends record as a line of path, file is created if necessary
pub fn append_result(record: &ResultRecord, path: &Path) -> Result<(), BenchError> {
    let line = record.to_json_line()?;
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{}", line)?;
    log::info!("result record appended to {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {

    use super::*;
    use std::io::{BufRead, BufReader};

    // reads all records of a result file
    fn read_results(path: &Path) -> Result<Vec<ResultRecord>, BenchError> {
        let file = OpenOptions::new().read(true).open(path)?;
        let mut records = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            records.push(serde_json::from_str(&line)?);
        }
        Ok(records)
    }

    #[test]
    fn test_record_sorted_and_appended() {
        let results = BTreeMap::from([("mcc".to_string(), 0.5), ("accuracy".to_string(), 0.75)]);
        let record = ResultRecord::new("graph.edgelist", "link-prediction", "hope", 16, 3, results);
        assert!(chrono::NaiveDateTime::parse_from_str(&record.date, DATE_FORMAT).is_ok());
        let line = record.to_json_line().unwrap();
        assert!(!line.contains('\n'));
        let keys = ["\"date\"", "\"dimension\"", "\"input\"", "\"method\"", "\"results\"", "\"seed\"", "\"task\"", "\"user\""];
        let positions: Vec<usize> = keys.iter().map(|k| line.find(k).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        //
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");
        append_result(&record, &path).unwrap();
        append_result(&record, &path).unwrap();
        let records = read_results(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1], record);
    }
} // end of mod tests
