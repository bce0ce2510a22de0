//! To describe dump of embedding

use std::path::{Path, PathBuf};

use crate::embedding::EmbeddingTable;
use crate::io::embeddedbson::bson_dump;
use crate::io::embedtxt::text_dump;

/// Bson or word2vec like text.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Format {
    BSON,
    TEXT,
}

pub struct Output {
    /// describe output format
    fmt: Format,
    /// name of output file
    output_name: PathBuf,
}

impl Output {
    /// format is deduced from extension : bson for a .bson file, text otherwise
    pub fn new(output_name: &Path) -> Self {
        let fmt = match output_name.extension().and_then(|ext| ext.to_str()) {
            Some("bson") => Format::BSON,
            _ => Format::TEXT,
        };
        Output {
            fmt,
            output_name: output_name.to_path_buf(),
        }
    }
    /// get ouput format
    pub fn get_fmt(&self) -> Format {
        self.fmt
    }

    /// get output_name
    pub fn get_output_name(&self) -> &Path {
        &self.output_name
    }

    /// dumps embedding in the format asked for
    pub fn dump(&self, table: &EmbeddingTable) -> Result<(), anyhow::Error> {
        log::info!("dumping embedding in {:?}, format {:?}", self.output_name, self.fmt);
        match self.fmt {
            Format::BSON => bson_dump(table, &self.output_name),
            Format::TEXT => text_dump(table, &self.output_name),
        }
    }
} // end of Output

impl Default for Output {
    fn default() -> Self {
        Output {
            fmt: Format::BSON,
            output_name: PathBuf::from("embedding.bson"),
        }
    }
}

// end of mod tests
