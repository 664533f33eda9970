//! NDJSON `_bulk` request bodies

use crate::Result;
use serde::{Deserialize, Serialize};

/// Action line of a bulk request
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BulkActionMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<BulkMeta>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BulkMeta {
    #[serde(rename = "_index")]
    pub index: String,
    #[serde(rename = "_id")]
    pub id: String,
}

/// Accumulates bulk operations into a newline-delimited body
#[derive(Debug, Default)]
pub struct BulkBody {
    buf: Vec<u8>,
    operations: usize,
}

impl BulkBody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an index (create-or-replace) operation
    pub fn index<T: Serialize>(&mut self, index: &str, id: &str, doc: &T) -> Result<()> {
        let meta = BulkActionMeta {
            index: Some(BulkMeta {
                index: index.to_string(),
                id: id.to_string(),
            }),
        };
        self.push_line(&meta)?;
        self.push_line(doc)?;
        self.operations += 1;
        Ok(())
    }

    fn push_line<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        serde_json::to_writer(&mut self.buf, value)?;
        self.buf.push(b'\n');
        Ok(())
    }

    /// Number of operations (not lines) in the body
    pub fn len(&self) -> usize {
        self.operations
    }

    pub fn is_empty(&self) -> bool {
        self.operations == 0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}
