use serde::Serialize;

/// Concatenated sub-file bytes (`DATA`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DataChunk {
    #[serde(skip)]
    pub data: Vec<u8>,
}

impl DataChunk {
    pub fn parse(chunk_data: &[u8]) -> Self {
        Self {
            data: chunk_data.to_vec(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
