use serde::{Deserialize, Serialize};

/// Knobs that change how a bank is decoded.
///
/// Every field has a default, so a partial JSON object (or none at all)
/// deserializes into a usable configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    /// Decode `HIRC` into typed objects. When off the chunk is carried as
    /// opaque bytes, which lets a bank with unrecognized object kinds still
    /// have its sub-files replaced.
    pub decode_hierarchy: bool,
    /// Decode `STID` and `STMG` into typed tables (falling back to opaque
    /// bytes when their layout does not match).
    pub typed_metadata: bool,
    /// When probing an embedded sub-file, read one extra byte after a `data`
    /// chunk whose declared length is odd.
    ///
    /// Some authoring tools leave the RIFF pad byte out of the declared
    /// length. This is a compatibility switch for those files, not a general
    /// rule, and is off unless asked for.
    pub pad_odd_data_chunk: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            decode_hierarchy: true,
            typed_metadata: true,
            pad_odd_data_chunk: false,
        }
    }
}
