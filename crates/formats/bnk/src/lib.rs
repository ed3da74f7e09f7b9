//! Reader/writer for game-audio sound banks.
//!
//! Three-layer architecture:
//! - **Layer 1** (`reader`/`writer`): Raw chunk I/O, the flat run of
//!   `tag, length, payload` records
//! - **Layer 2** (`chunks`, `hierarchy`): Typed codecs for individual chunk
//!   payloads, including the `HIRC` object table
//! - **Layer 3** (`bank`, `marshaller`): Load, edit embedded sub-files, save
//!
//! Anything not understood is carried as raw bytes, so an unedited bank
//! re-encodes to its exact input.

pub mod bank;
pub mod chunks;
pub mod cursor;
pub mod error;
pub mod hierarchy;
pub mod marshaller;
pub mod options;
pub mod progress;
pub mod reader;
pub mod wem;
pub mod writer;

pub use bank::Bank;
pub use chunks::Chunk;
pub use error::{Error, Result};
pub use hierarchy::{Hirc, HircEntry, HircObject, ObjectKind};
pub use marshaller::{aligned_offsets, SubFileMarshaller};
pub use options::DecodeOptions;
pub use progress::{BodyFit, Logged, Progress, Silent, Step};
pub use reader::ChunkIndex;
pub use wem::WemInfo;
