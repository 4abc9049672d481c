//! Store module exports

pub mod flat_file;
pub mod memory;
pub mod traits;

pub use flat_file::CsvRecordStore;
pub use memory::InMemoryRecordStore;
pub use traits::RecordStore;
