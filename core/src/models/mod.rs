mod event;
mod file_record;

pub use event::{EventKind, EventRecord};
pub use file_record::{FileIdentity, FileRecord};
