//! Injected collaborators: text storage and logging

pub mod logger;
pub mod storage;

pub use logger::{Logger, MemoryLogger, TracingLogger};
pub use storage::{FsStorage, MemoryStorage, TextStorage};
