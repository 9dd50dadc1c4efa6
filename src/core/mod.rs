//! Core types: levels, buffers, pools, items and the logger itself

pub mod buffer;
pub mod error;
pub mod field;
pub mod item;
pub mod level;
pub mod loader;
pub mod logger;
pub mod metrics;
pub mod pool;

pub use buffer::Buffer;
pub use error::{LoggerError, Result};
pub use field::{default_marshal, FieldValue, MarshalFn};
pub use item::Item;
pub use level::Level;
pub use loader::{ConfigSource, Dispatch, FormatterSpec, Loader, WriterSpec};
pub use logger::{Logger, LoggerBuilder};
pub use metrics::{PoolMetrics, WriterMetrics};
pub use pool::{BufferPool, ItemPool};
