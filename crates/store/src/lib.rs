//! Durable cache shared between the widget process and the main application.
//!
//! Two named key-value tiers sit behind [`CacheStore`]:
//! - the **fast** tier, owned by the widget, one key per record field;
//! - the **fallback** tier, owned by the main application, holding the whole
//!   record as a single JSON document under [`FALLBACK_KEY`].

pub mod cache;
pub mod kv;

pub use cache::{CacheStore, FALLBACK_KEY};
pub use kv::{FileStore, KvStore, MemoryStore};
