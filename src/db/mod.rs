pub mod codec;
pub mod pool;

pub use codec::rows_to_json;
pub use pool::{DbPool, PooledConn};
