mod http;
mod traits;

pub use http::{classify_failure, HttpTransport};
pub use traits::ChatTransport;
