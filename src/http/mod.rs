pub mod orderedheaders;
pub mod request;
pub mod requestbody;
pub mod response;
pub mod retry;
pub mod streamfactory;
pub mod transaction;
pub mod transport;

// Re-exports for convenience
pub use request::{PreparedRequest, Request};
pub use requestbody::RequestBody;
pub use response::HttpResponse;
pub use retry::RetryPolicy;
pub use transport::{Sending, Transport};
