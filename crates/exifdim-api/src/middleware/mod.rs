pub mod api_key;
pub mod request_id;
pub mod security_headers;

pub use api_key::{api_key_middleware, ApiKeyState};
pub use request_id::{request_id_middleware, RequestId};
pub use security_headers::{security_headers_middleware, SecurityHeadersConfig};
