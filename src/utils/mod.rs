pub mod http;
pub mod shell;

pub use http::HttpClient;
