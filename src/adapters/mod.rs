// Adapters layer: concrete implementations for the remote API and the pair file.

pub mod http;
pub mod pairs;

pub use http::HttpIntentClient;
pub use pairs::load_pairs;
