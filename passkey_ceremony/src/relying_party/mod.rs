mod config;
mod http;
mod types;

pub use config::RelyingPartyConfig;
pub use http::HttpRelyingParty;
pub use types::RelyingParty;
