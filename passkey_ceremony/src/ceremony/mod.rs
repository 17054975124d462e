mod errors;
mod types;

pub use errors::CeremonyError;
pub use types::CeremonyAuthenticator;
