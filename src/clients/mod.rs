pub mod moss;
pub mod omegaup;

pub use moss::MossClient;
pub use omegaup::OmegaUpClient;
