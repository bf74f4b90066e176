pub mod network;
pub mod testing;
pub mod types;
pub mod verify;

pub use network::{DrandNetwork, Scheme};
pub use types::Beacon;
pub use verify::{derive_randomness, verify_beacon, verify_signature, VerifyError};
