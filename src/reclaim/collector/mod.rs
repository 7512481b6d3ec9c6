//! Built-in memory reclamation strategies.

mod leak;
mod sdd;

pub use self::leak::Leak;
pub use self::sdd::Sdd;
