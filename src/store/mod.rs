pub mod interactions;
pub mod registry;

pub use interactions::{InteractionKind, InteractionStore};
pub use registry::{RegistryError, UserRegistry};
