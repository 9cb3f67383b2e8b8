pub mod identity;
pub mod routes;
pub mod server;

pub use identity::{AuthenticatedUser, IDENTITY_HEADER};
pub use server::{router, serve};
