pub mod bridge;
pub mod renderer;
pub mod session;
pub mod types;

pub use session::PlayerSession;
pub use types::{PlayerError, SessionConfig};
