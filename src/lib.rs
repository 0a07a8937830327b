// Library surface for the binary and for headless/integration tests.
pub mod console;
pub mod error;
pub mod logging;
pub mod runtime;
pub mod session;
pub mod stats;
pub mod util;

pub use error::SessionError;
pub use session::{Round, SessionConfig, SessionRunner};
pub use stats::SessionStats;
