//! Demo scenes and the session that switches between them

mod demos;
mod session;

pub use demos::{CameraSetup, Demo, DemoScene};
pub use session::DemoSession;
