pub mod distro;
pub mod types;

pub use distro::{ActionOutput, ActionStatus, DistroInfo, DistroState, ListOutput};
pub use types::*;
