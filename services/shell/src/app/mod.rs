pub mod persistence;
pub mod registry;
pub mod state;

pub use persistence::Persistence;
pub use registry::{render, ScreenView};
pub use state::{RootState, StateSnapshot};
