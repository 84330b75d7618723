pub mod cache;
pub mod camera;
pub mod color;
pub mod constants;
pub mod engine;
pub mod error;
pub mod history;
pub mod hotspot;
pub mod interact;
pub mod overlay;
pub mod placement;
pub mod scene;
pub mod switcher;
pub mod vector;

pub use cache::*;
pub use engine::*;
pub use error::EngineError;
pub use history::*;
pub use interact::{Hover, NavAction, Ray};
pub use overlay::*;
pub use scene::*;
pub use switcher::*;
