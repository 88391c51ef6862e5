pub mod config;
pub mod frame_loop;
pub mod host;
pub mod idle;
pub mod math;
pub mod mesh;
pub mod model;
pub mod node;
pub mod render;
pub mod renderless;
pub mod scene;
pub mod scroll;
pub mod stage;
pub mod viewport;

#[cfg(feature = "opengl")]
pub mod opengl;
#[cfg(feature = "web")]
pub mod web;

pub use config::SceneConfig;
pub use host::{Host, HostEvent, ViewportSize};
pub use render::CapRenderer;
pub use stage::{Stage, StageError};
