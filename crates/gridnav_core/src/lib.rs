pub mod coords;
pub mod engine;
pub mod input;
pub mod model;
pub mod playback;
pub mod registry;
pub mod robot;
