pub mod cli;
pub mod config;
pub mod debugger;
pub mod fps;
pub mod headless;
pub mod runner;
pub mod saves;
#[cfg(feature = "sdl")]
pub mod sdl;

pub use config::{Config, ConfigError};
pub use runner::{run, IoApp, Runner};
pub use saves::{FileSystemStore, NoopStore, SaveStore};

#[cfg(test)]
mod test_support;
