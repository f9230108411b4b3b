//! Pixel-art board core: a fixed-size cell grid, brushes and preset stamps, a catalog
//! of saved works, share tokens and PNG export.

pub mod logger;

pub mod canvas;
pub mod catalog;
pub mod cli;
pub mod components;
pub mod error;
pub mod io;
pub mod ops;
pub mod project;
pub mod settings;
pub mod storage;

pub use error::{Error, Result};
