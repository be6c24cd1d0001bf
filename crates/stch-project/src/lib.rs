//! Project files for the stch codec.
//!
//! A project stream is a ten-byte dialect header, a length-prefixed object
//! store holding the metadata dictionary, and a second object store whose
//! root is the stage. [`Project`] reads and writes that layout, and
//! [`catalog`] declares the record classes the stage tree is made of.
//!
//! # Key Types
//!
//! - [`Project`] - a dialect plus its metadata and stage stores
//! - [`ProjectConfig`] - metadata for new projects, loadable from TOML
//! - [`ProjectError`] - everything that can go wrong reading a project

pub mod catalog;
pub mod config;
pub mod error;
pub mod project;

pub use config::ProjectConfig;
pub use error::{ProjectError, ProjectResult};
pub use project::Project;
