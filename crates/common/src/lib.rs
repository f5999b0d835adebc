//! Thyme Common Library
//!
//! Shared building blocks for the Thyme report: the page model that
//! contributions decorate, the page location, persisted UI preferences and
//! configuration.

pub mod config;
pub mod error;
pub mod location;
pub mod page;
pub mod prefs;

// Re-export commonly used types
pub use config::{Nesting, PageConfig, ThymeConfig};
pub use error::{Error, Result};
pub use location::Location;
pub use page::{ElementId, Listener, Page, PageHandle};
pub use prefs::{FilePreferences, MemoryPreferences, PreferenceStore};

/// Thyme version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
