//! Document comparison: structural, visual and size checks

pub mod comparator;
pub mod error;
pub mod lines;
pub mod policy;
pub mod size;
pub mod structural;
pub mod visual;

#[cfg(feature = "rendering")]
pub mod pdfium_backend;

pub use comparator::{Comparator, Verdict};
pub use error::{CompareError, Result};
pub use policy::IgnorePolicy;
