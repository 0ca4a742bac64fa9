//! Animation descriptor codec and display resolution planning for Cinder.
//!
//! This crate handles the text side of an animation package: parsing and
//! re-serializing the `desc.txt` descriptor embedded in every animation
//! archive, and deriving the target frame resolution for a device's display
//! from the descriptor's declared source resolution.

pub mod descriptor;
pub mod resolution;

pub use descriptor::{parse_descriptor, DescriptorError, DescriptorRecord};
pub use resolution::{plan, ResolutionError, TargetResolution};
