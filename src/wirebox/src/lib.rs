#![allow(clippy::new_without_default)]

pub mod annotation;
pub mod container;
pub mod key;
pub mod provider;
mod util;

pub use wirebox_derive::injectable;

pub mod prelude {
    pub use crate::annotation::{AnnotationError, AnnotationStore, Recorder, TypedRecorder};
    pub use crate::container::{Container, ContainerError};
    pub use crate::injectable;
    pub use crate::key;
    pub use crate::provider::{Injectable, Managed, Provider};
}
