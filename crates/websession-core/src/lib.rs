#![allow(clippy::pedantic)]
#![allow(clippy::nursery)]
#![deny(clippy::unwrap_used)]
#![allow(clippy::missing_errors_doc)]

pub mod api;
pub mod collaborators;
pub mod config;
pub mod coordinator;
pub mod csrf;
pub mod error;
pub mod headers;
pub mod profile;
pub mod rest;

pub use crate::api::*;
pub use crate::collaborators::*;
pub use crate::config::*;
pub use crate::coordinator::*;
pub use crate::csrf::*;
pub use crate::error::*;
pub use crate::headers::*;
pub use crate::profile::*;
pub use crate::rest::*;
