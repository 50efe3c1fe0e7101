//! # Domain Models
//!
//! Data types shared by the module runtime and every PBX module, plus the [`module::Module`]
//! capability contract itself. No I/O and no runtime here: just values, the contract, and the
//! small amount of glue (`registry::ModuleHandle`) needed to share a module between the event
//! bus and the kernel.

pub mod config;
pub mod constants;
pub mod dialplan;
pub mod error;
pub mod events;
pub mod module;
pub mod permissions;
pub mod registry;

pub use error::{ModuleError, ModuleErrorExt};
