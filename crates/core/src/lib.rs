//! Core types for plyboard
//!
//! This crate holds everything the graph, notation and adversarial crates share:
//! - Error taxonomy: [`PlyError`], [`ParsingError`], [`BuildError`]
//! - Data bags: [`DataBag`] and deep merge
//! - Property Protocol: [`Inspectable`], [`ItemProperty`]
//! - Reversible commands: [`Command`], [`CommandHandler`]
//! - Small utilities: [`Queue`], capability checklists

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod capability;
pub mod command;
pub mod error;
pub mod property;
pub mod queue;
pub mod value;

pub use capability::{arity_in, validate, Capabilities, MethodSpec, MethodTable};
pub use command::{Command, CommandHandler, FnPair, Reversible, Triggered, TriggeredCommand};
pub use error::{BuildError, Fault, ParsingError, PlyError, PlyResult};
pub use property::{can_set_props, check_property_update, Inspectable, ItemProperty, PropertyType, ValueCheck};
pub use queue::Queue;
pub use value::{is_truthy, merge, merge_in_place, DataBag, Map, Value, MAX_MERGE_DEPTH};
