//! This library provides an in-memory form of a word-level netlist in the style of RTLIL.
//!
//! A [`Design`] is a collection of named [`Module`]s. Each module owns an arena of [`Wire`]s
//! addressed by [`WireId`], a set of named [`Cell`]s whose ports are bound to [`SigSpec`]s, and an
//! ordered list of [`Connection`]s. Signals refer to wires by id rather than by name, so renaming a
//! wire never invalidates a reference to it.

mod logic;
mod param;
mod sig;
mod wire;
mod cell;
mod module;
mod design;
mod sigmap;
mod selection;
mod print;
mod validate;

pub use logic::{Logic, Const};
pub use param::ParamValue;
pub use sig::{SigBit, SigSpec};
pub use wire::{Wire, WireId};
pub use cell::{Cell, CellKind};
pub use module::{Module, Connection, PortDirection};
pub use design::Design;
pub use sigmap::SigMap;
pub use selection::{Selection, ModuleSelection};
pub use validate::ValidationError;
