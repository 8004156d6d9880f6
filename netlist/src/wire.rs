use std::collections::BTreeMap;
use std::fmt::Debug;

use crate::{ParamValue, SigBit, SigSpec};

/// Handle of a wire within its [`Module`]. Stays the same when the wire is renamed.
///
/// [`Module`]: crate::Module
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WireId(u32);

impl WireId {
    pub fn from_index(index: usize) -> Self {
        assert!(index < u32::MAX as usize);
        WireId(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl Debug for WireId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "WireId({})", self.0)
    }
}

/// A named signal declaration. A wire with both `port_input` and `port_output` set is an inout port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wire {
    id: WireId,
    pub(crate) name: String,
    pub width: usize,
    pub start_offset: i32,
    pub upto: bool,
    /// Position in the module port list, starting at 1; 0 if the wire is not a port.
    /// Kept consistent with the direction flags by [`Module::fixup_ports`].
    ///
    /// [`Module::fixup_ports`]: crate::Module::fixup_ports
    pub port_id: usize,
    pub port_input: bool,
    pub port_output: bool,
    pub attributes: BTreeMap<String, ParamValue>,
}

impl Wire {
    pub(crate) fn new(id: WireId, name: String, width: usize) -> Self {
        Wire {
            id,
            name,
            width,
            start_offset: 0,
            upto: false,
            port_id: 0,
            port_input: false,
            port_output: false,
            attributes: BTreeMap::new(),
        }
    }

    /// Copies everything about `other` except its identity.
    pub(crate) fn new_like(id: WireId, name: String, other: &Wire) -> Self {
        Wire { id, name, ..other.clone() }
    }

    pub fn id(&self) -> WireId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_port(&self) -> bool {
        self.port_input || self.port_output
    }

    pub fn is_inout(&self) -> bool {
        self.port_input && self.port_output
    }

    pub fn sig(&self) -> SigSpec {
        SigSpec::from_wire(self)
    }

    pub fn bit(&self, offset: usize) -> SigBit {
        assert!(offset < self.width, "bit {offset} out of range for wire {} of width {}", self.name, self.width);
        SigBit::Wire(self.id, offset)
    }
}
