use std::collections::{BTreeMap, btree_map};

use indexmap::IndexMap;

use crate::{Cell, CellKind, ParamValue, SigSpec, Wire, WireId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortDirection {
    Input,
    Output,
    Inout,
}

impl Wire {
    pub fn direction(&self) -> Option<PortDirection> {
        match (self.port_input, self.port_output) {
            (false, false) => None,
            (true, false) => Some(PortDirection::Input),
            (false, true) => Some(PortDirection::Output),
            (true, true) => Some(PortDirection::Inout),
        }
    }

    pub fn set_direction(&mut self, direction: Option<PortDirection>) {
        (self.port_input, self.port_output) = match direction {
            None => (false, false),
            Some(PortDirection::Input) => (true, false),
            Some(PortDirection::Output) => (false, true),
            Some(PortDirection::Inout) => (true, true),
        };
    }
}

/// A continuous assignment: `target` is driven by `source`. Both sides have the same width.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Connection {
    pub target: SigSpec,
    pub source: SigSpec,
}

impl Connection {
    pub fn new(target: impl Into<SigSpec>, source: impl Into<SigSpec>) -> Self {
        Connection { target: target.into(), source: source.into() }
    }
}

/// A module: wires, cells, and the connections between them.
///
/// Wires live in an arena and are addressed by [`WireId`]; the name index maps names to ids, so a
/// rename only touches the index and every [`SigSpec`] referring to the wire keeps working. Wires
/// are never removed, so ids are never reused.
#[derive(Debug, Clone)]
pub struct Module {
    name: String,
    wires: Vec<Wire>,
    wire_names: BTreeMap<String, WireId>,
    cells: IndexMap<String, Cell>,
    connections: Vec<Connection>,
    ports: Vec<WireId>,
    pub attributes: BTreeMap<String, ParamValue>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Module {
            name: name.into(),
            wires: Vec::new(),
            wire_names: BTreeMap::new(),
            cells: IndexMap::new(),
            connections: Vec::new(),
            ports: Vec::new(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn insert_wire(&mut self, wire: Wire) -> WireId {
        let id = wire.id();
        match self.wire_names.entry(wire.name.clone()) {
            btree_map::Entry::Occupied(entry) => {
                panic!("duplicate wire {} in module {}", entry.key(), self.name);
            }
            btree_map::Entry::Vacant(entry) => {
                entry.insert(id);
            }
        }
        self.wires.push(wire);
        id
    }

    fn next_wire_id(&self) -> WireId {
        WireId::from_index(self.wires.len())
    }

    pub fn add_wire(&mut self, name: impl Into<String>, width: usize) -> WireId {
        let id = self.next_wire_id();
        self.insert_wire(Wire::new(id, name.into(), width))
    }

    /// Adds a wire with the same width, offset, port position, direction, and attributes as `like`.
    pub fn add_wire_like(&mut self, name: impl Into<String>, like: WireId) -> WireId {
        let id = self.next_wire_id();
        let wire = Wire::new_like(id, name.into(), self.wire(like));
        self.insert_wire(wire)
    }

    /// Adds a port wire at the end of the port list.
    pub fn add_port(&mut self, name: impl Into<String>, width: usize, direction: PortDirection) -> WireId {
        let id = self.add_wire(name, width);
        let port_id = self.ports.len() + 1;
        let wire = self.wire_mut(id);
        wire.set_direction(Some(direction));
        wire.port_id = port_id;
        self.ports.push(id);
        id
    }

    pub fn get_wire(&self, id: WireId) -> Option<&Wire> {
        self.wires.get(id.index())
    }

    pub fn wire(&self, id: WireId) -> &Wire {
        match self.wires.get(id.index()) {
            Some(wire) => wire,
            None => panic!("no wire {id:?} in module {}", self.name),
        }
    }

    pub fn wire_mut(&mut self, id: WireId) -> &mut Wire {
        match self.wires.get_mut(id.index()) {
            Some(wire) => wire,
            None => panic!("no wire {id:?} in module {}", self.name),
        }
    }

    pub fn find_wire(&self, name: &str) -> Option<WireId> {
        self.wire_names.get(name).copied()
    }

    /// Iterates over wires in the order they were added.
    pub fn wires(&self) -> impl DoubleEndedIterator<Item = &Wire> + ExactSizeIterator + '_ {
        self.wires.iter()
    }

    pub fn sig(&self, id: WireId) -> SigSpec {
        self.wire(id).sig()
    }

    pub fn rename_wire(&mut self, id: WireId, new_name: impl Into<String>) {
        let new_name = new_name.into();
        if let Some(&other) = self.wire_names.get(&new_name) {
            if other == id {
                return;
            }
            panic!("cannot rename wire {} to {new_name} in module {}: name is taken", self.wire(id).name, self.name);
        }
        let old_name = std::mem::replace(&mut self.wire_mut(id).name, new_name.clone());
        self.wire_names.remove(&old_name);
        self.wire_names.insert(new_name, id);
    }

    /// Returns `base` if no wire or cell is called that, or else `base` with the smallest `$<n>`
    /// suffix that makes it unique.
    pub fn uniquify(&self, base: &str) -> String {
        let is_free = |name: &str| !self.wire_names.contains_key(name) && !self.cells.contains_key(name);
        if is_free(base) {
            return base.to_owned();
        }
        let mut index = 1;
        loop {
            let name = format!("{base}${index}");
            if is_free(name.as_str()) {
                return name;
            }
            index += 1;
        }
    }

    pub fn add_cell(&mut self, name: impl Into<String>, kind: impl Into<CellKind>) -> &mut Cell {
        let name = name.into();
        match self.cells.entry(name.clone()) {
            indexmap::map::Entry::Occupied(entry) => {
                panic!("duplicate cell {} in module {}", entry.key(), self.name);
            }
            indexmap::map::Entry::Vacant(entry) => entry.insert(Cell::new(name, kind.into())),
        }
    }

    pub fn cell(&self, name: &str) -> Option<&Cell> {
        self.cells.get(name)
    }

    pub fn cell_mut(&mut self, name: &str) -> Option<&mut Cell> {
        self.cells.get_mut(name)
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> + '_ {
        self.cells.values()
    }

    pub fn cells_mut(&mut self) -> impl Iterator<Item = &mut Cell> + '_ {
        self.cells.values_mut()
    }

    pub fn connect(&mut self, target: impl Into<SigSpec>, source: impl Into<SigSpec>) {
        let connection = Connection::new(target, source);
        assert_eq!(
            connection.target.len(),
            connection.source.len(),
            "width mismatch in connection in module {}",
            self.name
        );
        self.connections.push(connection);
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Replaces the whole connection list at once.
    pub fn new_connections(&mut self, connections: Vec<Connection>) {
        self.connections = connections;
    }

    /// Port wires, in port order.
    pub fn ports(&self) -> &[WireId] {
        &self.ports
    }

    pub fn port_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.ports.iter().map(|&id| self.wire(id).name())
    }

    /// Rebuilds the port list from the direction flags of the wires.
    ///
    /// Wires that already had a position keep their relative order, ahead of new ports, which are
    /// ordered by name. Wires sharing a position (such as a port and the wires created in its image)
    /// are ordered by name too. Positions are renumbered from 1; non-port wires get position 0.
    pub fn fixup_ports(&mut self) {
        let mut ports = Vec::new();
        for wire in self.wires.iter_mut() {
            if wire.is_port() {
                ports.push(wire.id());
            } else {
                wire.port_id = 0;
            }
        }
        ports.sort_by(|&lft, &rgt| {
            let (lft, rgt) = (self.wire(lft), self.wire(rgt));
            (lft.port_id == 0, lft.port_id, &lft.name).cmp(&(rgt.port_id == 0, rgt.port_id, &rgt.name))
        });
        for (index, &id) in ports.iter().enumerate() {
            self.wires[id.index()].port_id = index + 1;
        }
        self.ports = ports;
    }
}
