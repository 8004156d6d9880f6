use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

use indexmap::IndexMap;

use crate::{ParamValue, SigMap, SigSpec};

/// The kind of a cell. Only the kinds that can produce a high-impedance output are distinguished;
/// everything else is carried opaquely by its type name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CellKind {
    /// `$mux`: word-level 2:1 multiplexer, `Y = S ? B : A`.
    Mux,
    /// `$pmux`: parallel multiplexer with a one-hot select, `Y = A` if no bit of `S` is set.
    Pmux,
    /// `$_MUX_`: bit-level 2:1 multiplexer.
    MuxGate,
    /// `$_TBUF_`: bit-level tristate buffer, `Y = E ? A : z`.
    TbufGate,
    /// `$tribuf`: word-level tristate buffer, `Y = EN ? A : z`.
    Tribuf,
    Other(String),
}

impl CellKind {
    pub fn type_name(&self) -> &str {
        match self {
            CellKind::Mux => "$mux",
            CellKind::Pmux => "$pmux",
            CellKind::MuxGate => "$_MUX_",
            CellKind::TbufGate => "$_TBUF_",
            CellKind::Tribuf => "$tribuf",
            CellKind::Other(name) => name,
        }
    }

    /// Buffers drive high impedance whenever they are disabled; multiplexers only do when one of
    /// their data inputs carries a `z` constant.
    pub fn is_always_tristate(&self) -> bool {
        matches!(self, CellKind::TbufGate | CellKind::Tribuf)
    }

    pub fn is_mux(&self) -> bool {
        matches!(self, CellKind::Mux | CellKind::Pmux | CellKind::MuxGate)
    }

    pub fn data_ports(&self) -> &'static [&'static str] {
        match self {
            CellKind::Mux | CellKind::Pmux | CellKind::MuxGate => &["A", "B"],
            CellKind::TbufGate | CellKind::Tribuf => &["A"],
            CellKind::Other(_) => &[],
        }
    }

    /// The port that decides whether the cell actively drives its output.
    pub fn control_port(&self) -> Option<&'static str> {
        match self {
            CellKind::Mux | CellKind::Pmux | CellKind::MuxGate => Some("S"),
            CellKind::TbufGate => Some("E"),
            CellKind::Tribuf => Some("EN"),
            CellKind::Other(_) => None,
        }
    }

    /// Output ports of the cell; empty for cells whose port directions are not known.
    pub fn output_ports(&self) -> &'static [&'static str] {
        match self {
            CellKind::Other(_) => &[],
            _ => &["Y"],
        }
    }
}

impl From<&str> for CellKind {
    fn from(name: &str) -> Self {
        match name {
            "$mux" => CellKind::Mux,
            "$pmux" => CellKind::Pmux,
            "$_MUX_" => CellKind::MuxGate,
            "$_TBUF_" => CellKind::TbufGate,
            "$tribuf" => CellKind::Tribuf,
            other => CellKind::Other(other.to_owned()),
        }
    }
}

impl FromStr for CellKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(CellKind::from(s))
    }
}

impl Display for CellKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

/// An instantiated primitive with named connection points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub(crate) name: String,
    pub kind: CellKind,
    pub parameters: BTreeMap<String, ParamValue>,
    pub attributes: BTreeMap<String, ParamValue>,
    pub(crate) connections: IndexMap<String, SigSpec>,
}

impl Cell {
    pub(crate) fn new(name: String, kind: CellKind) -> Self {
        Cell {
            name,
            kind,
            parameters: BTreeMap::new(),
            attributes: BTreeMap::new(),
            connections: IndexMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn port(&self, name: &str) -> Option<&SigSpec> {
        self.connections.get(name)
    }

    pub fn set_port(&mut self, name: impl Into<String>, sig: impl Into<SigSpec>) -> &mut Self {
        self.connections.insert(name.into(), sig.into());
        self
    }

    pub fn set_param(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> &mut Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    /// Whether the output of this cell can be high impedance: always for buffers, and for
    /// multiplexers whenever a data input canonicalizes to a `z` bit.
    pub fn is_tristate_capable(&self, sigmap: &SigMap) -> bool {
        if self.kind.is_always_tristate() {
            return true;
        }
        self.kind.is_mux()
            && self.kind.data_ports().iter().filter_map(|&port| self.port(port)).any(|sig| sigmap.apply(sig).has_hiz())
    }

    pub fn connections(&self) -> impl Iterator<Item = (&str, &SigSpec)> + '_ {
        self.connections.iter().map(|(name, sig)| (name.as_str(), sig))
    }

    pub fn connections_mut(&mut self) -> impl Iterator<Item = (&str, &mut SigSpec)> + '_ {
        self.connections.iter_mut().map(|(name, sig)| (name.as_str(), sig))
    }
}
