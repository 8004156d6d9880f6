use std::collections::BTreeMap;
use std::fmt::Display;

use crate::{Design, Logic, Module, ParamValue, SigBit, SigSpec, Wire, WireId};

pub(crate) fn write_string(f: &mut std::fmt::Formatter, str: &str) -> std::fmt::Result {
    write!(f, "\"")?;
    for chr in str.chars() {
        match chr {
            '"' | '\\' => write!(f, "\\{chr}")?,
            '\n' => write!(f, "\\n")?,
            '\t' => write!(f, "\\t")?,
            _ => write!(f, "{chr}")?,
        }
    }
    write!(f, "\"")
}

fn write_id(f: &mut std::fmt::Formatter, name: &str) -> std::fmt::Result {
    if name.starts_with('$') || name.starts_with('\\') { write!(f, "{name}") } else { write!(f, "\\{name}") }
}

fn write_attributes(f: &mut std::fmt::Formatter, indent: &str, attributes: &BTreeMap<String, ParamValue>) -> std::fmt::Result {
    for (name, value) in attributes {
        write!(f, "{indent}attribute ")?;
        write_id(f, name)?;
        writeln!(f, " {value}")?;
    }
    Ok(())
}

enum Chunk {
    Const(Vec<Logic>),
    Wire(WireId, usize, usize),
}

fn chunks(sig: &SigSpec) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    for bit in sig.iter() {
        match (chunks.last_mut(), bit) {
            (Some(Chunk::Const(bits)), SigBit::Const(logic)) => bits.push(logic),
            (Some(Chunk::Wire(wire, start, len)), SigBit::Wire(bit_wire, offset))
                if *wire == bit_wire && *start + *len == offset =>
            {
                *len += 1;
            }
            (_, SigBit::Const(logic)) => chunks.push(Chunk::Const(vec![logic])),
            (_, SigBit::Wire(wire, offset)) => chunks.push(Chunk::Wire(wire, offset, 1)),
        }
    }
    chunks
}

impl Wire {
    /// Index of the bit at `offset` as written in the HDL source.
    fn source_index(&self, offset: usize) -> i64 {
        let offset = if self.upto { self.width - 1 - offset } else { offset };
        offset as i64 + self.start_offset as i64
    }
}

impl Module {
    fn write_chunk(&self, f: &mut std::fmt::Formatter, chunk: &Chunk) -> std::fmt::Result {
        match *chunk {
            Chunk::Const(ref bits) => {
                write!(f, "{}'", bits.len())?;
                for bit in bits.iter().rev() {
                    write!(f, "{bit}")?;
                }
                Ok(())
            }
            Chunk::Wire(id, start, len) => {
                let Some(wire) = self.get_wire(id) else {
                    return write!(f, "<invalid {id:?}>");
                };
                write_id(f, wire.name())?;
                if start == 0 && len == wire.width {
                    Ok(())
                } else if len == 1 {
                    write!(f, " [{}]", wire.source_index(start))
                } else {
                    let (msb, lsb) = (wire.source_index(start + len - 1), wire.source_index(start));
                    write!(f, " [{msb}:{lsb}]")
                }
            }
        }
    }

    fn write_sig(&self, f: &mut std::fmt::Formatter, sig: &SigSpec) -> std::fmt::Result {
        let chunks = chunks(sig);
        match chunks.as_slice() {
            [] => write!(f, "{{ }}"),
            [chunk] => self.write_chunk(f, chunk),
            chunks => {
                write!(f, "{{")?;
                for chunk in chunks.iter().rev() {
                    write!(f, " ")?;
                    self.write_chunk(f, chunk)?;
                }
                write!(f, " }}")
            }
        }
    }

    /// Formats a signal using the wire names of this module.
    pub fn display_sig<'a>(&'a self, sig: &'a SigSpec) -> impl Display + 'a {
        struct DisplaySig<'a>(&'a Module, &'a SigSpec);

        impl Display for DisplaySig<'_> {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                self.0.write_sig(f, self.1)
            }
        }

        DisplaySig(self, sig)
    }

    fn write_wire(&self, f: &mut std::fmt::Formatter, wire: &Wire) -> std::fmt::Result {
        write_attributes(f, "  ", &wire.attributes)?;
        write!(f, "  wire")?;
        if wire.width != 1 {
            write!(f, " width {}", wire.width)?;
        }
        if wire.upto {
            write!(f, " upto")?;
        }
        if wire.start_offset != 0 {
            write!(f, " offset {}", wire.start_offset)?;
        }
        match (wire.port_input, wire.port_output) {
            (true, true) => write!(f, " inout {}", wire.port_id)?,
            (true, false) => write!(f, " input {}", wire.port_id)?,
            (false, true) => write!(f, " output {}", wire.port_id)?,
            (false, false) => (),
        }
        write!(f, " ")?;
        write_id(f, wire.name())?;
        writeln!(f)
    }
}

impl Display for Module {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write_attributes(f, "", &self.attributes)?;
        write!(f, "module ")?;
        write_id(f, self.name())?;
        writeln!(f)?;
        for wire in self.wires() {
            self.write_wire(f, wire)?;
        }
        for cell in self.cells() {
            write_attributes(f, "  ", &cell.attributes)?;
            write!(f, "  cell {} ", cell.kind)?;
            write_id(f, cell.name())?;
            writeln!(f)?;
            for (name, value) in &cell.parameters {
                write!(f, "    parameter ")?;
                write_id(f, name)?;
                writeln!(f, " {value}")?;
            }
            for (name, sig) in cell.connections() {
                write!(f, "    connect ")?;
                write_id(f, name)?;
                writeln!(f, " {}", self.display_sig(sig))?;
            }
            writeln!(f, "  end")?;
        }
        for connection in self.connections() {
            writeln!(f, "  connect {} {}", self.display_sig(&connection.target), self.display_sig(&connection.source))?;
        }
        writeln!(f, "end")
    }
}

impl Display for Design {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (index, module) in self.modules().enumerate() {
            if index != 0 {
                writeln!(f)?;
            }
            write!(f, "{module}")?;
        }
        Ok(())
    }
}
