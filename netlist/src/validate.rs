use std::fmt::Display;

use crate::{Design, Module, SigBit, SigSpec};

/// Structural problems found in a design, as `(module name, message)` pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub problems: Vec<(String, String)>,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "design is malformed:")?;
        for (module, message) in &self.problems {
            write!(f, "\n  in module {module}: {message}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

struct ModuleValidator<'a> {
    module: &'a Module,
    problems: &'a mut Vec<(String, String)>,
}

impl ModuleValidator<'_> {
    fn err(&mut self, message: impl Into<String>) {
        self.problems.push((self.module.name().to_owned(), message.into()));
    }

    fn check_sig(&mut self, sig: &SigSpec, what: &str) {
        for bit in sig.iter() {
            let SigBit::Wire(id, offset) = bit else { continue };
            match self.module.get_wire(id) {
                None => self.err(format!("{what} refers to nonexistent wire {id:?}")),
                Some(wire) if offset >= wire.width => {
                    self.err(format!("{what} refers to bit {offset} of {}-bit wire {}", wire.width, wire.name()))
                }
                Some(_) => (),
            }
        }
    }

    fn validate(&mut self) {
        let module = self.module;
        for (index, connection) in module.connections().iter().enumerate() {
            let what = format!("connection #{index}");
            if connection.target.len() != connection.source.len() {
                self.err(format!(
                    "{what} connects {}-bit target to {}-bit source",
                    connection.target.len(),
                    connection.source.len()
                ));
            }
            self.check_sig(&connection.target, &what);
            self.check_sig(&connection.source, &what);
        }
        for cell in module.cells() {
            for (port, sig) in cell.connections() {
                self.check_sig(sig, &format!("port {port} of cell {}", cell.name()));
            }
        }
        let mut expected_ports = 0;
        for wire in module.wires() {
            if wire.is_port() {
                expected_ports += 1;
                if module.ports().get(wire.port_id.wrapping_sub(1)) != Some(&wire.id()) {
                    self.err(format!("port {} is not at position {} of the port list", wire.name(), wire.port_id));
                }
            } else if wire.port_id != 0 {
                self.err(format!("wire {} has port position {} but no direction", wire.name(), wire.port_id));
            }
        }
        if module.ports().len() != expected_ports {
            self.err(format!("port list has {} entries, expected {expected_ports}", module.ports().len()));
        }
    }
}

impl Module {
    /// Checks that all wire references are in range, connections are width-consistent, and the
    /// port list agrees with the direction flags.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut problems = Vec::new();
        ModuleValidator { module: self, problems: &mut problems }.validate();
        if problems.is_empty() { Ok(()) } else { Err(ValidationError { problems }) }
    }
}

impl Design {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut problems = Vec::new();
        for module in self.modules() {
            ModuleValidator { module, problems: &mut problems }.validate();
        }
        if problems.is_empty() { Ok(()) } else { Err(ValidationError { problems }) }
    }
}
