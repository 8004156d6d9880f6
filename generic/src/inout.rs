use std::collections::HashMap;

use indexmap::{IndexMap, IndexSet};
use tracing::{debug, trace, warn};

use inoutsplit_netlist::{Connection, Module, PortDirection, Selection, SigBit, SigMap, SigSpec, Wire, WireId};

pub const INPUT_SUFFIX: &str = "_$in";
pub const OUTPUT_SUFFIX: &str = "_$out";
pub const ENABLE_SUFFIX: &str = "_$en";

/// An inout port being replaced, and the wires replacing it. Only lives for one iteration.
#[derive(Debug)]
struct InoutPort {
    wire: WireId,
    output: WireId,
    enable: WireId,
    /// Canonical signals that drive the port through connections targeting it.
    bound: Vec<SigSpec>,
}

fn find_inout_ports(module: &Module, selection: &Selection) -> Vec<WireId> {
    module
        .wires()
        .filter(|wire| wire.is_inout() && selection.selects_wire(module.name(), wire.name()))
        .map(Wire::id)
        .collect()
}

/// Maps the canonical output of every tristate-capable cell to its canonical control signal.
fn find_enables(module: &Module, sigmap: &SigMap) -> HashMap<SigSpec, SigSpec> {
    let mut enables = HashMap::new();
    for cell in module.cells() {
        if !cell.is_tristate_capable(sigmap) {
            continue;
        }
        let control = cell.kind.control_port().and_then(|port| cell.port(port));
        let (Some(output), Some(control)) = (cell.port("Y"), control) else {
            debug!(module = module.name(), cell = cell.name(), "tristate cell has no output or control port");
            continue;
        };
        let output = sigmap.apply(output);
        let control = sigmap.apply(control);
        debug!(
            module = module.name(),
            cell = cell.name(),
            "{} is driven when {} is active",
            module.display_sig(&output),
            module.display_sig(&control)
        );
        if let Some(previous) = enables.insert(output.clone(), control) {
            debug!(
                module = module.name(),
                "{} has several tristate drivers, dropping enable {}",
                module.display_sig(&output),
                module.display_sig(&previous)
            );
        }
    }
    enables
}

/// Records, for each port, the signals assigned to it by connections whose target is the whole
/// port.
fn find_bound_signals(module: &Module, sigmap: &SigMap, ports: &mut IndexMap<WireId, InoutPort>) {
    let mut owners = HashMap::new();
    for connection in module.connections() {
        let Some(wire) = connection.target.as_wire(connection.target.len()) else {
            continue;
        };
        let Some(port) = ports.get_mut(&wire) else {
            continue;
        };
        if module.wire(wire).width != connection.target.len() {
            continue;
        }
        let source = sigmap.apply(&connection.source);
        if let Some(&other) = owners.get(&source) {
            if other != wire {
                debug!(
                    module = module.name(),
                    "{} drives both {} and {}",
                    module.display_sig(&source),
                    module.wire(other).name(),
                    module.wire(wire).name()
                );
            }
        } else {
            owners.insert(source.clone(), wire);
        }
        port.bound.push(source);
    }
}

fn add_output_like(module: &mut Module, like: WireId, name: String) -> WireId {
    let unique = module.uniquify(&name);
    if unique != name {
        warn!(module = module.name(), "wire {name} already exists, using {unique} instead");
    }
    let wire = module.add_wire_like(unique, like);
    module.wire_mut(wire).set_direction(Some(PortDirection::Output));
    wire
}

fn add_port_wires(module: &mut Module, wire: WireId) -> InoutPort {
    let name = module.wire(wire).name().to_owned();
    let output = add_output_like(module, wire, format!("{name}{OUTPUT_SUFFIX}"));
    let enable = add_output_like(module, wire, format!("{name}{ENABLE_SUFFIX}"));
    InoutPort { wire, output, enable, bound: Vec::new() }
}

/// Signals that may be the output of the cell driving `port`: what is assigned to it, and the port
/// itself.
fn enable_keys(module: &Module, port: &InoutPort, sigmap: &SigMap) -> IndexSet<SigSpec> {
    let mut keys = IndexSet::new();
    keys.extend(port.bound.iter().cloned());
    keys.insert(sigmap.apply(&module.sig(port.wire)));
    keys
}

/// Finds a single tristate driver for the whole port. Returns its control signal, replicated to
/// the width of the port.
fn find_word_enable(
    module: &Module,
    port: &InoutPort,
    sigmap: &SigMap,
    enables: &HashMap<SigSpec, SigSpec>,
) -> Option<SigSpec> {
    let width = module.wire(port.wire).width;
    let mut enable_source: Option<&SigSpec> = None;
    for key in &enable_keys(module, port, sigmap) {
        let Some(control) = enables.get(key) else { continue };
        match enable_source {
            None => enable_source = Some(control),
            Some(first) if first != control => {
                warn!(
                    module = module.name(),
                    "{} has tristate drivers with different enables, ignoring {}",
                    module.wire(port.wire).name(),
                    module.display_sig(control)
                );
            }
            Some(_) => (),
        }
    }
    let control = enable_source?;
    if control.len() != 1 {
        debug!(
            module = module.name(),
            "enable {} of {} is {} bits wide, replicating it bitwise",
            module.display_sig(control),
            module.wire(port.wire).name(),
            control.len()
        );
    }
    Some(sigmap.apply(control).replicate_to(width))
}

/// Finds single-bit tristate drivers, such as `$_TBUF_` gates, for individual bits of the port.
/// Returns the offsets of the bits that have one, with their control bits.
fn find_bit_enables(
    module: &Module,
    port: &InoutPort,
    sigmap: &SigMap,
    enables: &HashMap<SigSpec, SigSpec>,
) -> Vec<(usize, SigBit)> {
    let keys = enable_keys(module, port, sigmap);
    let mut found = Vec::new();
    for offset in 0..module.wire(port.wire).width {
        let control = keys
            .iter()
            .filter_map(|key| enables.get(&SigSpec::from(key[offset])))
            .find(|control| control.len() == 1)
            .map(|control| sigmap.apply_bit(control[0]));
        if let Some(control) = control {
            found.push((offset, control));
        }
    }
    found
}

fn split_port(module: &mut Module, port: &InoutPort, sigmap: &SigMap, enables: &HashMap<SigSpec, SigSpec>) {
    let redirect = |bit: SigBit| match bit {
        SigBit::Wire(wire, offset) if wire == port.wire => SigBit::Wire(port.output, offset),
        bit => bit,
    };

    let mut connections = Vec::with_capacity(module.connections().len() + 1);
    for connection in module.connections() {
        if connection.target.refers_to(port.wire) {
            connections.push(Connection::new(connection.target.map_bits(redirect), connection.source.clone()));
        } else {
            connections.push(connection.clone());
        }
    }
    for cell in module.cells_mut() {
        let outputs = cell.kind.output_ports();
        for (name, sig) in cell.connections_mut() {
            if outputs.contains(&name) && sig.refers_to(port.wire) {
                *sig = sig.map_bits(redirect);
            }
        }
    }

    let enable = module.sig(port.enable);
    if let Some(source) = find_word_enable(module, port, sigmap, enables) {
        connections.push(Connection::new(enable, source));
    } else {
        let (target, source): (SigSpec, SigSpec) = find_bit_enables(module, port, sigmap, enables)
            .into_iter()
            .map(|(offset, control)| (enable[offset], control))
            .unzip();
        if target.is_empty() {
            warn!(
                module = module.name(),
                "no tristate driver found for {}, leaving {} undriven",
                module.wire(port.wire).name(),
                module.wire(port.enable).name()
            );
        } else {
            if target.len() != enable.len() {
                warn!(
                    module = module.name(),
                    "tristate drivers found for {} of {} bits of {}, leaving the rest of {} undriven",
                    target.len(),
                    enable.len(),
                    module.wire(port.wire).name(),
                    module.wire(port.enable).name()
                );
            }
            connections.push(Connection::new(target, source));
        }
    }
    module.new_connections(connections);

    let name = module.wire(port.wire).name().to_owned();
    let input_name = module.uniquify(&format!("{name}{INPUT_SUFFIX}"));
    module.wire_mut(port.wire).port_output = false;
    module.rename_wire(port.wire, input_name);
    debug!(
        module = module.name(),
        "replaced inout {name} with {}, {}, {}",
        module.wire(port.wire).name(),
        module.wire(port.output).name(),
        module.wire(port.enable).name()
    );
}

/// Replaces every selected inout port of `module` once. Returns the number of ports replaced.
pub(crate) fn split_module(module: &mut Module, selection: &Selection) -> usize {
    let candidates = find_inout_ports(module, selection);
    if candidates.is_empty() {
        return 0;
    }
    let sigmap = SigMap::from_module(module);
    let enables = find_enables(module, &sigmap);
    let mut ports: IndexMap<WireId, InoutPort> =
        candidates.into_iter().map(|wire| (wire, add_port_wires(module, wire))).collect();
    find_bound_signals(module, &sigmap, &mut ports);
    for port in ports.values() {
        split_port(module, port, &sigmap, &enables);
    }
    module.fixup_ports();
    trace!("after splitting inout ports:\n{module}");
    ports.len()
}
