use inoutsplit_netlist::{Design, Selection};
use tracing::{debug, info};

mod inout;

pub use inout::{ENABLE_SUFFIX, INPUT_SUFFIX, OUTPUT_SUFFIX};

/// Replaces every inout port in the design with an input port `<name>_$in`, an output port
/// `<name>_$out`, and an output enable port `<name>_$en`. Returns the number of ports replaced.
pub fn split_inouts(design: &mut Design) -> usize {
    split_inouts_selected(design, &Selection::All)
}

/// Like [`split_inouts`], but only touches selected modules and wires.
///
/// The enable port is driven by the select or enable signal of the tristate cell that drives the
/// port, replicated to the width of the port. If no such cell can be found, the enable port is left
/// undriven.
pub fn split_inouts_selected(design: &mut Design, selection: &Selection) -> usize {
    info!("splitting inout ports into input, output, and enable ports");
    let mut total = 0;
    for iter in 1.. {
        let mut replaced = 0;
        for module in design.modules_mut() {
            if selection.selects_module(module.name()) {
                replaced += inout::split_module(module, selection);
            }
        }
        debug!(iter, replaced, "split inouts");
        if replaced == 0 {
            break;
        }
        total += replaced;
    }
    total
}
