use inoutsplit_generic::{split_inouts, split_inouts_selected};
use inoutsplit_netlist::{
    CellKind, Connection, Design, Module, PortDirection, Selection, SigBit, SigSpec, WireId,
};

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn wire(module: &Module, name: &str) -> WireId {
    match module.find_wire(name) {
        Some(wire) => wire,
        None => panic!("no wire {name} in:\n{module}"),
    }
}

/// Sources of all connections whose target is exactly `wire`.
fn drivers(module: &Module, wire: WireId) -> Vec<SigSpec> {
    let target = module.sig(wire);
    module.connections().iter().filter(|conn| conn.target == target).map(|conn| conn.source.clone()).collect()
}

fn assert_no_inouts(design: &Design) {
    for module in design.modules() {
        assert!(!module.wires().any(|wire| wire.is_inout()), "inout left in:\n{module}");
    }
}

/// Module `M` with inout `IO` assigned from net `N`, which is driven by a multiplexer that selects
/// between `Z` and high impedance under control of `S`.
fn mux_design(width: usize) -> Design {
    let mut design = Design::new();
    let module = design.add_module("M");
    let io = module.add_port("IO", width, PortDirection::Inout);
    let n = module.add_wire("N", width);
    let z = module.add_wire("Z", width);
    let s = module.add_wire("S", 1);
    let (io, n, z, s) = (module.sig(io), module.sig(n), module.sig(z), module.sig(s));
    module
        .add_cell("T", CellKind::Mux)
        .set_param("WIDTH", width as i64)
        .set_port("A", z)
        .set_port("B", SigSpec::hiz(width))
        .set_port("S", s)
        .set_port("Y", n.clone());
    module.connect(io, n);
    design
}

#[test]
fn test_single_bit_mux() {
    init_logging();
    let mut design = mux_design(1);
    assert_eq!(split_inouts(&mut design), 1);
    let module = design.module("M").unwrap();
    assert_eq!(module.find_wire("IO"), None);
    let io_in = wire(module, "IO_$in");
    let io_out = wire(module, "IO_$out");
    let io_en = wire(module, "IO_$en");
    assert!(module.wire(io_in).port_input && !module.wire(io_in).port_output);
    for output in [io_out, io_en] {
        assert!(!module.wire(output).port_input && module.wire(output).port_output);
        assert_eq!(module.wire(output).width, 1);
    }
    assert_eq!(drivers(module, io_out), vec![module.sig(wire(module, "N"))]);
    assert_eq!(drivers(module, io_en), vec![module.sig(wire(module, "S"))]);
    assert_eq!(module.port_names().collect::<Vec<_>>(), vec!["IO_$en", "IO_$in", "IO_$out"]);
    assert_no_inouts(&design);
    assert_eq!(design.validate(), Ok(()));
}

#[test]
fn test_multi_bit_enable_replication() {
    init_logging();
    let mut design = mux_design(4);
    assert_eq!(split_inouts(&mut design), 1);
    let module = design.module("M").unwrap();
    let s = wire(module, "S");
    for name in ["IO_$in", "IO_$out", "IO_$en"] {
        assert_eq!(module.wire(wire(module, name)).width, 4);
    }
    assert_eq!(drivers(module, wire(module, "IO_$en")), vec![SigBit::Wire(s, 0).repeat(4)]);
    assert_eq!(design.validate(), Ok(()));
}

#[test]
fn test_start_offset_preserved() {
    init_logging();
    let mut design = mux_design(4);
    let module = design.module_mut("M").unwrap();
    let io = wire(module, "IO");
    module.wire_mut(io).start_offset = 2;
    split_inouts(&mut design);
    let module = design.module("M").unwrap();
    let s = wire(module, "S");
    for name in ["IO_$in", "IO_$out", "IO_$en"] {
        let wire = module.wire(wire(module, name));
        assert_eq!((wire.width, wire.start_offset), (4, 2));
    }
    assert_eq!(drivers(module, wire(module, "IO_$en")), vec![SigBit::Wire(s, 0).repeat(4)]);
}

#[test]
fn test_connections_preserved() {
    init_logging();
    let mut design = mux_design(1);
    let module = design.module_mut("M").unwrap();
    let io = wire(module, "IO");
    let x = module.add_wire("X", 1);
    let y = module.add_wire("Y", 1);
    let r = module.add_wire("R", 1);
    let (x, y, r) = (module.sig(x), module.sig(y), module.sig(r));
    let before = module.connections().to_vec();
    module.new_connections(vec![
        Connection::new(x.clone(), y.clone()),
        before[0].clone(),
        Connection::new(r.clone(), module.sig(io)),
    ]);
    split_inouts(&mut design);
    let module = design.module("M").unwrap();
    let (io_out, io_en) = (wire(module, "IO_$out"), wire(module, "IO_$en"));
    assert_eq!(
        module.connections(),
        &[
            Connection::new(x, y),
            Connection::new(module.sig(io_out), before[0].source.clone()),
            Connection::new(r, module.sig(io)),
            Connection::new(module.sig(io_en), module.sig(wire(module, "S"))),
        ]
    );
    // the reader of the pad now reads the input port
    assert_eq!(module.wire(io).name(), "IO_$in");
}

#[test]
fn test_partial_target() {
    init_logging();
    let mut design = Design::new();
    let module = design.add_module("M");
    let io = module.add_port("IO", 2, PortDirection::Inout);
    let n = module.add_wire("N", 1);
    module.connect(module.sig(io).slice(0..1), module.sig(n));
    split_inouts(&mut design);
    let module = design.module("M").unwrap();
    let io_out = wire(module, "IO_$out");
    assert_eq!(module.connections(), &[Connection::new(SigBit::Wire(io_out, 0), module.sig(n))]);
    assert!(drivers(module, wire(module, "IO_$en")).is_empty());
}

#[test]
fn test_floating_enable() {
    init_logging();
    let mut design = Design::new();
    let module = design.add_module("M");
    let io = module.add_port("IO", 2, PortDirection::Inout);
    let n = module.add_wire("N", 2);
    let a = module.add_wire("A", 2);
    let b = module.add_wire("B", 2);
    let s = module.add_wire("S", 1);
    let (n_sig, a, b, s) = (module.sig(n), module.sig(a), module.sig(b), module.sig(s));
    // an ordinary multiplexer cannot produce high impedance
    module.add_cell("T", CellKind::Mux).set_port("A", a).set_port("B", b).set_port("S", s).set_port("Y", n_sig);
    module.connect(module.sig(io), module.sig(n));
    assert_eq!(split_inouts(&mut design), 1);
    let module = design.module("M").unwrap();
    let io_en = wire(module, "IO_$en");
    assert!(wire(module, "IO_$in") == io);
    assert!(module.wire(io_en).port_output);
    assert!(!module.connections().iter().any(|conn| conn.target.refers_to(io_en)));
    assert!(!module.cells().any(|cell| cell.connections().any(|(_, sig)| sig.refers_to(io_en))));
    assert_eq!(drivers(module, wire(module, "IO_$out")), vec![module.sig(n)]);
    assert_eq!(design.validate(), Ok(()));
}

#[test]
fn test_unconnected_inout() {
    init_logging();
    let mut design = Design::new();
    design.add_module("M").add_port("IO", 3, PortDirection::Inout);
    assert_eq!(split_inouts(&mut design), 1);
    let module = design.module("M").unwrap();
    assert!(module.connections().is_empty());
    assert_eq!(module.ports().len(), 3);
    assert_no_inouts(&design);
}

#[test]
fn test_tribuf_drives_port_directly() {
    init_logging();
    let mut design = Design::new();
    let module = design.add_module("M");
    let io = module.add_port("IO", 2, PortDirection::Inout);
    let d = module.add_wire("D", 2);
    let e = module.add_wire("E", 1);
    let q = module.add_wire("Q", 2);
    let (io_sig, d, e_sig, q) = (module.sig(io), module.sig(d), module.sig(e), module.sig(q));
    module
        .add_cell("T", CellKind::Tribuf)
        .set_param("WIDTH", 2i64)
        .set_port("A", d)
        .set_port("EN", e_sig)
        .set_port("Y", io_sig.clone());
    module.connect(q, io_sig);
    split_inouts(&mut design);
    let module = design.module("M").unwrap();
    let io_out = wire(module, "IO_$out");
    assert_eq!(module.cell("T").unwrap().port("Y"), Some(&module.sig(io_out)));
    assert_eq!(drivers(module, wire(module, "IO_$en")), vec![SigBit::Wire(e, 0).repeat(2)]);
    // the connection reads the pad, so it keeps reading the input port
    assert_eq!(drivers(module, wire(module, "Q")), vec![module.sig(io)]);
    assert_eq!(design.validate(), Ok(()));
}

#[test]
fn test_tbuf_gate() {
    init_logging();
    let mut design = Design::new();
    let module = design.add_module("M");
    let io = module.add_port("IO", 1, PortDirection::Inout);
    let n = module.add_wire("N", 1);
    let e = module.add_wire("E", 1);
    let (io, n, e) = (module.sig(io), module.sig(n), module.sig(e));
    module.add_cell("T", CellKind::TbufGate).set_port("A", SigBit::ONE).set_port("E", e.clone()).set_port("Y", n.clone());
    module.connect(io, n);
    split_inouts(&mut design);
    let module = design.module("M").unwrap();
    assert_eq!(drivers(module, wire(module, "IO_$en")), vec![e]);
}

#[test]
fn test_hiz_through_alias() {
    init_logging();
    let mut design = Design::new();
    let module = design.add_module("M");
    let io = module.add_port("IO", 1, PortDirection::Inout);
    let n = module.add_wire("N", 1);
    let floating = module.add_wire("floating", 1);
    let s = module.add_wire("S", 1);
    let (io, n, floating, s) = (module.sig(io), module.sig(n), module.sig(floating), module.sig(s));
    module.connect(floating.clone(), SigSpec::hiz(1));
    module
        .add_cell("T", CellKind::MuxGate)
        .set_port("A", floating)
        .set_port("B", SigBit::ONE)
        .set_port("S", s.clone())
        .set_port("Y", n.clone());
    module.connect(io, n);
    split_inouts(&mut design);
    let module = design.module("M").unwrap();
    assert_eq!(drivers(module, wire(module, "IO_$en")), vec![s]);
}

#[test]
fn test_pmux_select_fits_port() {
    init_logging();
    let mut design = Design::new();
    let module = design.add_module("M");
    let io = module.add_port("IO", 2, PortDirection::Inout);
    let n = module.add_wire("N", 2);
    let b = module.add_wire("B", 4);
    let s = module.add_wire("S", 2);
    let (io, n, b, s) = (module.sig(io), module.sig(n), module.sig(b), module.sig(s));
    module
        .add_cell("T", CellKind::Pmux)
        .set_param("WIDTH", 2i64)
        .set_param("S_WIDTH", 2i64)
        .set_port("A", SigSpec::hiz(2))
        .set_port("B", b)
        .set_port("S", s.clone())
        .set_port("Y", n.clone());
    module.connect(io, n);
    split_inouts(&mut design);
    let module = design.module("M").unwrap();
    assert_eq!(drivers(module, wire(module, "IO_$en")), vec![s]);
    assert_eq!(design.validate(), Ok(()));
}

#[test]
fn test_last_tristate_driver_wins() {
    init_logging();
    let mut design = Design::new();
    let module = design.add_module("M");
    let io = module.add_port("IO", 1, PortDirection::Inout);
    let n1 = module.add_wire("N1", 1);
    let n2 = module.add_wire("N2", 1);
    let s1 = module.add_wire("S1", 1);
    let s2 = module.add_wire("S2", 1);
    let (io, n1, n2, s1, s2) = (module.sig(io), module.sig(n1), module.sig(n2), module.sig(s1), module.sig(s2));
    for (name, n, s) in [("T1", &n1, &s1), ("T2", &n2, &s2)] {
        module
            .add_cell(name, CellKind::TbufGate)
            .set_port("A", SigBit::ONE)
            .set_port("E", s.clone())
            .set_port("Y", n.clone());
    }
    module.connect(io.clone(), n1);
    module.connect(io, n2);
    split_inouts(&mut design);
    let module = design.module("M").unwrap();
    assert_eq!(drivers(module, wire(module, "IO_$en")), vec![s2]);
}

#[test]
fn test_fixpoint_and_idempotence() {
    init_logging();
    let mut design = Design::new();
    for name in ["A", "B"] {
        let module = design.add_module(name);
        module.add_port("clk", 1, PortDirection::Input);
        module.add_port("IO0", 1, PortDirection::Inout);
        module.add_port("IO1", 8, PortDirection::Inout);
        module.add_port("out", 1, PortDirection::Output);
    }
    assert_eq!(split_inouts(&mut design), 4);
    assert_no_inouts(&design);
    assert_eq!(design.validate(), Ok(()));
    let module = design.module("B").unwrap();
    assert_eq!(
        module.port_names().collect::<Vec<_>>(),
        vec!["clk", "IO0_$en", "IO0_$in", "IO0_$out", "IO1_$en", "IO1_$in", "IO1_$out", "out"]
    );
    let before = design.to_string();
    assert_eq!(split_inouts(&mut design), 0);
    assert_eq!(design.to_string(), before);
}

#[test]
fn test_selection() {
    init_logging();
    let mut design = Design::new();
    for name in ["A", "B"] {
        let module = design.add_module(name);
        module.add_port("IO0", 1, PortDirection::Inout);
        module.add_port("IO1", 1, PortDirection::Inout);
    }
    let selection = Selection::none().select_module("A").select_wire("B", "IO1");
    assert_eq!(split_inouts_selected(&mut design, &selection), 3);
    let module = design.module("B").unwrap();
    assert!(module.wire(wire(module, "IO0")).is_inout());
    assert!(module.find_wire("IO1").is_none());
    assert_eq!(module.port_names().collect::<Vec<_>>(), vec!["IO0", "IO1_$en", "IO1_$in", "IO1_$out"]);
    assert!(design.module("A").unwrap().find_wire("IO0_$in").is_some());

    assert_eq!(split_inouts_selected(&mut design, &Selection::none()), 0);
    assert_eq!(split_inouts(&mut design), 1);
    assert_no_inouts(&design);
}

#[test]
fn test_name_collision() {
    init_logging();
    let mut design = Design::new();
    let module = design.add_module("M");
    let io = module.add_port("IO", 1, PortDirection::Inout);
    let taken = module.add_wire("IO_$out", 1);
    module.add_wire("IO_$in", 1);
    split_inouts(&mut design);
    let module = design.module("M").unwrap();
    assert_eq!(module.wire(taken).name(), "IO_$out");
    assert!(!module.wire(taken).is_port());
    assert!(module.wire(wire(module, "IO_$out$1")).port_output);
    assert_eq!(module.wire(io).name(), "IO_$in$1");
    assert!(module.wire(io).port_input);
    assert_no_inouts(&design);
    assert_eq!(design.validate(), Ok(()));
}

#[test]
fn test_output_through_alias_chain() {
    init_logging();
    let mut design = Design::new();
    let module = design.add_module("M");
    let io = module.add_port("IO", 1, PortDirection::Inout);
    let n = module.add_wire("N", 1);
    let ty = module.add_wire("Ty", 1);
    let z = module.add_wire("Z", 1);
    let s = module.add_wire("S", 1);
    let (io, n, ty, z, s) = (module.sig(io), module.sig(n), module.sig(ty), module.sig(z), module.sig(s));
    module
        .add_cell("T", CellKind::Mux)
        .set_param("WIDTH", 1i64)
        .set_port("A", z)
        .set_port("B", SigSpec::hiz(1))
        .set_port("S", s.clone())
        .set_port("Y", ty.clone());
    module.connect(n.clone(), ty);
    module.connect(io, n.clone());
    split_inouts(&mut design);
    let module = design.module("M").unwrap();
    assert_eq!(drivers(module, wire(module, "IO_$out")), vec![n]);
    assert_eq!(drivers(module, wire(module, "IO_$en")), vec![s]);
}

#[test]
fn test_select_through_alias() {
    init_logging();
    let mut design = Design::new();
    let module = design.add_module("M");
    let io = module.add_port("IO", 2, PortDirection::Inout);
    let n = module.add_wire("N", 2);
    let s = module.add_wire("S", 1);
    let sel = module.add_wire("sel", 1);
    let (io, n, s, sel_sig) = (module.sig(io), module.sig(n), module.sig(s), module.sig(sel));
    module.connect(s.clone(), sel_sig);
    module
        .add_cell("T", CellKind::Mux)
        .set_param("WIDTH", 2i64)
        .set_port("A", SigSpec::hiz(2))
        .set_port("B", SigSpec::from_iter([SigBit::ONE, SigBit::ZERO]))
        .set_port("S", s)
        .set_port("Y", n.clone());
    module.connect(io, n);
    split_inouts(&mut design);
    let module = design.module("M").unwrap();
    assert_eq!(drivers(module, wire(module, "IO_$en")), vec![SigBit::Wire(sel, 0).repeat(2)]);
}

#[test]
fn test_separate_enables_per_port() {
    init_logging();
    let mut design = Design::new();
    let module = design.add_module("M");
    let io1 = module.add_port("IO1", 1, PortDirection::Inout);
    let io2 = module.add_port("IO2", 1, PortDirection::Inout);
    let n1 = module.add_wire("N1", 1);
    let n2 = module.add_wire("N2", 1);
    let s1 = module.add_wire("S1", 1);
    let s2 = module.add_wire("S2", 1);
    let (io1, io2, n1, n2, s1, s2) =
        (module.sig(io1), module.sig(io2), module.sig(n1), module.sig(n2), module.sig(s1), module.sig(s2));
    module.add_cell("T1", CellKind::TbufGate).set_port("A", SigBit::ONE).set_port("E", s1.clone()).set_port("Y", n1.clone());
    module
        .add_cell("T2", CellKind::MuxGate)
        .set_port("A", SigBit::HIZ)
        .set_port("B", SigBit::ZERO)
        .set_port("S", s2.clone())
        .set_port("Y", n2.clone());
    module.connect(io1, n1.clone());
    module.connect(io2, n2.clone());
    assert_eq!(split_inouts(&mut design), 2);
    let module = design.module("M").unwrap();
    assert_eq!(drivers(module, wire(module, "IO1_$out")), vec![n1]);
    assert_eq!(drivers(module, wire(module, "IO2_$out")), vec![n2]);
    assert_eq!(drivers(module, wire(module, "IO1_$en")), vec![s1]);
    assert_eq!(drivers(module, wire(module, "IO2_$en")), vec![s2]);
    assert_eq!(design.validate(), Ok(()));
}

/// Module `M` with a 2-bit inout `IO` assigned from `N`, where each bit of `N` listed in `driven` is
/// driven by its own `$_TBUF_` gate enabled by `E<bit>`.
fn bitwise_tbuf_design(driven: &[usize]) -> Design {
    let mut design = Design::new();
    let module = design.add_module("M");
    let io = module.add_port("IO", 2, PortDirection::Inout);
    let n = module.add_wire("N", 2);
    for &bit in driven {
        let e = module.add_wire(format!("E{bit}"), 1);
        let (e, y) = (module.sig(e), SigBit::Wire(n, bit));
        module.add_cell(format!("T{bit}"), CellKind::TbufGate).set_port("A", SigBit::ONE).set_port("E", e).set_port("Y", y);
    }
    module.connect(module.sig(io), module.sig(n));
    design
}

#[test]
fn test_bitwise_tbuf_gates() {
    init_logging();
    let mut design = bitwise_tbuf_design(&[0, 1]);
    split_inouts(&mut design);
    let module = design.module("M").unwrap();
    let (e0, e1) = (wire(module, "E0"), wire(module, "E1"));
    assert_eq!(
        drivers(module, wire(module, "IO_$en")),
        vec![SigSpec::from_iter([SigBit::Wire(e0, 0), SigBit::Wire(e1, 0)])]
    );
    assert_eq!(design.validate(), Ok(()));
}

#[test]
fn test_bitwise_tbuf_gates_partial() {
    init_logging();
    let mut design = bitwise_tbuf_design(&[1]);
    split_inouts(&mut design);
    let module = design.module("M").unwrap();
    let io_en = wire(module, "IO_$en");
    let enables =
        module.connections().iter().filter(|conn| conn.target.refers_to(io_en)).cloned().collect::<Vec<_>>();
    assert_eq!(enables, vec![Connection::new(SigBit::Wire(io_en, 1), SigBit::Wire(wire(module, "E1"), 0))]);
    assert_eq!(design.validate(), Ok(()));
}
