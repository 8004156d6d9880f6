use std::collections::{BTreeMap, BTreeSet};

/// What part of a module is selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleSelection {
    Whole,
    Wires(BTreeSet<String>),
}

/// Restricts which modules, and which wires within them, a pass may touch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    All,
    Some(BTreeMap<String, ModuleSelection>),
}

impl Selection {
    pub fn none() -> Self {
        Selection::Some(BTreeMap::new())
    }

    /// Selects the whole of `module`.
    pub fn select_module(mut self, module: impl Into<String>) -> Self {
        if let Selection::Some(modules) = &mut self {
            modules.insert(module.into(), ModuleSelection::Whole);
        }
        self
    }

    /// Selects a single wire of `module`. Has no effect if the module is already wholly selected.
    pub fn select_wire(mut self, module: impl Into<String>, wire: impl Into<String>) -> Self {
        if let Selection::Some(modules) = &mut self {
            match modules.entry(module.into()).or_insert_with(|| ModuleSelection::Wires(BTreeSet::new())) {
                ModuleSelection::Whole => (),
                ModuleSelection::Wires(wires) => {
                    wires.insert(wire.into());
                }
            }
        }
        self
    }

    pub fn selects_module(&self, module: &str) -> bool {
        match self {
            Selection::All => true,
            Selection::Some(modules) => modules.contains_key(module),
        }
    }

    pub fn selects_whole_module(&self, module: &str) -> bool {
        match self {
            Selection::All => true,
            Selection::Some(modules) => matches!(modules.get(module), Some(ModuleSelection::Whole)),
        }
    }

    pub fn selects_wire(&self, module: &str, wire: &str) -> bool {
        match self {
            Selection::All => true,
            Selection::Some(modules) => match modules.get(module) {
                None => false,
                Some(ModuleSelection::Whole) => true,
                Some(ModuleSelection::Wires(wires)) => wires.contains(wire),
            },
        }
    }
}

#[cfg(test)]
mod test {
    use crate::Selection;

    #[test]
    fn test_selection() {
        let selection = Selection::none().select_module("a").select_wire("b", "io").select_wire("a", "x");
        assert!(selection.selects_module("a"));
        assert!(selection.selects_module("b"));
        assert!(!selection.selects_module("c"));
        assert!(selection.selects_wire("a", "anything"));
        assert!(selection.selects_wire("b", "io"));
        assert!(!selection.selects_wire("b", "other"));
        assert!(selection.selects_whole_module("a"));
        assert!(!selection.selects_whole_module("b"));
        assert!(Selection::default().selects_wire("c", "d"));
    }
}
