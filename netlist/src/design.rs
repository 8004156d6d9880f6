use indexmap::{IndexMap, map::Entry};

use crate::{Module, Selection};

/// A collection of modules, keyed by name, in the order they were added.
#[derive(Debug, Clone, Default)]
pub struct Design {
    modules: IndexMap<String, Module>,
}

impl Design {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_module(&mut self, name: impl Into<String>) -> &mut Module {
        let name = name.into();
        match self.modules.entry(name) {
            Entry::Occupied(entry) => panic!("duplicate module {}", entry.key()),
            Entry::Vacant(entry) => {
                let module = Module::new(entry.key().clone());
                entry.insert(module)
            }
        }
    }

    pub fn module(&self, name: &str) -> Option<&Module> {
        self.modules.get(name)
    }

    pub fn module_mut(&mut self, name: &str) -> Option<&mut Module> {
        self.modules.get_mut(name)
    }

    pub fn modules(&self) -> impl Iterator<Item = &Module> + '_ {
        self.modules.values()
    }

    pub fn modules_mut(&mut self) -> impl Iterator<Item = &mut Module> + '_ {
        self.modules.values_mut()
    }

    pub fn module_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.modules.keys().map(String::as_str)
    }

    /// Names of the modules that are wholly or partially selected.
    pub fn selected_module_names(&self, selection: &Selection) -> Vec<String> {
        self.module_names().filter(|name| selection.selects_module(name)).map(str::to_owned).collect()
    }
}
