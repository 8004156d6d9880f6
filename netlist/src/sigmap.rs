use std::collections::HashMap;

use crate::{Module, SigBit, SigSpec};

/// Maps every signal bit to the canonical representative of the set of bits it is connected to.
///
/// Built from the connections of a single module. When two sets are merged the representative of
/// the source side wins, except that a constant always becomes the representative of its set, so
/// a wire tied to `z` canonicalizes to `z`.
#[derive(Debug, Clone, Default)]
pub struct SigMap {
    parent: HashMap<SigBit, SigBit>,
}

impl SigMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_module(module: &Module) -> Self {
        let mut sigmap = SigMap::new();
        for connection in module.connections() {
            sigmap.add(&connection.target, &connection.source);
        }
        sigmap
    }

    fn find(&self, mut bit: SigBit) -> SigBit {
        while let Some(&parent) = self.parent.get(&bit) {
            bit = parent;
        }
        bit
    }

    fn find_compress(&mut self, bit: SigBit) -> SigBit {
        let root = self.find(bit);
        let mut bit = bit;
        while bit != root {
            let next = self.parent[&bit];
            self.parent.insert(bit, root);
            bit = next;
        }
        root
    }

    pub fn add_bit(&mut self, lft: SigBit, rgt: SigBit) {
        let lft = self.find_compress(lft);
        let rgt = self.find_compress(rgt);
        if lft == rgt || (lft.is_const() && rgt.is_const()) {
            return;
        }
        if lft.is_const() && !rgt.is_const() {
            self.parent.insert(rgt, lft);
        } else {
            self.parent.insert(lft, rgt);
        }
    }

    /// Records that `lft` and `rgt` are the same net, bit by bit.
    pub fn add(&mut self, lft: &SigSpec, rgt: &SigSpec) {
        assert_eq!(lft.len(), rgt.len());
        for (lft, rgt) in lft.iter().zip(rgt.iter()) {
            self.add_bit(lft, rgt);
        }
    }

    pub fn apply_bit(&self, bit: SigBit) -> SigBit {
        self.find(bit)
    }

    pub fn apply(&self, sig: &SigSpec) -> SigSpec {
        sig.map_bits(|bit| self.find(bit))
    }
}
