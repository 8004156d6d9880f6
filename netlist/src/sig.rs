use std::{
    borrow::Cow,
    fmt::Debug,
    ops::{Index, IndexMut, RangeBounds},
    slice::SliceIndex,
};

use crate::{Const, Logic, Wire, WireId};

/// A single bit of a signal: either a constant or one bit of a wire.
///
/// Wire bits refer to wires by [`WireId`], which does not change when a wire is renamed; the offset
/// counts from the least significant bit of the wire and ignores its `start_offset`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SigBit {
    Const(Logic),
    Wire(WireId, usize),
}

impl SigBit {
    pub const ZERO: SigBit = SigBit::Const(Logic::Zero);
    pub const ONE: SigBit = SigBit::Const(Logic::One);
    pub const UNDEF: SigBit = SigBit::Const(Logic::Undef);
    pub const HIZ: SigBit = SigBit::Const(Logic::HiZ);

    pub fn as_const(self) -> Option<Logic> {
        match self {
            SigBit::Const(bit) => Some(bit),
            SigBit::Wire(..) => None,
        }
    }

    pub fn is_const(self) -> bool {
        self.as_const().is_some()
    }

    pub fn wire(self) -> Option<WireId> {
        match self {
            SigBit::Const(_) => None,
            SigBit::Wire(wire, _) => Some(wire),
        }
    }

    pub fn is_wire(self, wire: WireId) -> bool {
        self.wire() == Some(wire)
    }

    pub fn repeat(self, count: usize) -> SigSpec {
        SigSpec::from_iter(std::iter::repeat_n(self, count))
    }
}

impl From<Logic> for SigBit {
    fn from(bit: Logic) -> Self {
        SigBit::Const(bit)
    }
}

impl From<bool> for SigBit {
    fn from(value: bool) -> Self {
        SigBit::Const(value.into())
    }
}

impl From<&SigBit> for SigBit {
    fn from(bit: &SigBit) -> Self {
        *bit
    }
}

impl Debug for SigBit {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            SigBit::Const(bit) => write!(f, "SigBit::Const({bit})"),
            SigBit::Wire(wire, offset) => write!(f, "SigBit::Wire({wire:?}, {offset})"),
        }
    }
}

#[derive(Clone)]
enum SigRepr {
    None,
    Some(SigBit),
    Many(Vec<SigBit>),
}

impl SigRepr {
    fn as_slice(&self) -> &[SigBit] {
        match self {
            SigRepr::None => &[],
            SigRepr::Some(bit) => std::slice::from_ref(bit),
            SigRepr::Many(bits) => bits.as_slice(),
        }
    }

    fn as_slice_mut(&mut self) -> &mut [SigBit] {
        match self {
            SigRepr::None => &mut [],
            SigRepr::Some(bit) => std::slice::from_mut(bit),
            SigRepr::Many(bits) => bits.as_mut_slice(),
        }
    }

    fn push(&mut self, new_bit: SigBit) {
        match self {
            SigRepr::None => *self = SigRepr::Some(new_bit),
            SigRepr::Some(bit) => *self = SigRepr::Many(vec![*bit, new_bit]),
            SigRepr::Many(bits) => bits.push(new_bit),
        }
    }
}

impl PartialEq for SigRepr {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice().eq(other.as_slice())
    }
}

impl Eq for SigRepr {}

impl PartialOrd for SigRepr {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SigRepr {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.as_slice().cmp(other.as_slice())
    }
}

impl std::hash::Hash for SigRepr {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state);
    }
}

/// A signal expression: a (possibly empty) concatenation of [`SigBit`]s, LSB first.
///
/// This is what either side of a module connection and every cell port is bound to.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SigSpec(SigRepr);

impl SigSpec {
    pub fn new() -> Self {
        SigSpec(SigRepr::None)
    }

    /// All bits of `wire`, in order.
    pub fn from_wire(wire: &Wire) -> Self {
        SigSpec::from_wire_id(wire.id(), wire.width)
    }

    pub fn from_wire_id(wire: WireId, width: usize) -> Self {
        SigSpec::from_iter((0..width).map(|offset| SigBit::Wire(wire, offset)))
    }

    pub fn from_const(value: &Const) -> Self {
        SigSpec::from_iter(value.iter().map(SigBit::Const))
    }

    pub fn hiz(width: usize) -> Self {
        SigBit::HIZ.repeat(width)
    }

    pub fn len(&self) -> usize {
        self.0.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.as_slice().is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = SigBit> + ExactSizeIterator + '_ {
        self.0.as_slice().iter().copied()
    }

    pub fn iter_mut(&mut self) -> impl DoubleEndedIterator<Item = &mut SigBit> + ExactSizeIterator + '_ {
        self.0.as_slice_mut().iter_mut()
    }

    pub fn push(&mut self, new_bit: impl Into<SigBit>) {
        self.0.push(new_bit.into())
    }

    pub fn append<'a>(&mut self, other: impl Into<Cow<'a, SigSpec>>) {
        for bit in other.into().iter() {
            self.push(bit);
        }
    }

    pub fn as_const(&self) -> Option<Const> {
        self.iter().map(SigBit::as_const).collect::<Option<Vec<_>>>().map(Const::from)
    }

    pub fn has_hiz(&self) -> bool {
        self.iter().any(|bit| bit == SigBit::HIZ)
    }

    /// Returns the wire this signal refers to if it consists of every bit of one wire in order and
    /// nothing else. The width of the wire is not known here, so `width` must be supplied.
    pub fn as_wire(&self, width: usize) -> Option<WireId> {
        let SigBit::Wire(wire, 0) = *self.0.as_slice().first()? else {
            return None;
        };
        if self.len() != width {
            return None;
        }
        self.iter().enumerate().all(|(index, bit)| bit == SigBit::Wire(wire, index)).then_some(wire)
    }

    pub fn refers_to(&self, wire: WireId) -> bool {
        self.iter().any(|bit| bit.is_wire(wire))
    }

    pub fn concat<'a>(&self, other: impl Into<Cow<'a, SigSpec>>) -> Self {
        SigSpec::from_iter(self.iter().chain(other.into().iter()))
    }

    pub fn repeat(&self, count: usize) -> Self {
        SigSpec::from_iter((0..count).flat_map(|_| self.iter()))
    }

    /// Repeats the signal as many times as needed to cover `width` bits, then truncates to exactly
    /// `width` bits. An empty signal stays empty.
    pub fn replicate_to(&self, width: usize) -> Self {
        if self.is_empty() {
            return SigSpec::new();
        }
        SigSpec::from_iter(self.0.as_slice().iter().copied().cycle().take(width))
    }

    pub fn slice(&self, range: impl RangeBounds<usize>) -> SigSpec {
        SigSpec::from(&self[(range.start_bound().cloned(), range.end_bound().cloned())])
    }

    pub fn map_bits(&self, f: impl FnMut(SigBit) -> SigBit) -> SigSpec {
        SigSpec::from_iter(self.iter().map(f))
    }
}

impl Default for SigSpec {
    fn default() -> Self {
        SigSpec::new()
    }
}

impl Debug for SigSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "SigSpec::from_iter([")?;
        for (index, bit) in self.iter().enumerate() {
            if index != 0 {
                write!(f, ", ")?;
            }
            write!(f, "{bit:?}")?;
        }
        write!(f, "])")
    }
}

impl<I: SliceIndex<[SigBit]>> Index<I> for SigSpec {
    type Output = I::Output;

    fn index(&self, index: I) -> &Self::Output {
        &self.0.as_slice()[index]
    }
}

impl<I: SliceIndex<[SigBit]>> IndexMut<I> for SigSpec {
    fn index_mut(&mut self, index: I) -> &mut Self::Output {
        &mut self.0.as_slice_mut()[index]
    }
}

impl Extend<SigBit> for SigSpec {
    fn extend<T: IntoIterator<Item = SigBit>>(&mut self, iter: T) {
        for bit in iter {
            self.push(bit);
        }
    }
}

impl From<SigBit> for SigSpec {
    fn from(bit: SigBit) -> Self {
        SigSpec(SigRepr::Some(bit))
    }
}

impl From<Logic> for SigSpec {
    fn from(bit: Logic) -> Self {
        SigSpec::from(SigBit::Const(bit))
    }
}

impl From<&Wire> for SigSpec {
    fn from(wire: &Wire) -> Self {
        SigSpec::from_wire(wire)
    }
}

impl From<&Const> for SigSpec {
    fn from(value: &Const) -> Self {
        SigSpec::from_const(value)
    }
}

impl From<Const> for SigSpec {
    fn from(value: Const) -> Self {
        SigSpec::from_const(&value)
    }
}

impl From<&[SigBit]> for SigSpec {
    fn from(bits: &[SigBit]) -> Self {
        SigSpec::from_iter(bits.iter().copied())
    }
}

impl From<Vec<SigBit>> for SigSpec {
    fn from(bits: Vec<SigBit>) -> Self {
        SigSpec::from_iter(bits)
    }
}

impl From<SigSpec> for Cow<'_, SigSpec> {
    fn from(sig: SigSpec) -> Self {
        Cow::Owned(sig)
    }
}

impl From<SigBit> for Cow<'_, SigSpec> {
    fn from(bit: SigBit) -> Self {
        Cow::Owned(SigSpec::from(bit))
    }
}

impl<'a> From<&'a SigSpec> for Cow<'a, SigSpec> {
    fn from(sig: &'a SigSpec) -> Self {
        Cow::Borrowed(sig)
    }
}

impl FromIterator<SigBit> for SigSpec {
    fn from_iter<T: IntoIterator<Item = SigBit>>(iter: T) -> Self {
        let mut iter = iter.into_iter();
        match iter.size_hint() {
            (_, Some(0 | 1)) => {
                let mut sig = match iter.next() {
                    None => SigSpec::new(),
                    Some(bit) => SigSpec::from(bit),
                };
                for bit in iter {
                    sig.push(bit);
                }
                sig
            }
            _ => {
                let bits: Vec<SigBit> = iter.collect();
                match bits.len() {
                    0 => SigSpec::new(),
                    1 => SigSpec::from(bits[0]),
                    _ => SigSpec(SigRepr::Many(bits)),
                }
            }
        }
    }
}

impl<'a> IntoIterator for &'a SigSpec {
    type Item = SigBit;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, SigBit>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.as_slice().iter().copied()
    }
}
