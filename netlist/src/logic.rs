use std::{
    fmt::{Debug, Display},
    ops::Index,
    str::FromStr,
};

/// A single constant bit: `0`, `1`, undef (`x`), or high impedance (`z`).
///
/// High impedance is only meaningful on nets that may be left undriven, such as the data inputs of
/// a multiplexer feeding a tristate pad; it is what marks a cell as tristate capable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Logic {
    Zero,
    One,
    Undef,
    HiZ,
}

impl Logic {
    pub fn from_char(chr: char) -> Result<Self, ()> {
        match chr {
            '0' => Ok(Logic::Zero),
            '1' => Ok(Logic::One),
            'x' | 'X' => Ok(Logic::Undef),
            'z' | 'Z' => Ok(Logic::HiZ),
            _ => Err(()),
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Logic::Zero => '0',
            Logic::One => '1',
            Logic::Undef => 'x',
            Logic::HiZ => 'z',
        }
    }
}

impl Display for Logic {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl From<bool> for Logic {
    fn from(value: bool) -> Self {
        match value {
            false => Logic::Zero,
            true => Logic::One,
        }
    }
}

/// A constant, represented as a sequence of [`Logic`] bits, LSB first.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Const(Vec<Logic>);

impl Const {
    pub fn new() -> Self {
        Const(Vec::new())
    }

    pub fn hiz(width: usize) -> Self {
        Const(vec![Logic::HiZ; width])
    }

    pub fn undef(width: usize) -> Self {
        Const(vec![Logic::Undef; width])
    }

    pub fn from_uint(value: u64, width: usize) -> Self {
        Const::from_iter((0..width).map(|index| Logic::from(index < 64 && value & (1 << index) != 0)))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = Logic> + ExactSizeIterator + '_ {
        self.0.iter().copied()
    }

    pub fn has_hiz(&self) -> bool {
        self.iter().any(|bit| bit == Logic::HiZ)
    }

    /// Interprets the constant as an unsigned integer, if it has no `x` or `z` bits and fits.
    pub fn as_uint(&self) -> Option<u64> {
        let mut result = 0u64;
        for (index, bit) in self.iter().enumerate() {
            match bit {
                Logic::Zero => (),
                Logic::One if index < 64 => result |= 1 << index,
                _ => return None,
            }
        }
        Some(result)
    }
}

impl Index<usize> for Const {
    type Output = Logic;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl FromIterator<Logic> for Const {
    fn from_iter<T: IntoIterator<Item = Logic>>(iter: T) -> Self {
        Const(iter.into_iter().collect())
    }
}

impl From<Vec<Logic>> for Const {
    fn from(bits: Vec<Logic>) -> Self {
        Const(bits)
    }
}

impl From<Logic> for Const {
    fn from(bit: Logic) -> Self {
        Const(vec![bit])
    }
}

impl<'a> IntoIterator for &'a Const {
    type Item = Logic;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, Logic>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter().copied()
    }
}

impl Debug for Const {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Const::from_str(\"{self}\")")
    }
}

/// Prints MSB first, in the order the bits are written in HDL sources.
impl Display for Const {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for bit in self.0.iter().rev() {
            write!(f, "{bit}")?;
        }
        Ok(())
    }
}

impl FromStr for Const {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bits = Vec::with_capacity(s.len());
        for chr in s.chars().rev() {
            bits.push(Logic::from_char(chr)?);
        }
        Ok(Const(bits))
    }
}
