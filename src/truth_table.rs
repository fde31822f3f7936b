// SPDX-License-Identifier: Apache-2.0

//! Dynamic single-output Boolean function truth tables.
//!
//! A function over `n` variables is stored as `2^n` bits packed into `u64`
//! words, where bit `i` holds the output value on the input assignment
//! encoded by `i`:
//! - `x0 = (i >> 0) & 1`
//! - `x1 = (i >> 1) & 1`
//! - ...
//!
//! That is, variable 0 is the least-significant selector bit and toggles
//! fastest. Tables with fewer than six variables use the low bits of a single
//! word; the unused high bits are always kept at zero so that derived
//! `PartialEq`/`Hash` work on the canonical representation.

use crate::lutmap_error::LutMapError;

/// Largest variable count a `TruthTable` supports.
pub const MAX_VARS: usize = 16;

const VAR_MASKS: [u64; 6] = [
    0xAAAA_AAAA_AAAA_AAAA,
    0xCCCC_CCCC_CCCC_CCCC,
    0xF0F0_F0F0_F0F0_F0F0,
    0xFF00_FF00_FF00_FF00,
    0xFFFF_0000_FFFF_0000,
    0xFFFF_FFFF_0000_0000,
];

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TruthTable {
    num_vars: usize,
    words: Vec<u64>,
}

fn word_count(num_vars: usize) -> usize {
    if num_vars <= 6 {
        1
    } else {
        1 << (num_vars - 6)
    }
}

impl TruthTable {
    pub fn const0(num_vars: usize) -> Self {
        assert!(
            num_vars <= MAX_VARS,
            "TruthTable supports at most {} variables; got {}",
            MAX_VARS,
            num_vars
        );
        Self {
            num_vars,
            words: vec![0; word_count(num_vars)],
        }
    }

    pub fn const1(num_vars: usize) -> Self {
        Self::const0(num_vars).not()
    }

    /// Returns the projection function `x_index` over `num_vars` variables.
    pub fn nth_var(num_vars: usize, index: usize) -> Self {
        assert!(
            index < num_vars,
            "TruthTable::nth_var index {} out of range for {} variables",
            index,
            num_vars
        );
        let mut tt = Self::const0(num_vars);
        if index < 6 {
            for w in tt.words.iter_mut() {
                *w = VAR_MASKS[index];
            }
        } else {
            let stride = index - 6;
            for (j, w) in tt.words.iter_mut().enumerate() {
                if (j >> stride) & 1 != 0 {
                    *w = u64::MAX;
                }
            }
        }
        tt.mask();
        tt
    }

    /// Builds a table from a hex string, most significant nibble first.
    pub fn from_hex(num_vars: usize, hex: &str) -> Result<Self, LutMapError> {
        if num_vars > MAX_VARS {
            return Err(LutMapError::InvalidTruthTable(format!(
                "{} variables exceeds the maximum of {}",
                num_vars, MAX_VARS
            )));
        }
        let hex = hex.trim_start_matches("0x");
        let expected_digits = std::cmp::max(1, (1usize << num_vars) / 4);
        if hex.len() != expected_digits {
            return Err(LutMapError::InvalidTruthTable(format!(
                "expected {} hex digits for {} variables; got {:?}",
                expected_digits, num_vars, hex
            )));
        }
        let mut tt = Self::const0(num_vars);
        for (pos, c) in hex.chars().rev().enumerate() {
            let nibble = c.to_digit(16).ok_or_else(|| {
                LutMapError::InvalidTruthTable(format!("invalid hex digit {:?}", c))
            })? as u64;
            tt.words[pos / 16] |= nibble << ((pos % 16) * 4);
        }
        let before = tt.words.clone();
        tt.mask();
        if before != tt.words {
            return Err(LutMapError::InvalidTruthTable(format!(
                "hex value {:?} does not fit in {} variables",
                hex, num_vars
            )));
        }
        Ok(tt)
    }

    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    pub fn num_bits(&self) -> usize {
        1 << self.num_vars
    }

    fn mask(&mut self) {
        if self.num_vars < 6 {
            self.words[0] &= (1u64 << (1u64 << self.num_vars)) - 1;
        }
    }

    #[inline]
    pub fn get_bit(&self, assignment_index: usize) -> bool {
        debug_assert!(assignment_index < self.num_bits());
        (self.words[assignment_index >> 6] >> (assignment_index & 63)) & 1 != 0
    }

    #[inline]
    pub fn set_bit(&mut self, assignment_index: usize, value: bool) {
        debug_assert!(assignment_index < self.num_bits());
        let mask = 1u64 << (assignment_index & 63);
        let w = &mut self.words[assignment_index >> 6];
        if value {
            *w |= mask;
        } else {
            *w &= !mask;
        }
    }

    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn is_const0(&self) -> bool {
        self.words.iter().all(|w| *w == 0)
    }

    pub fn is_const1(&self) -> bool {
        self.count_ones() == self.num_bits()
    }

    #[must_use]
    pub fn not(&self) -> Self {
        let mut out = Self {
            num_vars: self.num_vars,
            words: self.words.iter().map(|w| !w).collect(),
        };
        out.mask();
        out
    }

    fn binary_op(&self, other: &Self, op: impl Fn(u64, u64) -> u64) -> Self {
        assert_eq!(
            self.num_vars, other.num_vars,
            "truth table operands must have the same variable count"
        );
        let mut out = Self {
            num_vars: self.num_vars,
            words: self
                .words
                .iter()
                .zip(other.words.iter())
                .map(|(a, b)| op(*a, *b))
                .collect(),
        };
        out.mask();
        out
    }

    #[must_use]
    pub fn and(&self, other: &Self) -> Self {
        self.binary_op(other, |a, b| a & b)
    }

    #[must_use]
    pub fn or(&self, other: &Self) -> Self {
        self.binary_op(other, |a, b| a | b)
    }

    #[must_use]
    pub fn xor(&self, other: &Self) -> Self {
        self.binary_op(other, |a, b| a ^ b)
    }

    /// Three-input majority.
    #[must_use]
    pub fn maj(a: &Self, b: &Self, c: &Self) -> Self {
        a.and(b).or(&a.and(c)).or(&b.and(c))
    }

    /// Returns `self` complemented when `negate` is set.
    #[must_use]
    pub fn negate_if(&self, negate: bool) -> Self {
        if negate {
            self.not()
        } else {
            self.clone()
        }
    }

    /// Returns whether the function depends on variable `var`.
    pub fn has_var(&self, var: usize) -> bool {
        debug_assert!(var < self.num_vars);
        let stride = 1usize << var;
        (0..self.num_bits())
            .filter(|i| i & stride == 0)
            .any(|i| self.get_bit(i) != self.get_bit(i | stride))
    }

    /// Embeds this function into a table over `num_vars` variables where the
    /// variable `j` of `self` becomes variable `positions[j]` of the result.
    pub fn expand(&self, positions: &[usize], num_vars: usize) -> Self {
        assert_eq!(
            positions.len(),
            self.num_vars,
            "expand needs one target position per variable"
        );
        if positions.len() == num_vars && positions.iter().enumerate().all(|(i, p)| i == *p) {
            return self.clone();
        }
        let mut out = Self::const0(num_vars);
        for assign in 0..out.num_bits() {
            let mut old_assign = 0usize;
            for (j, pos) in positions.iter().enumerate() {
                if (assign >> pos) & 1 != 0 {
                    old_assign |= 1 << j;
                }
            }
            if self.get_bit(old_assign) {
                out.set_bit(assign, true);
            }
        }
        out
    }

    /// Removes the variables the function does not depend on.
    ///
    /// Returns the reduced table together with the original positions of the
    /// kept variables, in increasing order.
    pub fn min_base(&self) -> (Self, Vec<usize>) {
        let support: Vec<usize> = (0..self.num_vars).filter(|v| self.has_var(*v)).collect();
        if support.len() == self.num_vars {
            return (self.clone(), support);
        }
        let mut out = Self::const0(support.len());
        for assign in 0..out.num_bits() {
            let mut old_assign = 0usize;
            for (j, pos) in support.iter().enumerate() {
                if (assign >> j) & 1 != 0 {
                    old_assign |= 1 << pos;
                }
            }
            if self.get_bit(old_assign) {
                out.set_bit(assign, true);
            }
        }
        (out, support)
    }

    /// Evaluates this function with variable `i` replaced by `operands[i]`.
    ///
    /// All operands must share one variable count, which becomes the
    /// variable count of the result. Without operands the function itself
    /// (necessarily over zero variables) is returned.
    pub fn compose(&self, operands: &[TruthTable]) -> Self {
        assert_eq!(
            operands.len(),
            self.num_vars,
            "compose needs one operand per variable"
        );
        if operands.is_empty() {
            return self.clone();
        }
        let num_vars = operands[0].num_vars;
        let mut out = Self::const0(num_vars);
        for assign in 0..out.num_bits() {
            let mut inner = 0usize;
            for (i, operand) in operands.iter().enumerate() {
                if operand.get_bit(assign) {
                    inner |= 1 << i;
                }
            }
            if self.get_bit(inner) {
                out.set_bit(assign, true);
            }
        }
        out
    }

    /// Hex rendering, most significant nibble first.
    pub fn to_hex(&self) -> String {
        let digits = std::cmp::max(1, self.num_bits() / 4);
        let mut s = String::with_capacity(digits);
        for pos in (0..digits).rev() {
            let nibble = (self.words[pos / 16] >> ((pos % 16) * 4)) & 0xF;
            s.push(std::char::from_digit(nibble as u32, 16).unwrap_or('?'));
        }
        s
    }
}

impl std::fmt::Display for TruthTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}'h{}", self.num_vars, self.to_hex())
    }
}
