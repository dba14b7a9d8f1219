//! Codes over `Z/p` scored by almost-arithmetic-sequence coverage.
//!
//! A code starts `0, 1` and grows by appending any residue from
//! `2..p` not already present. Appending `k` marks as reachable every
//! `2k − x`, `x + y − k`, `x + k − y`, and `y + k − x` over earlier
//! codewords `x, y`; covering all of `Z/p` is a perfect record.

use std::fmt;
use std::hash::{Hash, Hasher};

use tracing::debug;

use magpie_beam::{Fitness, Problem};

use crate::error::{DomainError, check_range};

/// Largest supported modulus.
pub const MAX_CODE_MODULUS: usize = 512;
/// Longest supported code.
pub const MAX_CODE_LEN: usize = 64;

const IN_CODE: u8 = 1;
const REACHABLE: u8 = 2;

/// A code over `Z/p` plus its coverage mask.
///
/// Equality and hashing cover the codewords only.
#[derive(Clone)]
pub struct AasCode {
    len: u16,
    covered: u32,
    words: [u16; MAX_CODE_LEN],
    mask: [u8; MAX_CODE_MODULUS],
}

impl AasCode {
    /// The codewords, in construction order.
    pub fn words(&self) -> &[u16] {
        &self.words[..usize::from(self.len)]
    }

    fn mark_reachable(&mut self, residue: u16) {
        if self.mask[usize::from(residue)] == 0 {
            self.covered += 1;
            self.mask[usize::from(residue)] = REACHABLE;
        }
    }

    fn extended(&self, next: u16, modulus: u16) -> AasCode {
        debug_assert!(usize::from(self.len) < MAX_CODE_LEN);
        let p = modulus;
        let mut child = self.clone();
        child.words[usize::from(child.len)] = next;
        child.len += 1;
        if child.mask[usize::from(next)] == 0 {
            child.covered += 1;
        }
        child.mask[usize::from(next)] = IN_CODE;
        for a in 0..usize::from(child.len) - 1 {
            let x = child.words[a];
            child.mark_reachable((p + next + next - x) % p);
            for b in 0..=a {
                let y = child.words[b];
                child.mark_reachable((p + x + y - next) % p);
                child.mark_reachable((p + x + next - y) % p);
                child.mark_reachable((p + y + next - x) % p);
            }
        }
        child
    }
}

impl PartialEq for AasCode {
    fn eq(&self, other: &Self) -> bool {
        self.words() == other.words()
    }
}

impl Eq for AasCode {}

impl Hash for AasCode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.words().hash(state);
    }
}

impl fmt::Display for AasCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<code")?;
        for word in self.words() {
            write!(f, " {word}")?;
        }
        write!(f, ">")
    }
}

impl fmt::Debug for AasCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self} covering {}", self.covered)
    }
}

/// The AAS-coverage code domain.
#[derive(Debug, Clone)]
pub struct AasCodes {
    modulus: u16,
    target_len: usize,
}

impl AasCodes {
    /// Build the domain for modulus `modulus`, aiming at codes of
    /// `target_len` words.
    pub fn new(modulus: u16, target_len: usize) -> Result<Self, DomainError> {
        check_range("modulus", usize::from(modulus), 3, MAX_CODE_MODULUS)?;
        check_range("length", target_len, 2, MAX_CODE_LEN)?;
        debug!(modulus, target_len, "aas-code domain ready");
        Ok(Self {
            modulus,
            target_len,
        })
    }

    /// Generations needed to grow the two-word seed to the target
    /// length.
    pub fn generations(&self) -> usize {
        self.target_len - 2
    }

    /// The modulus of the residue ring.
    pub fn modulus(&self) -> u16 {
        self.modulus
    }

    /// The canonical seed `0, 1` with `p − 1` and `2` reachable.
    pub fn seed(&self) -> AasCode {
        let mut seed = AasCode {
            len: 2,
            covered: 4,
            words: [0; MAX_CODE_LEN],
            mask: [0; MAX_CODE_MODULUS],
        };
        seed.words[1] = 1;
        seed.mask[0] = IN_CODE;
        seed.mask[1] = IN_CODE;
        seed.mask[usize::from(self.modulus) - 1] = REACHABLE;
        seed.mask[2] = REACHABLE;
        seed
    }
}

impl Problem for AasCodes {
    type State = AasCode;

    fn fitness(&self, code: &AasCode) -> Fitness {
        if code.covered == u32::from(self.modulus) {
            Fitness::PERFECT
        } else {
            Fitness::new(code.covered)
        }
    }

    fn children(&self, parent: &AasCode, emit: &mut dyn FnMut(AasCode)) {
        for next in 2..self.modulus {
            if parent.mask[usize::from(next)] == IN_CODE {
                continue;
            }
            emit(parent.extended(next, self.modulus));
        }
    }
}
