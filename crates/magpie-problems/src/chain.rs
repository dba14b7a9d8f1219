//! Addition chains over `Z/p` scored by difference-closure coverage.
//!
//! A chain starts `0, 1` and grows by appending pairwise sums of its
//! later elements. A residue counts as covered when it is in the chain
//! or reachable as `±(x − k)` for a chain element `x` and the appended
//! element `k`; covering all of `Z/p` is a perfect record.

use std::fmt;
use std::hash::{Hash, Hasher};

use tracing::debug;

use magpie_beam::{Fitness, Problem};

use crate::error::{DomainError, check_range};

/// Largest supported modulus.
pub const MAX_CHAIN_MODULUS: usize = 1024;
/// Longest supported chain.
pub const MAX_CHAIN_LEN: usize = 128;

const IN_CHAIN: u8 = 1;
const REACHABLE: u8 = 2;

/// An addition chain plus the coverage mask of its difference closure.
///
/// Equality and hashing cover the chain elements only; the mask and
/// the coverage count are functions of the chain.
#[derive(Clone)]
pub struct Chain {
    len: u16,
    covered: u32,
    elems: [u16; MAX_CHAIN_LEN],
    mask: [u8; MAX_CHAIN_MODULUS],
}

impl Chain {
    /// The chain elements, in construction order.
    pub fn elements(&self) -> &[u16] {
        &self.elems[..usize::from(self.len)]
    }

    fn mark_reachable(&mut self, residue: u16) {
        if self.mask[usize::from(residue)] == 0 {
            self.covered += 1;
            self.mask[usize::from(residue)] = REACHABLE;
        }
    }

    fn extended(&self, sum: u16, modulus: u16) -> Chain {
        debug_assert!(usize::from(self.len) < MAX_CHAIN_LEN);
        let mut child = self.clone();
        child.elems[usize::from(child.len)] = sum;
        child.len += 1;
        if child.mask[usize::from(sum)] == 0 {
            child.covered += 1;
        }
        child.mask[usize::from(sum)] = IN_CHAIN;
        for a in 0..usize::from(child.len) - 1 {
            let diff = (modulus + child.elems[a] - sum) % modulus;
            child.mark_reachable(diff);
            child.mark_reachable(modulus - diff);
        }
        child
    }
}

impl PartialEq for Chain {
    fn eq(&self, other: &Self) -> bool {
        self.elements() == other.elements()
    }
}

impl Eq for Chain {}

impl Hash for Chain {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.elements().hash(state);
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<chain")?;
        for elem in self.elements() {
            write!(f, " {elem}")?;
        }
        write!(f, ">")
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self} covering {}", self.covered)
    }
}

/// The addition-chain search domain.
#[derive(Debug, Clone)]
pub struct AdditionChains {
    modulus: u16,
    target_len: usize,
}

impl AdditionChains {
    /// Build the domain for modulus `modulus`, aiming at chains of
    /// `target_len` elements.
    pub fn new(modulus: u16, target_len: usize) -> Result<Self, DomainError> {
        check_range("modulus", usize::from(modulus), 2, MAX_CHAIN_MODULUS)?;
        check_range("length", target_len, 2, MAX_CHAIN_LEN)?;
        debug!(modulus, target_len, "addition-chain domain ready");
        Ok(Self {
            modulus,
            target_len,
        })
    }

    /// Generations needed to grow the two-element seed to the target
    /// length.
    pub fn generations(&self) -> usize {
        self.target_len - 2
    }

    /// The modulus of the residue ring.
    pub fn modulus(&self) -> u16 {
        self.modulus
    }

    /// The canonical seed `0, 1` with `p − 1` reachable as `−1`.
    pub fn seed(&self) -> Chain {
        let mut seed = Chain {
            len: 2,
            covered: 3,
            elems: [0; MAX_CHAIN_LEN],
            mask: [0; MAX_CHAIN_MODULUS],
        };
        seed.elems[1] = 1;
        seed.mask[0] = IN_CHAIN;
        seed.mask[1] = IN_CHAIN;
        seed.mask[usize::from(self.modulus) - 1] = REACHABLE;
        seed
    }
}

impl Problem for AdditionChains {
    type State = Chain;

    fn fitness(&self, chain: &Chain) -> Fitness {
        if chain.covered == u32::from(self.modulus) {
            Fitness::PERFECT
        } else {
            Fitness::new(chain.covered)
        }
    }

    fn children(&self, parent: &Chain, emit: &mut dyn FnMut(Chain)) {
        let len = usize::from(parent.len);
        for i in 1..len {
            for j in 1..=i {
                let sum = (parent.elems[i] + parent.elems[j]) % self.modulus;
                if parent.mask[usize::from(sum)] == IN_CHAIN {
                    continue;
                }
                emit(parent.extended(sum, self.modulus));
            }
        }
    }
}
