//! Search domains for the magpie beam workbench.

mod aas;
mod chain;
mod error;
mod grease;
mod lines;

pub use aas::{AasCode, AasCodes, MAX_CODE_LEN, MAX_CODE_MODULUS};
pub use chain::{AdditionChains, Chain, MAX_CHAIN_LEN, MAX_CHAIN_MODULUS};
pub use error::DomainError;
pub use grease::{ALPHABET, GreaseCode, GreaseCodes, MAX_GREASE_LEN, WORD_BITS};
pub use lines::{Line, LinePacking, MAX_DIM, MAX_LINES, Packing, Space};
