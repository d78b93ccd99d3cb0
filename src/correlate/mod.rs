//! Costume and stage correlation engines.
//!
//! Both engines are pure functions over parsed records: no I/O, no shared
//! state across archives, strictly sequential within one archive in listed
//! descriptor order. That ordering is observable (later descriptors see
//! earlier consumption decisions) and part of the golden-output contract.

mod engine;
mod folders;
pub mod stage;
mod strategies;

pub use self::engine::CostumeCorrelator;
