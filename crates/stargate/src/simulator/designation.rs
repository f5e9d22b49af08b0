//! Stable human-readable gate designations and seed mixing.

use super::types::{Address, GateTime};

const ALPHABET: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Label of the form `P3X-742`, derived only from the address.
pub fn designation_string(address: Address) -> String {
    let mut state = splitmix64(u64::from(address.0) ^ 0x5354_4152_4741_5445);
    let mut next = |modulus: u64| {
        state = splitmix64(state);
        state % modulus
    };
    let planet = next(10);
    let letter = ALPHABET[next(26) as usize] as char;
    let a = next(10);
    let b = next(10);
    let c = next(10);
    format!("P{planet}{letter}-{a}{b}{c}")
}

/// Label for an optional address; unknown addresses get a placeholder.
pub fn designation_or_unknown(address: Option<Address>) -> String {
    match address {
        Some(address) => designation_string(address),
        None => "unknown".to_string(),
    }
}

/// Seed for the kernel random source after a reload at `time`.
pub fn reseed(world_seed: u64, time: GateTime) -> u64 {
    let mut x = world_seed ^ 0x9E37_79B9_7F4A_7C15;
    x ^= time.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    splitmix64(x)
}

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}
