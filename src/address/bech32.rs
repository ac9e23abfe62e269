//! CashAddr-style bech32 variant codec: 5-bit squashing, polymod checksum
//! over an expanded human-readable prefix, configurable HRP.
//!
//! This is a from-scratch implementation of the well-known CashAddr
//! checksum scheme (same charset and generator polynomial family as BCH's
//! CashAddr), since Hoosat addresses use this scheme rather than BIP-173
//! bech32/bech32m.

use crate::{EngineError, EngineResult};

const CHARSET: &str = "qpzry9x8gf2tvdw0s3jn54khce6mua7l";
const CHECKSUM_LEN: usize = 8;

/// Generator polynomial constants for the CashAddr-style polymod.
const GENERATOR: [u64; 5] = [
    0x98f2bc8e61,
    0x79b76d99e2,
    0xf33e5fb3c4,
    0xae2eabe2a8,
    0x1e4f43e470,
];

fn polymod(values: &[u8]) -> u64 {
    let mut c: u64 = 1;
    for &d in values {
        let c0 = (c >> 35) as u8;
        c = ((c & 0x07ffffffff) << 5) ^ (d as u64);
        for (i, gen) in GENERATOR.iter().enumerate() {
            if (c0 >> i) & 1 != 0 {
                c ^= gen;
            }
        }
    }
    c ^ 1
}

/// Expand the human-readable prefix into 5-bit groups for the polymod
/// input, per the lower-5-bits-then-0-then-upper-3-bits convention.
fn expand_hrp(hrp: &str) -> Vec<u8> {
    let lower = hrp.to_ascii_lowercase();
    lower.bytes().map(|b| b & 0x1f).collect()
}

/// Convert a byte slice from 8-bit groups to 5-bit groups, left-MSB padded.
pub fn to_5bit(data: &[u8]) -> Vec<u8> {
    let mut acc: u32 = 0;
    let mut bits: u32 = 0;
    let mut out = Vec::with_capacity(data.len() * 8 / 5 + 1);
    for &byte in data {
        acc = (acc << 8) | byte as u32;
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            out.push(((acc >> bits) & 0x1f) as u8);
        }
    }
    if bits > 0 {
        out.push(((acc << (5 - bits)) & 0x1f) as u8);
    }
    out
}

/// Convert 5-bit groups back to 8-bit bytes. Returns `None` if the padding
/// bits are non-zero or if there are leftover bits that don't fit a byte.
pub fn from_5bit(data: &[u8]) -> Option<Vec<u8>> {
    let mut acc: u32 = 0;
    let mut bits: u32 = 0;
    let mut out = Vec::with_capacity(data.len() * 5 / 8);
    for &value in data {
        if value > 31 {
            return None;
        }
        acc = (acc << 5) | value as u32;
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            out.push(((acc >> bits) & 0xff) as u8);
        }
    }
    // Leftover bits must be padding: fewer than 5 bits, and all zero.
    if bits >= 5 {
        return None;
    }
    if bits > 0 {
        let mask = (1u32 << bits) - 1;
        if acc & mask != 0 {
            return None;
        }
    }
    Some(out)
}

/// Encode `hrp || data (5-bit groups, no checksum)` into the bech32-style
/// alphabet string, appending the checksum.
pub fn encode_with_checksum(hrp: &str, data_5bit: &[u8]) -> String {
    let mut payload = data_5bit.to_vec();
    payload.extend_from_slice(&[0u8; CHECKSUM_LEN]);

    let mut polymod_input = expand_hrp(hrp);
    polymod_input.extend_from_slice(&payload);

    let checksum = polymod(&polymod_input);

    for (i, slot) in payload.iter_mut().rev().take(CHECKSUM_LEN).rev().enumerate() {
        let shift = 5 * (CHECKSUM_LEN - 1 - i);
        *slot = ((checksum >> shift) & 0x1f) as u8;
    }

    let body: String = payload
        .iter()
        .map(|&v| CHARSET.as_bytes()[v as usize] as char)
        .collect();

    format!("{hrp}:{body}")
}

/// Decode an address string of the form `hrp:body`, validating the
/// checksum against `expected_hrp` (case-insensitive) when provided.
///
/// Returns the 5-bit payload with the trailing checksum symbols stripped.
pub fn decode_with_checksum(address: &str, expected_hrp: Option<&str>) -> EngineResult<Vec<u8>> {
    let (hrp, body) = address.split_once(':').ok_or_else(|| EngineError::InvalidAddress {
        reason: "missing ':' separator".to_string(),
    })?;

    if let Some(expected) = expected_hrp {
        if !hrp.eq_ignore_ascii_case(expected) {
            return Err(EngineError::InvalidAddress {
                reason: "prefix mismatch".to_string(),
            });
        }
    }

    if body.len() <= CHECKSUM_LEN {
        return Err(EngineError::InvalidAddress {
            reason: "body too short".to_string(),
        });
    }

    let mut values = Vec::with_capacity(body.len());
    for ch in body.chars() {
        let idx = CHARSET.find(ch.to_ascii_lowercase()).ok_or_else(|| EngineError::InvalidAddress {
            reason: "invalid character".to_string(),
        })?;
        values.push(idx as u8);
    }

    let mut polymod_input = expand_hrp(hrp);
    polymod_input.extend_from_slice(&values);
    if polymod(&polymod_input) != 0 {
        return Err(EngineError::InvalidAddress {
            reason: "checksum mismatch".to_string(),
        });
    }

    let payload_len = values.len() - CHECKSUM_LEN;
    values.truncate(payload_len);
    Ok(values)
}
