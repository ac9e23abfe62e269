mod bech32;

use crate::hashes::double_sha256;
use crate::{EngineError, EngineResult};

/// Address type tag, matching Hoosat's three recognized payload shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressType {
    /// Schnorr (BIP-340) public key, 32 bytes.
    Schnorr,
    /// ECDSA compressed public key, 33 bytes.
    Ecdsa,
    /// Pay-to-script-hash, 32-byte double-SHA-256 script hash.
    P2sh,
}

impl AddressType {
    fn tag(self) -> u8 {
        match self {
            AddressType::Schnorr => 0,
            AddressType::Ecdsa => 1,
            AddressType::P2sh => 8,
        }
    }

    fn from_tag(tag: u8) -> EngineResult<Self> {
        match tag {
            0 => Ok(AddressType::Schnorr),
            1 => Ok(AddressType::Ecdsa),
            8 => Ok(AddressType::P2sh),
            _ => Err(EngineError::InvalidAddress {
                reason: "unknown address type".to_string(),
            }),
        }
    }

    fn expected_payload_len(self) -> usize {
        match self {
            AddressType::Schnorr => 32,
            AddressType::Ecdsa => 33,
            AddressType::P2sh => 32,
        }
    }
}

/// A decoded/encodable Hoosat address: human-readable prefix, address type,
/// and raw payload bytes. The script pubkey is derived on demand rather
/// than cached, since addresses in this engine are short-lived values
/// threaded through a single builder call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub hrp: String,
    pub addr_type: AddressType,
    pub payload: Vec<u8>,
}

impl Address {
    pub fn new(hrp: impl Into<String>, addr_type: AddressType, payload: Vec<u8>) -> EngineResult<Self> {
        if payload.len() != addr_type.expected_payload_len() {
            return Err(EngineError::InvalidAddress {
                reason: "payload length mismatch".to_string(),
            });
        }
        Ok(Self {
            hrp: hrp.into(),
            addr_type,
            payload,
        })
    }

    /// Encode this address as `"<hrp>:<bech32-body>"`.
    pub fn encode(&self) -> String {
        let mut tagged = Vec::with_capacity(1 + self.payload.len());
        tagged.push(self.addr_type.tag());
        tagged.extend_from_slice(&self.payload);
        let squashed = bech32::to_5bit(&tagged);
        bech32::encode_with_checksum(&self.hrp, &squashed)
    }

    /// Decode an address string. If `expected_hrp` is `None`, any
    /// recognized prefix is accepted.
    pub fn decode(address: &str, expected_hrp: Option<&str>) -> EngineResult<Self> {
        let hrp = address
            .split_once(':')
            .map(|(hrp, _)| hrp.to_string())
            .ok_or_else(|| EngineError::InvalidAddress {
                reason: "missing ':' separator".to_string(),
            })?;

        let squashed = bech32::decode_with_checksum(address, expected_hrp)?;
        let tagged = bech32::from_5bit(&squashed).ok_or_else(|| EngineError::InvalidAddress {
            reason: "invalid 5-bit padding".to_string(),
        })?;

        let (&tag, payload) = tagged.split_first().ok_or_else(|| EngineError::InvalidAddress {
            reason: "empty payload".to_string(),
        })?;
        let addr_type = AddressType::from_tag(tag)?;
        if payload.len() != addr_type.expected_payload_len() {
            return Err(EngineError::InvalidAddress {
                reason: "payload length mismatch".to_string(),
            });
        }

        Ok(Self {
            hrp,
            addr_type,
            payload: payload.to_vec(),
        })
    }

    /// Derive the script public key for this address.
    pub fn script_public_key(&self) -> Vec<u8> {
        generate_script_public_key(&self.payload, self.addr_type)
    }
}

/// `OP_DATA_32 <pk> OP_CHECKSIG` / `OP_DATA_33 <pk> OP_CHECKSIG_ECDSA` /
/// `OP_BLAKE3 OP_DATA_32 <hash> OP_EQUAL`.
pub fn generate_script_public_key(payload: &[u8], addr_type: AddressType) -> Vec<u8> {
    match addr_type {
        AddressType::Schnorr => {
            let mut script = Vec::with_capacity(34);
            script.push(0x20);
            script.extend_from_slice(payload);
            script.push(0xac);
            script
        }
        AddressType::Ecdsa => {
            let mut script = Vec::with_capacity(35);
            script.push(0x21);
            script.extend_from_slice(payload);
            script.push(0xab);
            script
        }
        AddressType::P2sh => {
            let mut script = Vec::with_capacity(35);
            script.push(0xbe); // OP_BLAKE3
            script.push(0x20); // OP_DATA_32
            script.extend_from_slice(payload);
            script.push(0x87); // OP_EQUAL
            script
        }
    }
}

/// Build a P2SH address from a redeem script's double-SHA-256 hash.
pub fn p2sh_address(hrp: impl Into<String>, script_hash: [u8; 32]) -> Address {
    Address {
        hrp: hrp.into(),
        addr_type: AddressType::P2sh,
        payload: script_hash.to_vec(),
    }
}

/// Compute the script-hash quantity that defines a redeem script's P2SH
/// address: the double-SHA-256 of the script bytes. Named once here and
/// referenced everywhere this value is needed.
pub fn script_hash(redeem_script: &[u8]) -> [u8; 32] {
    double_sha256(redeem_script)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_address_round_trip_schnorr() {
        let payload = vec![0xABu8; 32];
        let addr = Address::new("hoosat", AddressType::Schnorr, payload.clone()).unwrap();
        let encoded = addr.encode();
        let decoded = Address::decode(&encoded, Some("hoosat")).unwrap();
        assert_eq!(decoded.addr_type, AddressType::Schnorr);
        assert_eq!(decoded.payload, payload);
    }

    #[test]
    fn test_address_round_trip_ecdsa() {
        let mut payload = vec![0x02u8];
        payload.extend_from_slice(&[0xCDu8; 32]);
        let addr = Address::new("hoosat", AddressType::Ecdsa, payload.clone()).unwrap();
        let decoded = Address::decode(&addr.encode(), Some("hoosat")).unwrap();
        assert_eq!(decoded.addr_type, AddressType::Ecdsa);
        assert_eq!(decoded.payload, payload);
    }

    #[test]
    fn test_address_round_trip_p2sh() {
        let payload = vec![0x11u8; 32];
        let addr = Address::new("hoosattest", AddressType::P2sh, payload.clone()).unwrap();
        let decoded = Address::decode(&addr.encode(), Some("hoosattest")).unwrap();
        assert_eq!(decoded.addr_type, AddressType::P2sh);
        assert_eq!(decoded.payload, payload);
    }

    #[test]
    fn test_mutated_address_fails_checksum() {
        let payload = vec![0x42u8; 32];
        let addr = Address::new("hoosat", AddressType::Schnorr, payload).unwrap();
        let encoded = addr.encode();
        let mut bytes: Vec<char> = encoded.chars().collect();
        let mid = bytes.len() / 2;
        bytes[mid] = if bytes[mid] == 'q' { 'p' } else { 'q' };
        let mutated: String = bytes.into_iter().collect();
        assert!(Address::decode(&mutated, Some("hoosat")).is_err());
    }

    #[test]
    fn test_wrong_payload_length_rejected() {
        assert!(Address::new("hoosat", AddressType::Schnorr, vec![0u8; 31]).is_err());
        assert!(Address::new("hoosat", AddressType::Ecdsa, vec![0u8; 32]).is_err());
    }

    #[test]
    fn test_schnorr_script_shape() {
        // 32-byte pubkey of 0xAB repeated; script starts 0x20, ends 0xAC, length 34.
        let payload = vec![0xABu8; 32];
        let script = generate_script_public_key(&payload, AddressType::Schnorr);
        assert_eq!(script[0], 0x20);
        assert_eq!(*script.last().unwrap(), 0xAC);
        assert_eq!(script.len(), 34);
    }

    #[test]
    fn test_ecdsa_script_shape() {
        // 33-byte pubkey starting 0x02; script starts 0x21, ends 0xAB, length 35.
        let mut payload = vec![0x02u8];
        payload.extend_from_slice(&[0xABu8; 32]);
        let script = generate_script_public_key(&payload, AddressType::Ecdsa);
        assert_eq!(script[0], 0x21);
        assert_eq!(*script.last().unwrap(), 0xAB);
        assert_eq!(script.len(), 35);
    }

    #[test]
    fn test_decode_accepts_any_recognized_prefix_when_unspecified() {
        let payload = vec![0x01u8; 32];
        let addr = Address::new("hoosattest", AddressType::Schnorr, payload).unwrap();
        assert!(Address::decode(&addr.encode(), None).is_ok());
    }
}
