//! Raw script byte builder: minimal-push selection, the HRC-20
//! `OP_FALSE OP_IF ... OP_ENDIF` envelope, and P2SH signature scripts.

use crate::address;

pub const OP_FALSE: u8 = 0x00;
pub const OP_IF: u8 = 0x63;
pub const OP_ENDIF: u8 = 0x68;
pub const OP_CHECKSIG: u8 = 0xac;
pub const OP_CHECKSIG_ECDSA: u8 = 0xab;
pub const OP_PUSHDATA1: u8 = 0x4c;
pub const OP_PUSHDATA2: u8 = 0x4d;

/// Maximum payload bytes a single push-data opcode may carry before the
/// builder must split into successive chunks.
const MAX_SCRIPT_ELEMENT_SIZE: usize = 520;

/// Accumulates raw script bytes.
#[derive(Debug, Default, Clone)]
pub struct ScriptBuilder {
    bytes: Vec<u8>,
}

impl ScriptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_opcode(mut self, opcode: u8) -> Self {
        self.bytes.push(opcode);
        self
    }

    /// Push `data` using the minimal opcode for its length: direct-push for
    /// 1-75 bytes, `OP_PUSHDATA1` up to 255, `OP_PUSHDATA2` up to 65535.
    /// Longer payloads are rejected here — callers that may exceed
    /// `MAX_SCRIPT_ELEMENT_SIZE` should use `push_envelope_payload`.
    pub fn push_data(mut self, data: &[u8]) -> Self {
        match data.len() {
            0..=75 => {
                self.bytes.push(data.len() as u8);
            }
            76..=255 => {
                self.bytes.push(OP_PUSHDATA1);
                self.bytes.push(data.len() as u8);
            }
            256..=65535 => {
                self.bytes.push(OP_PUSHDATA2);
                self.bytes.extend_from_slice(&(data.len() as u16).to_le_bytes());
            }
            _ => panic!("script data push exceeds OP_PUSHDATA2 range"),
        }
        self.bytes.extend_from_slice(data);
        self
    }

    /// Append one or more push-data chunks covering `payload`, splitting at
    /// `MAX_SCRIPT_ELEMENT_SIZE` boundaries so no single push violates the
    /// script element size limit.
    pub fn push_envelope_payload(mut self, payload: &[u8]) -> Self {
        if payload.is_empty() {
            // An empty payload still needs a push so the envelope round-trips.
            return self.push_data(&[]);
        }
        for chunk in payload.chunks(MAX_SCRIPT_ELEMENT_SIZE) {
            self = self.push_data(chunk);
        }
        self
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Build the redeem script: `<pubkey-push> <CHECKSIG[-ECDSA]> OP_FALSE
/// OP_IF <payload pushes> OP_ENDIF`.
pub fn build_redeem_script(pubkey: &[u8], payload: &[u8], use_ecdsa: bool) -> Vec<u8> {
    let checksig_opcode = if use_ecdsa { OP_CHECKSIG_ECDSA } else { OP_CHECKSIG };
    ScriptBuilder::new()
        .push_data(pubkey)
        .push_opcode(checksig_opcode)
        .push_opcode(OP_FALSE)
        .push_opcode(OP_IF)
        .push_envelope_payload(payload)
        .push_opcode(OP_ENDIF)
        .into_bytes()
}

/// Build the signature script that spends a P2SH output:
/// `<push sig> <push redeem script>`.
pub fn build_p2sh_signature_script(sig_with_hashtype: &[u8], redeem_script: &[u8]) -> Vec<u8> {
    ScriptBuilder::new()
        .push_data(sig_with_hashtype)
        .push_data(redeem_script)
        .into_bytes()
}

/// The quantity that defines a redeem script's P2SH address. Delegates to
/// `address::script_hash`, which names it once.
pub fn hash_redeem_script(script: &[u8]) -> [u8; 32] {
    address::script_hash(script)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_direct_push_opcode_is_length() {
        let script = ScriptBuilder::new().push_data(&[1, 2, 3]).into_bytes();
        assert_eq!(script[0], 3);
        assert_eq!(&script[1..], &[1, 2, 3]);
    }

    #[test]
    fn test_pushdata1_used_above_75_bytes() {
        let data = vec![7u8; 100];
        let script = ScriptBuilder::new().push_data(&data).into_bytes();
        assert_eq!(script[0], OP_PUSHDATA1);
        assert_eq!(script[1], 100);
    }

    #[test]
    fn test_pushdata2_used_above_255_bytes() {
        let data = vec![7u8; 300];
        let script = ScriptBuilder::new().push_data(&data).into_bytes();
        assert_eq!(script[0], OP_PUSHDATA2);
        assert_eq!(u16::from_le_bytes([script[1], script[2]]), 300);
    }

    #[test]
    fn test_envelope_splits_long_payload() {
        let payload = vec![9u8; 1100]; // > 2 * 520
        let script = ScriptBuilder::new().push_envelope_payload(&payload).into_bytes();
        // Reconstruct the pushed chunks and verify they concatenate back.
        let mut cursor = 0;
        let mut reconstructed = Vec::new();
        while cursor < script.len() {
            let (len, header_len) = match script[cursor] {
                op if op <= 75 => (op as usize, 1),
                OP_PUSHDATA1 => (script[cursor + 1] as usize, 2),
                OP_PUSHDATA2 => {
                    let len = u16::from_le_bytes([script[cursor + 1], script[cursor + 2]]) as usize;
                    (len, 3)
                }
                _ => panic!("unexpected opcode"),
            };
            cursor += header_len;
            reconstructed.extend_from_slice(&script[cursor..cursor + len]);
            cursor += len;
        }
        assert_eq!(reconstructed, payload);
    }

    #[test]
    fn test_redeem_script_determinism() {
        let pubkey = vec![0xAAu8; 33];
        let payload = br#"{"p":"hrc-20","op":"mint","tick":"HOOS"}"#;
        let a = build_redeem_script(&pubkey, payload, true);
        let b = build_redeem_script(&pubkey, payload, true);
        assert_eq!(a, b);
        assert_eq!(hash_redeem_script(&a), hash_redeem_script(&b));
    }

    #[test]
    fn test_redeem_script_changes_with_payload() {
        let pubkey = vec![0xAAu8; 33];
        let a = build_redeem_script(&pubkey, b"a", true);
        let b = build_redeem_script(&pubkey, b"b", true);
        assert_ne!(a, b);
        assert_ne!(hash_redeem_script(&a), hash_redeem_script(&b));
    }

    #[test]
    fn test_checksig_opcode_selection() {
        let pubkey = vec![0xAAu8; 32];
        let ecdsa_script = build_redeem_script(&pubkey, b"x", true);
        let schnorr_script = build_redeem_script(&pubkey, b"x", false);
        // First byte is the push-length prefix (32), so opcode is at index 33.
        assert_eq!(ecdsa_script[33], OP_CHECKSIG_ECDSA);
        assert_eq!(schnorr_script[33], OP_CHECKSIG);
    }

    #[test]
    fn test_p2sh_signature_script_shape() {
        let sig = vec![1u8; 65];
        let redeem = vec![2u8; 40];
        let script = build_p2sh_signature_script(&sig, &redeem);
        assert_eq!(script[0], 65);
        assert_eq!(&script[1..66], sig.as_slice());
        assert_eq!(script[66], 40);
        assert_eq!(&script[67..], redeem.as_slice());
    }
}
