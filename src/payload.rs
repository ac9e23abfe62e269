//! Canonical whitespace-free ASCII serialization of HRC-20 operations.
//!
//! Field order is fixed per operation; `serde_json`'s struct serialization
//! preserves declaration order, so the field order in each struct below
//! *is* the wire order. This mirrors how
//! `ord-rs`'s `Brc20Deploy`/`Brc20Mint`/`Brc20Transfer` rely on the same
//! guarantee for BRC-20.
//!
//! Deploy has two wire shapes (tick-mode vs issue-mode) that both use
//! `"op":"deploy"`, so `Hrc20Op` cannot use a plain `#[serde(tag = "op")]`
//! enum (which requires one tag value per variant) — it dispatches by hand
//! instead, the way `ord-rs`'s `InscriptionParser` hand-dispatches between
//! `Nft`/`Brc20` after inspecting the decoded envelope.

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};

use crate::{EngineError, EngineResult};

const PROTOCOL: &str = "hrc-20";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hrc20Op {
    Deploy(Hrc20Deploy),
    DeployIssue(Hrc20DeployIssue),
    Mint(Hrc20Mint),
    Transfer(Hrc20Transfer),
    Burn(Hrc20Burn),
    List(Hrc20List),
    Send(Hrc20Send),
}

impl Hrc20Op {
    pub fn deploy(
        tick: impl ToString,
        max: u64,
        lim: u64,
        to: Option<String>,
        dec: Option<u64>,
        pre: Option<u64>,
    ) -> Self {
        Self::Deploy(Hrc20Deploy {
            protocol: PROTOCOL.to_string(),
            op: "deploy".to_string(),
            tick: tick.to_string(),
            max,
            lim,
            to,
            dec,
            pre,
        })
    }

    pub fn deploy_issue(
        name: impl ToString,
        max: u64,
        module: impl ToString,
        to: Option<String>,
        dec: Option<u64>,
        pre: Option<u64>,
    ) -> Self {
        Self::DeployIssue(Hrc20DeployIssue {
            protocol: PROTOCOL.to_string(),
            op: "deploy".to_string(),
            name: name.to_string(),
            max,
            module: module.to_string(),
            to,
            dec,
            pre,
        })
    }

    pub fn mint(tick: impl ToString, to: Option<String>) -> Self {
        Self::Mint(Hrc20Mint {
            protocol: PROTOCOL.to_string(),
            op: "mint".to_string(),
            tick: tick.to_string(),
            to,
        })
    }

    pub fn transfer(tick: impl ToString, amt: u64, to: impl ToString) -> Self {
        Self::Transfer(Hrc20Transfer {
            protocol: PROTOCOL.to_string(),
            op: "transfer".to_string(),
            tick: tick.to_string(),
            amt,
            to: to.to_string(),
        })
    }

    pub fn burn(tick: impl ToString, amt: u64) -> Self {
        Self::Burn(Hrc20Burn {
            protocol: PROTOCOL.to_string(),
            op: "burn".to_string(),
            tick: tick.to_string(),
            amt,
        })
    }

    pub fn list(tick: impl ToString, amt: u64) -> Self {
        Self::List(Hrc20List {
            protocol: PROTOCOL.to_string(),
            op: "list".to_string(),
            tick: tick.to_string().to_lowercase(),
            amt,
        })
    }

    pub fn send(tick: impl ToString) -> Self {
        Self::Send(Hrc20Send {
            protocol: PROTOCOL.to_string(),
            op: "send".to_string(),
            tick: tick.to_string().to_lowercase(),
        })
    }

    /// Encode the operation as whitespace-free canonical ASCII JSON.
    pub fn encode(&self) -> EngineResult<String> {
        let value = match self {
            Hrc20Op::Deploy(v) => serde_json::to_string(v),
            Hrc20Op::DeployIssue(v) => serde_json::to_string(v),
            Hrc20Op::Mint(v) => serde_json::to_string(v),
            Hrc20Op::Transfer(v) => serde_json::to_string(v),
            Hrc20Op::Burn(v) => serde_json::to_string(v),
            Hrc20Op::List(v) => serde_json::to_string(v),
            Hrc20Op::Send(v) => serde_json::to_string(v),
        };
        Ok(value?)
    }

    /// Extract the `"op"` tag from a raw payload, used by fee estimation
    /// when only the serialized payload (not the typed `Hrc20Op`) is in
    /// hand.
    pub fn op_tag(payload_json: &str) -> Option<String> {
        let value: serde_json::Value = serde_json::from_str(payload_json).ok()?;
        value.get("op")?.as_str().map(str::to_string)
    }
}

impl std::str::FromStr for Hrc20Op {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: serde_json::Value = serde_json::from_str(s)?;
        let op = value
            .get("op")
            .and_then(|v| v.as_str())
            .ok_or_else(|| EngineError::InvalidTransaction {
                message: "missing \"op\" field in payload".to_string(),
            })?;

        Ok(match op {
            "deploy" if value.get("name").is_some() => {
                Hrc20Op::DeployIssue(serde_json::from_value(value)?)
            }
            "deploy" => Hrc20Op::Deploy(serde_json::from_value(value)?),
            "mint" => Hrc20Op::Mint(serde_json::from_value(value)?),
            "transfer" => Hrc20Op::Transfer(serde_json::from_value(value)?),
            "burn" => Hrc20Op::Burn(serde_json::from_value(value)?),
            "list" => Hrc20Op::List(serde_json::from_value(value)?),
            "send" => Hrc20Op::Send(serde_json::from_value(value)?),
            other => {
                return Err(EngineError::InvalidTransaction {
                    message: format!("unknown HRC-20 operation: {other}"),
                })
            }
        })
    }
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hrc20Deploy {
    #[serde(rename = "p")]
    protocol: String,
    op: String,
    pub tick: String,
    #[serde_as(as = "DisplayFromStr")]
    pub max: u64,
    #[serde_as(as = "DisplayFromStr")]
    pub lim: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub dec: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub pre: Option<u64>,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hrc20DeployIssue {
    #[serde(rename = "p")]
    protocol: String,
    op: String,
    pub name: String,
    #[serde_as(as = "DisplayFromStr")]
    pub max: u64,
    #[serde(rename = "mod")]
    pub module: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub dec: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub pre: Option<u64>,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hrc20Mint {
    #[serde(rename = "p")]
    protocol: String,
    op: String,
    pub tick: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hrc20Transfer {
    #[serde(rename = "p")]
    protocol: String,
    op: String,
    pub tick: String,
    #[serde_as(as = "DisplayFromStr")]
    pub amt: u64,
    pub to: String,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hrc20Burn {
    #[serde(rename = "p")]
    protocol: String,
    op: String,
    pub tick: String,
    #[serde_as(as = "DisplayFromStr")]
    pub amt: u64,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hrc20List {
    #[serde(rename = "p")]
    protocol: String,
    op: String,
    pub tick: String,
    #[serde_as(as = "DisplayFromStr")]
    pub amt: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hrc20Send {
    #[serde(rename = "p")]
    protocol: String,
    op: String,
    pub tick: String,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_deploy_payload_formatting() {
        let op = Hrc20Op::deploy("HOOS", 2100000000000000, 100000000000, None, None, None);
        let encoded = op.encode().unwrap();
        assert_eq!(
            encoded,
            r#"{"p":"hrc-20","op":"deploy","tick":"HOOS","max":"2100000000000000","lim":"100000000000"}"#
        );
    }

    #[test]
    fn test_mint_with_recipient() {
        let op = Hrc20Op::mint("HOOS", Some("hoosat:qz00".to_string()));
        let encoded = op.encode().unwrap();
        assert_eq!(
            encoded,
            r#"{"p":"hrc-20","op":"mint","tick":"HOOS","to":"hoosat:qz00"}"#
        );
    }

    #[test]
    fn test_list_lowercases_ticker() {
        let op = Hrc20Op::list("TEST", 292960000000);
        let encoded = op.encode().unwrap();
        assert_eq!(
            encoded,
            r#"{"p":"hrc-20","op":"list","tick":"test","amt":"292960000000"}"#
        );
    }

    #[test]
    fn test_send_lowercases_ticker() {
        let op = Hrc20Op::send("TEST");
        let encoded = op.encode().unwrap();
        assert_eq!(encoded, r#"{"p":"hrc-20","op":"send","tick":"test"}"#);
    }

    #[test]
    fn test_transfer_preserves_case() {
        let op = Hrc20Op::transfer("HoOs", 100, "hoosat:qz00");
        let encoded = op.encode().unwrap();
        assert!(encoded.contains(r#""tick":"HoOs""#));
    }

    #[test]
    fn test_deploy_issue_mode_field_order() {
        let op = Hrc20Op::deploy_issue("MyToken", 1_000_000, "mint-burn", None, Some(8), None);
        let encoded = op.encode().unwrap();
        assert_eq!(
            encoded,
            r#"{"p":"hrc-20","op":"deploy","name":"MyToken","max":"1000000","mod":"mint-burn","dec":"8"}"#
        );
    }

    #[test]
    fn test_no_whitespace_in_any_encoding() {
        let ops = vec![
            Hrc20Op::deploy("ABC", 1, 1, Some("x".into()), Some(8), Some(0)),
            Hrc20Op::deploy_issue("ABC", 1, "m", None, None, None),
            Hrc20Op::mint("ABC", None),
            Hrc20Op::transfer("ABC", 1, "x"),
            Hrc20Op::burn("ABC", 1),
            Hrc20Op::list("ABC", 1),
            Hrc20Op::send("ABC"),
        ];
        for op in ops {
            let encoded = op.encode().unwrap();
            assert!(!encoded.contains(' '), "unexpected whitespace in {encoded}");
            assert!(!encoded.contains('\n'));
            assert!(!encoded.contains('\t'));
        }
    }

    #[test]
    fn test_dec_is_quoted() {
        let op = Hrc20Op::deploy("ABC", 1, 1, None, Some(8), None);
        let encoded = op.encode().unwrap();
        assert!(encoded.contains(r#""dec":"8""#));
    }

    #[test]
    fn test_encode_decode_round_trip() {
        let ops = vec![
            Hrc20Op::transfer("ordi", 100, "hoosat:abc"),
            Hrc20Op::deploy("ordi", 21000000, 1000, None, Some(8), None),
            Hrc20Op::deploy_issue("ordi", 21000000, "mint", None, None, None),
            Hrc20Op::burn("ordi", 10),
            Hrc20Op::list("ordi", 10),
            Hrc20Op::send("ordi"),
        ];
        for op in ops {
            let encoded = op.encode().unwrap();
            let decoded: Hrc20Op = encoded.parse().unwrap();
            assert_eq!(decoded, op);
        }
    }

    #[test]
    fn test_op_tag_extraction() {
        let op = Hrc20Op::mint("ABC", None);
        let encoded = op.encode().unwrap();
        assert_eq!(Hrc20Op::op_tag(&encoded), Some("mint".to_string()));
    }

    #[test]
    fn test_op_tag_unknown_returns_none_on_malformed() {
        assert_eq!(Hrc20Op::op_tag("not json"), None);
    }

    #[test]
    fn test_unknown_op_rejected() {
        let raw = r#"{"p":"hrc-20","op":"nonsense","tick":"x"}"#;
        assert!(raw.parse::<Hrc20Op>().is_err());
    }
}
