//! Analysis configuration.

use crate::errors::{AnalysisError, AnalysisResult};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;

/// Context sensitivity policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SelectorKind {
    /// Context insensitive analysis (`ci`, or any policy with `k = 0`).
    #[default]
    Insensitive,
    /// `<k>-call`: call-site sensitivity.
    KCall(usize),
    /// `<k>-obj`: object sensitivity.
    KObj(usize),
    /// `<k>-type`: type sensitivity.
    KType(usize),
}

lazy_static! {
    static ref SELECTOR_RE: Regex = Regex::new(r"^([0-9]+)-(call|obj|type)$").unwrap();
}

impl FromStr for SelectorKind {
    type Err = AnalysisError;

    fn from_str(s: &str) -> AnalysisResult<Self> {
        if s == "ci" {
            return Ok(Self::Insensitive);
        }
        let invalid = || AnalysisError::InvalidContextSensitivity(s.to_string());
        let caps = SELECTOR_RE.captures(s).ok_or_else(invalid)?;
        let k: usize = caps[1].parse().map_err(|_| invalid())?;
        if k == 0 {
            return Ok(Self::Insensitive);
        }
        match &caps[2] {
            "call" => Ok(Self::KCall(k)),
            "obj" => Ok(Self::KObj(k)),
            "type" => Ok(Self::KType(k)),
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for SelectorKind {
    type Error = AnalysisError;

    fn try_from(s: String) -> AnalysisResult<Self> {
        s.parse()
    }
}

impl From<SelectorKind> for String {
    fn from(kind: SelectorKind) -> Self {
        kind.to_string()
    }
}

impl fmt::Display for SelectorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Insensitive => write!(f, "ci"),
            Self::KCall(k) => write!(f, "{k}-call"),
            Self::KObj(k) => write!(f, "{k}-obj"),
            Self::KType(k) => write!(f, "{k}-type"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct AnalysisOptions {
    /// Context sensitivity.
    pub cs: SelectorKind,
    /// Descriptor of the method to start from, instead of the program entry.
    pub entry: Option<String>,
    /// Feed the entry method arguments array with a mock string.
    pub mock_main_args: bool,
}

impl AnalysisOptions {
    pub fn from_json(input: &str) -> AnalysisResult<Self> {
        Ok(serde_json::from_str(input)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_selector_kinds() {
        assert_eq!("ci".parse::<SelectorKind>().unwrap(), SelectorKind::Insensitive);
        assert_eq!("2-call".parse::<SelectorKind>().unwrap(), SelectorKind::KCall(2));
        assert_eq!("1-obj".parse::<SelectorKind>().unwrap(), SelectorKind::KObj(1));
        assert_eq!("2-type".parse::<SelectorKind>().unwrap(), SelectorKind::KType(2));
        for zero in ["0-call", "0-obj", "0-type"] {
            assert_eq!(zero.parse::<SelectorKind>().unwrap(), SelectorKind::Insensitive);
        }
        for invalid in ["", "2-cfa", "obj", "-1-call", "2-obj "] {
            assert!(matches!(
                invalid.parse::<SelectorKind>(),
                Err(AnalysisError::InvalidContextSensitivity(_))
            ));
        }
        for kind in ["ci", "3-call", "2-obj", "1-type"] {
            assert_eq!(kind.parse::<SelectorKind>().unwrap().to_string(), kind);
        }
    }

    #[test]
    fn options_from_json() {
        let options = AnalysisOptions::from_json(
            r#"{ "cs": "2-obj", "entry": "LMain;->main()V", "mock-main-args": true }"#,
        )
        .unwrap();
        assert_eq!(options.cs, SelectorKind::KObj(2));
        assert_eq!(options.entry.as_deref(), Some("LMain;->main()V"));
        assert!(options.mock_main_args);

        assert_eq!(AnalysisOptions::from_json("{}").unwrap(), AnalysisOptions::default());
        assert!(AnalysisOptions::from_json(r#"{ "cs": "k-obj" }"#).is_err());
        assert!(AnalysisOptions::from_json(r#"{ "depth": 3 }"#).is_err());
    }
}
