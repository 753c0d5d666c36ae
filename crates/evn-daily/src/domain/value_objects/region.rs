//! Region - EVN utility subsidiary

use serde::{Deserialize, Serialize};

/// EVN regional subsidiary whose portal conventions apply to a customer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Region {
    #[serde(rename = "EVNHANOI")]
    EvnHanoi,
    #[serde(rename = "EVNHCMC")]
    EvnHcmc,
    #[serde(rename = "EVNNPC")]
    EvnNpc,
    #[serde(rename = "EVNCPC")]
    EvnCpc,
    #[serde(rename = "EVNSPC")]
    EvnSpc,
}

impl Region {
    pub const ALL: [Region; 5] = [
        Region::EvnHanoi,
        Region::EvnHcmc,
        Region::EvnNpc,
        Region::EvnCpc,
        Region::EvnSpc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::EvnHanoi => "EVNHANOI",
            Region::EvnHcmc => "EVNHCMC",
            Region::EvnNpc => "EVNNPC",
            Region::EvnCpc => "EVNCPC",
            Region::EvnSpc => "EVNSPC",
        }
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Region {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "EVNHANOI" => Ok(Region::EvnHanoi),
            "EVNHCMC" => Ok(Region::EvnHcmc),
            "EVNNPC" => Ok(Region::EvnNpc),
            "EVNCPC" => Ok(Region::EvnCpc),
            "EVNSPC" => Ok(Region::EvnSpc),
            _ => Err(format!("Unknown region: {}", s)),
        }
    }
}
