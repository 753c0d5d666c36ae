//! Candidate Catalog
//!
//! The portals publish no API contract, so every search list (base
//! domains, login paths, payload shapes, token field names, data
//! endpoints) is plain data. The negotiators walk these lists in order;
//! nothing about the search lives in code branches.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::Region;
use crate::ports::PayloadEncoding;

/// One field of a login payload.
///
/// `value` may contain the `{username}` and `{password}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadField {
    pub name: String,
    pub value: String,
}

/// The account credentials under one field-name convention
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadShape {
    pub fields: Vec<PayloadField>,
}

impl PayloadShape {
    fn of(fields: &[(&str, &str)]) -> Self {
        Self {
            fields: fields
                .iter()
                .map(|(name, value)| PayloadField {
                    name: name.to_string(),
                    value: value.to_string(),
                })
                .collect(),
        }
    }

    /// Substitute the placeholders, preserving field order
    pub fn render(&self, username: &str, password: &str) -> Vec<(String, String)> {
        self.fields
            .iter()
            .map(|field| {
                let value = field
                    .value
                    .replace("{username}", username)
                    .replace("{password}", password);
                (field.name.clone(), value)
            })
            .collect()
    }

    /// Field names only, for logs
    pub fn describe(&self) -> String {
        self.fields
            .iter()
            .map(|f| f.name.as_str())
            .collect::<Vec<_>>()
            .join("+")
    }
}

/// Everything the pipeline may try for one region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionProfile {
    pub domains: Vec<String>,
    pub login_paths: Vec<String>,
    pub payload_shapes: Vec<PayloadShape>,
    pub token_fields: Vec<String>,
    pub info_endpoints: Vec<String>,
    pub consumption_endpoints: Vec<String>,
    /// Regions to try next when this one yields nothing
    #[serde(default)]
    pub fallback_regions: Vec<Region>,
}

/// Ordered candidate lists for every supported region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateCatalog {
    /// Innermost loop of the login search
    #[serde(default = "default_encodings")]
    pub encodings: Vec<PayloadEncoding>,
    pub regions: HashMap<Region, RegionProfile>,
}

fn default_encodings() -> Vec<PayloadEncoding> {
    vec![PayloadEncoding::Form, PayloadEncoding::Json]
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl CandidateCatalog {
    pub fn profile(&self, region: Region) -> Option<&RegionProfile> {
        self.regions.get(&region)
    }

    /// `primary` followed by its fallback chain, without repeats
    pub fn region_chain(&self, primary: Region) -> Vec<Region> {
        let mut chain = vec![primary];
        let mut cursor = 0;
        while cursor < chain.len() {
            if let Some(profile) = self.profile(chain[cursor]) {
                for next in &profile.fallback_regions {
                    if !chain.contains(next) {
                        chain.push(*next);
                    }
                }
            }
            cursor += 1;
        }
        chain
    }

    /// Reject profiles that could never produce a candidate
    pub fn validate(&self) -> Result<(), String> {
        if self.encodings.is_empty() {
            return Err("catalog must list at least one payload encoding".to_string());
        }
        for (region, profile) in &self.regions {
            let lists = [
                ("domains", profile.domains.len()),
                ("login_paths", profile.login_paths.len()),
                ("payload_shapes", profile.payload_shapes.len()),
                ("token_fields", profile.token_fields.len()),
                ("info_endpoints", profile.info_endpoints.len()),
                ("consumption_endpoints", profile.consumption_endpoints.len()),
            ];
            if let Some((name, _)) = lists.iter().find(|(_, len)| *len == 0) {
                return Err(format!("{} profile has an empty {} list", region, name));
            }
        }
        Ok(())
    }
}

impl Default for CandidateCatalog {
    fn default() -> Self {
        let mut regions = HashMap::new();
        regions.insert(Region::EvnHcmc, hcmc_profile());
        regions.insert(Region::EvnHanoi, hanoi_profile());
        regions.insert(
            Region::EvnNpc,
            generic_profile(&["https://cskh.npc.com.vn", "https://npc.com.vn"]),
        );
        regions.insert(
            Region::EvnCpc,
            generic_profile(&["https://cskh.cpc.vn", "https://cpc.vn"]),
        );
        regions.insert(
            Region::EvnSpc,
            generic_profile(&["https://cskh.evnspc.vn", "https://evnspc.vn"]),
        );

        Self {
            encodings: default_encodings(),
            regions,
        }
    }
}

const GENERIC_LOGIN_PATHS: &[&str] = &[
    "/api/token",
    "/api/auth/login",
    "/api/authenticate",
    "/auth/login",
    "/api/login",
    "/token",
    "/login",
];

const GENERIC_INFO_ENDPOINTS: &[&str] = &[
    "/api/customer/info",
    "/api/khachhang/thongtin",
    "/api/cskh/thongtinkhachhang",
    "/api/customer/details",
];

const GENERIC_CONSUMPTION_ENDPOINTS: &[&str] = &[
    "/api/consumption/daily",
    "/api/sanluong/daily",
    "/api/meter/consumption",
    "/api/cskh/sanluong",
];

fn generic_payload_shapes() -> Vec<PayloadShape> {
    vec![
        PayloadShape::of(&[
            ("username", "{username}"),
            ("password", "{password}"),
            ("grant_type", "password"),
        ]),
        PayloadShape::of(&[("username", "{username}"), ("password", "{password}")]),
        PayloadShape::of(&[("user", "{username}"), ("pwd", "{password}")]),
        PayloadShape::of(&[("loginName", "{username}"), ("password", "{password}")]),
        PayloadShape::of(&[("email", "{username}"), ("password", "{password}")]),
        PayloadShape::of(&[("phone", "{username}"), ("password", "{password}")]),
    ]
}

fn generic_profile(domains: &[&str]) -> RegionProfile {
    RegionProfile {
        domains: strings(domains),
        login_paths: strings(GENERIC_LOGIN_PATHS),
        payload_shapes: generic_payload_shapes(),
        token_fields: strings(&["access_token", "token", "jwt"]),
        info_endpoints: strings(GENERIC_INFO_ENDPOINTS),
        consumption_endpoints: strings(GENERIC_CONSUMPTION_ENDPOINTS),
        fallback_regions: Vec::new(),
    }
}

fn hcmc_profile() -> RegionProfile {
    RegionProfile {
        fallback_regions: vec![Region::EvnHanoi],
        ..generic_profile(&[
            "https://cskh.evnhcmc.vn",
            "https://evnhcmc.vn",
            "https://www.evnhcmc.vn",
        ])
    }
}

fn hanoi_profile() -> RegionProfile {
    RegionProfile {
        domains: strings(&[
            "https://cskh.evnhanoi.vn",
            "https://evnhanoi.vn",
            "https://www.evnhanoi.vn",
        ]),
        login_paths: strings(&[
            "/api/token",
            "/api/auth/login",
            "/auth/login",
            "/api/login",
            "/token",
        ]),
        payload_shapes: vec![
            PayloadShape::of(&[
                ("username", "{username}"),
                ("password", "{password}"),
                ("client_id", "httplocalhost4500"),
                ("client_secret", "secret"),
                ("grant_type", "password"),
            ]),
            PayloadShape::of(&[("username", "{username}"), ("password", "{password}")]),
            PayloadShape::of(&[("user", "{username}"), ("pwd", "{password}")]),
            PayloadShape::of(&[("loginName", "{username}"), ("password", "{password}")]),
        ],
        token_fields: strings(&["access_token"]),
        info_endpoints: strings(&[
            "/api/cskh/thongtinkhachhang/laythongtinkhachhang",
            "/api/customer/info",
            "/api/khachhang/thongtin",
        ]),
        consumption_endpoints: strings(&[
            "/api/cskh/sanluong/laydulieusanluong",
            "/api/consumption/daily",
            "/api/sanluong/daily",
        ]),
        fallback_regions: Vec::new(),
    }
}
