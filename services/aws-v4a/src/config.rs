// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use std::collections::HashMap;
use std::env;

use sigv4a_core::{Error, Result};

use crate::constants::*;

/// Where the signature of a request ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureLocation {
    /// `Authorization` header plus `x-amz-*` headers.
    Headers,
    /// Presigned `X-Amz-*` query parameters.
    QueryString {
        /// Value of `X-Amz-Expires` in seconds.
        expires_in: u16,
    },
}

/// Case-insensitive pattern on header names.
///
/// Headers matching any configured pattern are left out of the signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderMatcher {
    /// Whole name equals the pattern.
    Exact(String),
    /// Name starts with the pattern.
    Prefix(String),
    /// Name ends with the pattern.
    Suffix(String),
    /// Name contains the pattern.
    Contains(String),
}

impl HeaderMatcher {
    /// Check whether `name` matches this pattern, ignoring ASCII case.
    pub fn matches(&self, name: &str) -> bool {
        let name = name.to_ascii_lowercase();
        match self {
            HeaderMatcher::Exact(p) => name == p.to_ascii_lowercase(),
            HeaderMatcher::Prefix(p) => name.starts_with(&p.to_ascii_lowercase()),
            HeaderMatcher::Suffix(p) => name.ends_with(&p.to_ascii_lowercase()),
            HeaderMatcher::Contains(p) => name.contains(&p.to_ascii_lowercase()),
        }
    }
}

/// Config for the sigv4a signer.
///
/// Built once and shared by every signing call.
#[derive(Clone, Debug, Default)]
pub struct Config {
    /// Service name like `s3`, part of the credential scope.
    pub service: String,
    /// Comma joined region tokens the signature is valid for, like `us-east-1,us-west-*`.
    ///
    /// `region_set` will be loaded from:
    ///
    /// - this field if it's not empty
    /// - env value: `AWS_SIGV4A_SIGNING_REGION_SET`
    /// - env value: `AWS_REGION`
    /// - env value: `AWS_DEFAULT_REGION`
    pub region_set: String,
    /// Sign into the query string instead of headers.
    pub query_string: bool,
    /// `X-Amz-Expires` of presigned requests in seconds.
    ///
    /// `None` or `0` falls back to 5 seconds. Ignored unless `query_string` is set.
    pub expiration: Option<u16>,
    /// Headers that should never be signed.
    pub header_exclusions: Vec<HeaderMatcher>,
}

impl Config {
    /// Create a config signing headers for `service` within `region_set`.
    pub fn new(service: &str, region_set: &str) -> Self {
        Self {
            service: service.to_string(),
            region_set: region_set.to_string(),
            ..Default::default()
        }
    }

    /// Switch to query string signing with the given expiration.
    pub fn with_query_string(mut self, expiration: Option<u16>) -> Self {
        self.query_string = true;
        self.expiration = expiration;
        self
    }

    /// Add a header exclusion.
    pub fn with_header_exclusion(mut self, matcher: HeaderMatcher) -> Self {
        self.header_exclusions.push(matcher);
        self
    }

    /// Load config from env.
    pub fn from_env(mut self) -> Self {
        let envs = env::vars().collect::<HashMap<_, _>>();

        if self.region_set.is_empty() {
            if let Some(v) = [AWS_SIGV4A_SIGNING_REGION_SET, AWS_REGION, AWS_DEFAULT_REGION]
                .iter()
                .find_map(|k| envs.get(*k).filter(|v| !v.is_empty()))
            {
                self.region_set = v.to_string();
            }
        }

        self
    }

    /// Check if current config is usable for signing.
    pub fn check(&self) -> Result<()> {
        if self.service.is_empty() {
            return Err(Error::config_invalid("service must not be empty"));
        }
        if self.region_set.is_empty() {
            return Err(Error::config_invalid("region set must not be empty"));
        }
        if self.region_set.split(',').any(|v| v.trim().is_empty()) {
            return Err(Error::config_invalid(format!(
                "region set {:?} contains an empty region",
                self.region_set
            )));
        }

        Ok(())
    }

    /// Resolve where signatures are written.
    pub fn signature_location(&self) -> SignatureLocation {
        if !self.query_string {
            return SignatureLocation::Headers;
        }

        let expires_in = match self.expiration {
            Some(v) if v > 0 => v,
            _ => DEFAULT_QUERY_EXPIRATION,
        };
        SignatureLocation::QueryString { expires_in }
    }
}
