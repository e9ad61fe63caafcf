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

//! Build the canonical request of sigv4a.

use std::borrow::Cow;
use std::fmt::{Display, Formatter, Write};

use http::header::{AUTHORIZATION, HOST};
use http::HeaderMap;
use percent_encoding::utf8_percent_encode;

use sigv4a_core::hash::hex_sha256;
use sigv4a_core::{Error, Result};

use crate::config::{HeaderMatcher, SignatureLocation};
use crate::constants::*;

/// How the payload hash of a request is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigningType {
    /// Hash the body if `sign_body` is set and the body is not empty,
    /// otherwise use the hash of the empty string.
    Normal {
        /// Whether the body takes part in the signature.
        sign_body: bool,
    },
    /// Always use the hash of the empty string.
    EmptyPayload,
    /// Use the literal `UNSIGNED-PAYLOAD`.
    UnsignedPayload,
}

impl SigningType {
    /// Resolve the value of `x-amz-content-sha256` for `body`.
    pub fn payload_hash(&self, body: Option<&[u8]>) -> Cow<'static, str> {
        match (self, body) {
            (SigningType::Normal { sign_body: true }, Some(body)) if !body.is_empty() => {
                Cow::Owned(hex_sha256(body))
            }
            (SigningType::UnsignedPayload, _) => Cow::Borrowed(UNSIGNED_PAYLOAD),
            _ => Cow::Borrowed(EMPTY_STRING_SHA256),
        }
    }
}

/// Split a request path into the path and the raw query string.
///
/// ```
/// use sigv4a_aws::split_path;
///
/// assert_eq!(split_path("/a/b?x=1&y"), ("/a/b", "x=1&y"));
/// assert_eq!(split_path("/"), ("/", ""));
/// ```
pub fn split_path(path: &str) -> (&str, &str) {
    path.split_once('?').unwrap_or((path, ""))
}

/// Split a raw query string into key/value pairs.
///
/// Pairs are separated by `&`, keys and values by the first `=`. A key
/// without `=` has an empty value.
pub fn parse_query(query: &str) -> Vec<(&str, &str)> {
    query
        .split('&')
        .filter(|v| !v.is_empty())
        .map(|v| v.split_once('=').unwrap_or((v, "")))
        .collect()
}

/// Percent-encode a query key or value with the AWS query encode set.
///
/// Valid `%XX` escapes are kept as supplied so that already encoded input
/// is not encoded twice.
pub fn encode_query_component(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut out = String::with_capacity(value.len());

    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        let is_escape = bytes[i] == b'%'
            && bytes.get(i + 1).is_some_and(|b| b.is_ascii_hexdigit())
            && bytes.get(i + 2).is_some_and(|b| b.is_ascii_hexdigit());
        if is_escape {
            out.extend(utf8_percent_encode(&value[start..i], &AWS_QUERY_ENCODE_SET));
            out.push_str(&value[i..i + 3]);
            i += 3;
            start = i;
        } else {
            i += 1;
        }
    }
    out.extend(utf8_percent_encode(&value[start..], &AWS_QUERY_ENCODE_SET));

    out
}

/// Encode every pair and sort them by key, then by value.
pub fn canonicalize_query<'a>(params: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    let mut params = params
        .into_iter()
        .map(|(k, v)| (encode_query_component(k), encode_query_component(v)))
        .collect::<Vec<_>>();
    params.sort();

    params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Collect the headers to sign as sorted `(name, value)` pairs.
///
/// Values are trimmed and repeated headers are joined with `,`. In query
/// string mode only `host` and `x-amz-content-sha256` are signed and
/// `exclusions` does not apply.
pub fn canonicalize_headers(
    headers: &HeaderMap,
    location: SignatureLocation,
    exclusions: &[HeaderMatcher],
) -> Result<Vec<(String, String)>> {
    let mut signed = Vec::with_capacity(headers.keys_len());

    for name in headers.keys() {
        let name = name.as_str();
        if !is_signable(name, location, exclusions) {
            continue;
        }

        let mut value = String::new();
        for (idx, v) in headers.get_all(name).iter().enumerate() {
            let v = v.to_str().map_err(|e| {
                Error::request_invalid(format!("header {name} has a non visible ASCII value"))
                    .with_source(e)
            })?;
            if idx > 0 {
                value.push(',');
            }
            value.push_str(v.trim());
        }
        signed.push((name.to_string(), value));
    }
    signed.sort();

    Ok(signed)
}

fn is_signable(name: &str, location: SignatureLocation, exclusions: &[HeaderMatcher]) -> bool {
    if let SignatureLocation::QueryString { .. } = location {
        return name == HOST.as_str() || name == X_AMZ_CONTENT_SHA_256;
    }

    match name {
        // Signing headers are always signed.
        X_AMZ_CONTENT_SHA_256 | X_AMZ_DATE | X_AMZ_REGION_SET | X_AMZ_SECURITY_TOKEN => true,
        // Rewritten by proxies in flight.
        X_FORWARDED_FOR | X_FORWARDED_PROTO | X_AMZN_TRACE_ID => false,
        _ if name == AUTHORIZATION.as_str() => false,
        _ => !exclusions.iter().any(|m| m.matches(name)),
    }
}

/// Canonical request of sigv4a.
///
/// Its `Display` output is the exact string hashed into the string to sign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalRequest<'a> {
    /// HTTP method.
    pub method: &'a str,
    /// Path without the query string.
    pub path: &'a str,
    /// Canonical query string.
    pub query: Cow<'a, str>,
    /// Sorted `(name, value)` pairs of signed headers.
    pub headers: Vec<(String, String)>,
    /// Value of `x-amz-content-sha256`.
    pub payload_hash: &'a str,
}

impl CanonicalRequest<'_> {
    /// Names of signed headers joined by `;`.
    pub fn signed_headers(&self) -> String {
        self.headers
            .iter()
            .map(|(k, _)| k.as_str())
            .collect::<Vec<_>>()
            .join(";")
    }
}

impl Display for CanonicalRequest<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.method)?;
        writeln!(f, "{}", self.path)?;
        writeln!(f, "{}", self.query)?;
        for (name, value) in &self.headers {
            f.write_str(name)?;
            f.write_char(':')?;
            f.write_str(value)?;
            f.write_char('\n')?;
        }
        writeln!(f)?;
        writeln!(f, "{}", self.signed_headers())?;
        write!(f, "{}", self.payload_hash)
    }
}
