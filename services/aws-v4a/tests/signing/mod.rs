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

use anyhow::{anyhow, Result};
use http::header::AUTHORIZATION;
use http::{HeaderValue, Method};
use p256::ecdsa::signature::hazmat::PrehashVerifier;
use p256::ecdsa::{Signature, VerifyingKey};
use sigv4a_aws::{
    parse_query, split_path, string_to_sign, Config, DerivedKey, Signer, StaticCredentialProvider,
};
use sigv4a_core::hash::sha256;
use sigv4a_core::time::{DateTime, FixedClock};
use sigv4a_core::RequestHead;

mod header;

/// 2018-01-02T03:04:05Z, signed as `20180102T030400Z`.
pub const TEST_TIMESTAMP: i64 = 1514862245;
pub const TEST_SCOPE: &str = "20180102/service/aws4_request";

pub fn test_time(timestamp: i64) -> DateTime {
    DateTime::from_timestamp(timestamp, 0).expect("timestamp must be valid")
}

/// Build a signer for `service` in `region` with a pinned clock.
pub fn init_signer(config: Config, provider: StaticCredentialProvider) -> Signer {
    let _ = env_logger::builder().is_test(true).try_init();

    Signer::new(config, provider)
        .expect("config must be valid")
        .with_clock(FixedClock::new(test_time(TEST_TIMESTAMP)))
}

pub fn header_signer() -> Signer {
    init_signer(
        Config::new("service", "region"),
        StaticCredentialProvider::new("akid", "secret"),
    )
}

pub fn query_signer(expiration: Option<u16>) -> Signer {
    init_signer(
        Config::new("service", "region").with_query_string(expiration),
        StaticCredentialProvider::new("akid", "secret"),
    )
}

/// `GET /` with a host header.
pub fn host_request(path: &str) -> RequestHead {
    let mut req = RequestHead::new(Method::GET, path);
    req.headers
        .insert("host", HeaderValue::from_static("www.example.com"));
    req
}

pub fn authorization(req: &RequestHead) -> Result<&str> {
    Ok(req
        .headers
        .get(AUTHORIZATION)
        .ok_or_else(|| anyhow!("authorization header is missing"))?
        .to_str()?)
}

/// Extract the hex signature from the `Authorization` header or the query string.
pub fn extract_signature(req: &RequestHead, in_query: bool) -> Result<String> {
    if in_query {
        let path = req.path.as_deref().unwrap_or_default();
        let (_, query) = split_path(path);
        let (_, signature) = parse_query(query)
            .into_iter()
            .find(|(k, _)| *k == "X-Amz-Signature")
            .ok_or_else(|| anyhow!("X-Amz-Signature is missing in {path}"))?;
        return Ok(signature.to_string());
    }

    let (_, signature) = authorization(req)?
        .split_once("Signature=")
        .ok_or_else(|| anyhow!("authorization has no signature"))?;
    Ok(signature.to_string())
}

/// Verify `signature` over `canonical_request` with a key derived
/// independently from the signer.
pub fn verify_canonical_request(canonical_request: &str, signature: &str) -> Result<()> {
    let key = DerivedKey::derive("akid", "secret")?;
    let verifying_key = VerifyingKey::from_sec1_bytes(&key.public_point())?;

    let sts = string_to_sign(canonical_request, test_time(1514862240), TEST_SCOPE);
    let signature = Signature::from_der(&hex::decode(signature)?)?;
    verifying_key.verify_prehash(&sha256(sts.as_bytes()), &signature)?;
    Ok(())
}
