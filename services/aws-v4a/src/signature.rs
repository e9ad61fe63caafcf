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

use p256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use p256::ecdsa::{Signature, VerifyingKey};

use sigv4a_core::hash::{hex_sha256, sha256};
use sigv4a_core::time::{format_date, format_iso8601, DateTime};
use sigv4a_core::{Error, Result};

use crate::constants::{AWS4_REQUEST, SIGV4A_ALGORITHM};
use crate::key::DerivedKey;

/// Credential scope of sigv4a: `20180102/service/aws4_request`.
///
/// Unlike sigv4 there is no region in the scope.
pub fn credential_scope(time: DateTime, service: &str) -> String {
    format!("{}/{service}/{AWS4_REQUEST}", format_date(time))
}

/// Build the string to sign from a canonical request.
///
/// `time` is used as is, callers truncate it to the minute first.
pub fn string_to_sign(canonical_request: &str, time: DateTime, scope: &str) -> String {
    format!(
        "{SIGV4A_ALGORITHM}\n{}\n{scope}\n{}",
        format_iso8601(time),
        hex_sha256(canonical_request.as_bytes())
    )
}

/// Sign `sha256(string_to_sign)` with ECDSA P-256 and return the hex
/// encoded DER signature.
///
/// Nonces follow RFC 6979, so the same input always gives the same output.
pub fn calculate_signature(key: &DerivedKey, string_to_sign: &str) -> Result<String> {
    let digest = sha256(string_to_sign.as_bytes());
    let signature: Signature = key
        .signing_key()
        .sign_prehash(&digest)
        .map_err(|e| Error::unexpected(format!("failed to sign string to sign: {e}")))?;

    Ok(hex::encode(signature.to_der().as_bytes()))
}

/// Verify a hex encoded DER signature produced by [`calculate_signature`].
pub fn verify_signature(key: &VerifyingKey, string_to_sign: &str, signature: &str) -> Result<()> {
    let der = hex::decode(signature).map_err(|e| {
        Error::request_invalid(format!("signature is not valid hex: {e}")).with_source(e)
    })?;
    let signature = Signature::from_der(&der)
        .map_err(|e| Error::request_invalid(format!("signature is not valid DER: {e}")))?;

    key.verify_prehash(&sha256(string_to_sign.as_bytes()), &signature)
        .map_err(|e| Error::request_invalid(format!("signature mismatch: {e}")))
}
