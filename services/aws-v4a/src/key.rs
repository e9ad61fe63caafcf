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

//! Derive the P-256 signing key of a sigv4a credential.

use std::fmt::{Debug, Formatter};

use log::debug;
use num_bigint::BigUint;
use once_cell::sync::Lazy;
use p256::ecdsa::{SigningKey, VerifyingKey};
use zeroize::Zeroizing;

use sigv4a_core::hash::hmac_sha256;
use sigv4a_core::{Error, Result};

use crate::constants::SIGV4A_ALGORITHM;

/// Order of the P-256 group.
const P256_ORDER: [u8; 32] = [
    0xff, 0xff, 0xff, 0xff, 0x00, 0x00, 0x00, 0x00, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xbc, 0xe6, 0xfa, 0xad, 0xa7, 0x17, 0x9e, 0x84, 0xf3, 0xb9, 0xca, 0xc2, 0xfc, 0x63, 0x25, 0x51,
];

/// Largest accepted candidate, `n - 2`, so that `c + 1` lands in `[1, n - 1]`.
static N_MINUS_TWO: Lazy<BigUint> = Lazy::new(|| BigUint::from_bytes_be(&P256_ORDER) - 2u32);

/// Output length of the KDF in bits.
const KDF_OUTPUT_BITS: u32 = 256;
/// Last counter value tried before giving up.
const MAX_COUNTER: u8 = 254;

/// ECDSA P-256 key pair derived from an access key id and secret access key.
///
/// Derivation is deterministic: the same credential always yields the same
/// key pair, which is what lets a verifier holding the secret recompute the
/// public key.
#[derive(Clone)]
pub struct DerivedKey {
    signing_key: SigningKey,
}

impl DerivedKey {
    /// Derive the key pair with the NIST SP 800-108 counter mode KDF.
    ///
    /// The HMAC-SHA256 key is `"AWS4A" || secret_access_key` and the fixed
    /// input for each counter is
    /// `be32(1) || "AWS4-ECDSA-P256-SHA256" || 0x00 || access_key_id || counter || be32(256)`.
    /// The first output `c` with `c <= n - 2` gives the private scalar `c + 1`.
    pub fn derive(access_key_id: &str, secret_access_key: &str) -> Result<Self> {
        let kdf_key = Zeroizing::new(format!("AWS4A{secret_access_key}"));

        let mut input = Zeroizing::new(Vec::with_capacity(
            4 + SIGV4A_ALGORITHM.len() + 1 + access_key_id.len() + 1 + 4,
        ));
        for counter in 1..=MAX_COUNTER {
            input.clear();
            input.extend_from_slice(&1u32.to_be_bytes());
            input.extend_from_slice(SIGV4A_ALGORITHM.as_bytes());
            input.push(0x00);
            input.extend_from_slice(access_key_id.as_bytes());
            input.push(counter);
            input.extend_from_slice(&KDF_OUTPUT_BITS.to_be_bytes());

            let candidate = Zeroizing::new(hmac_sha256(kdf_key.as_bytes(), &input));
            let c = BigUint::from_bytes_be(candidate.as_ref());
            if c > *N_MINUS_TWO {
                debug!("sigv4a key candidate at counter {counter} is out of range, retrying");
                continue;
            }

            let d = (c + 1u32).to_bytes_be();
            let mut scalar = Zeroizing::new([0u8; 32]);
            scalar[32 - d.len()..].copy_from_slice(&d);

            let signing_key = SigningKey::from_slice(scalar.as_ref()).map_err(|e| {
                Error::key_derivation(format!("derived scalar is not a valid P-256 key: {e}"))
            })?;
            return Ok(Self { signing_key });
        }

        Err(Error::key_derivation(format!(
            "no valid P-256 scalar after {MAX_COUNTER} counter values"
        )))
    }

    /// The private half, used to sign.
    pub fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }

    /// The public half, used to verify.
    pub fn verifying_key(&self) -> &VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// Big-endian bytes of the private scalar.
    pub fn private_scalar_bytes(&self) -> Zeroizing<[u8; 32]> {
        let mut out = Zeroizing::new([0u8; 32]);
        out.copy_from_slice(&self.signing_key.to_bytes());
        out
    }

    /// SEC1 uncompressed encoding of the public point: `0x04 || x || y`.
    pub fn public_point(&self) -> Vec<u8> {
        self.verifying_key()
            .to_encoded_point(false)
            .as_bytes()
            .to_vec()
    }
}

impl Debug for DerivedKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("public_point", &hex::encode(self.public_point()))
            .finish_non_exhaustive()
    }
}
