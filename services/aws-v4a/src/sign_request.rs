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

use std::borrow::Cow;
use std::sync::Arc;

use http::header::{AUTHORIZATION, HOST};
use http::HeaderValue;
use log::debug;

use sigv4a_core::time::{format_iso8601, truncate_to_minute, Clock, DateTime, SystemClock};
use sigv4a_core::{
    Error, ProvideCredential, Result, SignableBody, SignableRequest, SigningCredential,
};

use crate::canonical::{
    canonicalize_headers, canonicalize_query, parse_query, split_path, CanonicalRequest,
    SigningType,
};
use crate::config::{Config, SignatureLocation};
use crate::constants::*;
use crate::key::DerivedKey;
use crate::signature::{calculate_signature, credential_scope, string_to_sign};
use crate::Credential;

/// Signer that implements AWS SigV4A.
///
/// A signer is cheap to clone and can be shared between threads: it holds
/// no mutable state.
#[derive(Clone, Debug)]
pub struct Signer {
    config: Arc<Config>,
    provider: Arc<dyn ProvideCredential<Credential = Credential>>,
    clock: Arc<dyn Clock>,
}

impl Signer {
    /// Create a new signer, reading the wall clock.
    ///
    /// Returns [`sigv4a_core::ErrorKind::ConfigInvalid`] if `config` fails [`Config::check`].
    pub fn new(
        config: Config,
        provider: impl ProvideCredential<Credential = Credential>,
    ) -> Result<Self> {
        config.check()?;

        Ok(Self {
            config: Arc::new(config),
            provider: Arc::new(provider),
            clock: Arc::new(SystemClock),
        })
    }

    /// Specify the clock used for signing.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    pub fn with_clock(mut self, clock: impl Clock) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Config of this signer.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Sign a request with its payload hash computed from the body.
    ///
    /// With `sign_body` unset or an empty body the hash of the empty string
    /// is used. `region_set` replaces the configured region set for this
    /// call only.
    pub fn sign<R: SignableBody + ?Sized>(
        &self,
        req: &mut R,
        sign_body: bool,
        region_set: Option<&str>,
    ) -> Result<()> {
        let Some(cred) = self.credential()? else {
            return Ok(());
        };

        let payload_hash = SigningType::Normal { sign_body }.payload_hash(Some(req.body()));
        self.sign_with(req, &cred, &payload_hash, region_set)
    }

    /// Sign a request whose body is not known yet with the hash of the
    /// empty string.
    pub fn sign_empty_payload<R: SignableRequest + ?Sized>(
        &self,
        req: &mut R,
        region_set: Option<&str>,
    ) -> Result<()> {
        let Some(cred) = self.credential()? else {
            return Ok(());
        };

        let payload_hash = SigningType::EmptyPayload.payload_hash(None);
        self.sign_with(req, &cred, &payload_hash, region_set)
    }

    /// Sign a request with `UNSIGNED-PAYLOAD` as its payload hash.
    pub fn sign_unsigned_payload<R: SignableRequest + ?Sized>(
        &self,
        req: &mut R,
        region_set: Option<&str>,
    ) -> Result<()> {
        let Some(cred) = self.credential()? else {
            return Ok(());
        };

        let payload_hash = SigningType::UnsignedPayload.payload_hash(None);
        self.sign_with(req, &cred, &payload_hash, region_set)
    }

    /// Resolve the credential, `None` means signing is skipped.
    fn credential(&self) -> Result<Option<Credential>> {
        let cred = self.provider.provide_credential()?;
        if !cred.is_valid() {
            debug!("credential is anonymous or incomplete, skip signing");
            return Ok(None);
        }
        Ok(Some(cred))
    }

    fn sign_with<R: SignableRequest + ?Sized>(
        &self,
        req: &mut R,
        cred: &Credential,
        payload_hash: &str,
        region_set: Option<&str>,
    ) -> Result<()> {
        let method = req
            .method()
            .ok_or_else(|| Error::request_invalid("request is missing :method"))?
            .to_string();
        let path = req
            .path()
            .ok_or_else(|| Error::request_invalid("request is missing :path"))?
            .to_string();

        let region_set = region_set
            .filter(|v| !v.is_empty())
            .unwrap_or(self.config.region_set.as_str());
        let now = truncate_to_minute(self.clock.now());
        let location = self.config.signature_location();
        let scope = credential_scope(now, &self.config.service);

        // All changes go to a copy and are applied once signing succeeds.
        let mut headers = req.headers().clone();
        if !headers.contains_key(HOST) {
            if let Some(authority) = req.authority() {
                headers.insert(HOST, HeaderValue::from_str(authority)?);
            }
        }
        headers.insert(X_AMZ_CONTENT_SHA_256, HeaderValue::from_str(payload_hash)?);
        if location == SignatureLocation::Headers {
            headers.insert(X_AMZ_DATE, HeaderValue::from_str(&format_iso8601(now))?);
            if let Some(token) = &cred.session_token {
                let mut value = HeaderValue::from_str(token)?;
                // Set token value sensitive to avoid leaking.
                value.set_sensitive(true);
                headers.insert(X_AMZ_SECURITY_TOKEN, value);
            }
            headers.insert(X_AMZ_REGION_SET, HeaderValue::from_str(region_set)?);
        }

        let (path, query) = split_path(&path);
        let mut creq = CanonicalRequest {
            method: &method,
            path,
            query: Cow::Borrowed(query),
            headers: canonicalize_headers(&headers, location, &self.config.header_exclusions)?,
            payload_hash,
        };
        let signed_headers = creq.signed_headers();
        if let SignatureLocation::QueryString { expires_in } = location {
            let params = PresignParams {
                cred,
                now,
                scope: &scope,
                region_set,
                expires_in,
                signed_headers: &signed_headers,
            };
            creq.query = Cow::Owned(params.canonical_query(query));
        }

        let creq_string = creq.to_string();
        debug!("calculated canonical request: {creq_string}");
        let sts = string_to_sign(&creq_string, now, &scope);
        debug!("calculated string to sign: {sts}");

        let key = DerivedKey::derive(&cred.access_key_id, &cred.secret_access_key)?;
        let signature = calculate_signature(&key, &sts)?;

        match location {
            SignatureLocation::Headers => {
                let mut authorization = HeaderValue::from_str(&format!(
                    "{SIGV4A_ALGORITHM} Credential={}/{scope}, SignedHeaders={signed_headers}, Signature={signature}",
                    cred.access_key_id
                ))?;
                authorization.set_sensitive(true);
                headers.insert(AUTHORIZATION, authorization);
            }
            SignatureLocation::QueryString { .. } => {
                req.set_path(&format!(
                    "{path}?{}&{X_AMZ_SIGNATURE_PARAM}={signature}",
                    creq.query
                ))?;
            }
        }

        // Apply to the request.
        *req.headers_mut() = headers;
        Ok(())
    }
}

/// Values of the `X-Amz-*` query parameters of a presigned request.
struct PresignParams<'a> {
    cred: &'a Credential,
    now: DateTime,
    scope: &'a str,
    region_set: &'a str,
    expires_in: u16,
    signed_headers: &'a str,
}

impl PresignParams<'_> {
    /// Merge the signing parameters into `query` and canonicalize the result.
    fn canonical_query(&self, query: &str) -> String {
        let credential = format!("{}/{}", self.cred.access_key_id, self.scope);
        let date = format_iso8601(self.now);
        let expires = self.expires_in.to_string();

        let mut params = parse_query(query);
        params.push((X_AMZ_ALGORITHM_PARAM, SIGV4A_ALGORITHM));
        params.push((X_AMZ_CREDENTIAL_PARAM, credential.as_str()));
        params.push((X_AMZ_DATE_PARAM, date.as_str()));
        params.push((X_AMZ_EXPIRES_PARAM, expires.as_str()));
        params.push((X_AMZ_REGION_SET_PARAM, self.region_set));
        params.push((X_AMZ_SIGNED_HEADERS_PARAM, self.signed_headers));
        if let Some(token) = &self.cred.session_token {
            params.push((X_AMZ_SECURITY_TOKEN_PARAM, token.as_str()));
        }

        canonicalize_query(params)
    }
}
