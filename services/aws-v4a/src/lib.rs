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

//! AWS SigV4A signer.
//!
//! SigV4A signs requests with an ECDSA P-256 key derived from the access
//! key pair, so that one signature is valid in every region of a region set.
//!
//! ## Example
//!
//! ```no_run
//! use sigv4a_aws::{Config, EnvCredentialProvider, Signer};
//!
//! # fn main() -> sigv4a_core::Result<()> {
//! let config = Config::new("s3", "").from_env();
//! let signer = Signer::new(config, EnvCredentialProvider::new())?;
//!
//! let mut req = http::Request::get("https://example.com/object")
//!     .body(Vec::new())
//!     .expect("request must be valid");
//! signer.sign(&mut req, true, None)?;
//! # Ok(())
//! # }
//! ```
//!
//! Presigned requests carry the signature in their query string instead:
//!
//! ```no_run
//! use sigv4a_aws::{Config, Signer, StaticCredentialProvider};
//!
//! # fn main() -> sigv4a_core::Result<()> {
//! let config = Config::new("s3", "us-east-*,eu-west-1").with_query_string(Some(300));
//! let signer = Signer::new(config, StaticCredentialProvider::new("akid", "secret"))?;
//!
//! let mut req = http::Request::get("https://example.com/object")
//!     .body(())
//!     .expect("request must be valid");
//! signer.sign_unsigned_payload(&mut req, None)?;
//! # Ok(())
//! # }
//! ```

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

mod constants;

mod config;
pub use config::{Config, HeaderMatcher, SignatureLocation};

mod credential;
pub use credential::Credential;

mod provide_credential;
pub use provide_credential::*;

mod key;
pub use key::DerivedKey;

mod canonical;
pub use canonical::*;

mod signature;
pub use signature::{calculate_signature, credential_scope, string_to_sign, verify_signature};

mod sign_request;
pub use sign_request::Signer;
