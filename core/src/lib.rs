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

//! Core components for signing API requests.
//!
//! This crate provides the protocol independent pieces shared by signers:
//!
//! - **Credentials**: [`ProvideCredential`] resolves a credential for each
//!   signing call and [`SigningCredential`] tells whether it can be used.
//! - **Requests**: [`SignableRequest`] and [`SignableBody`] abstract over the
//!   request being signed. They are implemented for [`http::Request`],
//!   [`http::request::Parts`], and for [`RequestHead`] / [`RequestMessage`],
//!   which model proxy-side requests whose `:method` or `:path` may be absent.
//! - **Time**: the [`time::Clock`] seam plus formatting helpers.
//! - **Errors**: [`Error`] and [`ErrorKind`].
//!
//! ## Utilities
//!
//! - [`hash`]: Cryptographic hashing utilities
//! - [`time`]: Time manipulation utilities
//! - [`utils`]: General utilities including data redaction

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub mod utils;

mod api;
pub use api::{ProvideCredential, SigningCredential};
mod error;
pub use error::{Error, ErrorKind, Result};
mod request;
pub use request::{RequestHead, RequestMessage, SignableBody, SignableRequest};
