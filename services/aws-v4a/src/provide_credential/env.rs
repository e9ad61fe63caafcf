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

use std::env;

use log::debug;

use crate::{constants::*, Credential};
use sigv4a_core::{ProvideCredential, Result};

/// EnvCredentialProvider loads AWS credentials from environment variables.
///
/// This provider looks for the following environment variables:
/// - `AWS_ACCESS_KEY_ID`: The AWS access key ID
/// - `AWS_SECRET_ACCESS_KEY`: The AWS secret access key
/// - `AWS_SESSION_TOKEN`: The AWS session token (optional)
///
/// The anonymous credential is returned if either key is missing, so
/// requests go out unsigned instead of failing.
#[derive(Debug, Default, Clone)]
pub struct EnvCredentialProvider;

impl EnvCredentialProvider {
    /// Create a new EnvCredentialProvider.
    pub fn new() -> Self {
        Self
    }
}

impl ProvideCredential for EnvCredentialProvider {
    type Credential = Credential;

    fn provide_credential(&self) -> Result<Self::Credential> {
        let access_key_id = env::var(AWS_ACCESS_KEY_ID).ok();
        let secret_access_key = env::var(AWS_SECRET_ACCESS_KEY).ok();

        match (access_key_id, secret_access_key) {
            (Some(ak), Some(sk)) => Ok(Credential {
                access_key_id: ak,
                secret_access_key: sk,
                session_token: env::var(AWS_SESSION_TOKEN).ok(),
            }),
            _ => {
                debug!("{AWS_ACCESS_KEY_ID} or {AWS_SECRET_ACCESS_KEY} not set, using anonymous credential");
                Ok(Credential::default())
            }
        }
    }
}
