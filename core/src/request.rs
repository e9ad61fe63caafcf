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

use std::str::FromStr;

use bytes::Bytes;
use http::uri::PathAndQuery;
use http::HeaderMap;
use http::Method;
use http::Uri;

use crate::Result;

/// A request head that can be signed in place.
///
/// `method` and `path` are optional because a request seen by a proxy may
/// still be missing its pseudo headers; signers reject such requests.
pub trait SignableRequest {
    /// HTTP method, `None` if the request has no `:method`.
    fn method(&self) -> Option<&str>;

    /// Path including the raw query string, `None` if the request has no `:path`.
    fn path(&self) -> Option<&str>;

    /// Replace path and query string.
    fn set_path(&mut self, path: &str) -> Result<()>;

    /// Authority of the request target, used as `host` when no host header is present.
    fn authority(&self) -> Option<&str> {
        None
    }

    /// Request headers.
    fn headers(&self) -> &HeaderMap;

    /// Mutable request headers.
    fn headers_mut(&mut self) -> &mut HeaderMap;
}

/// A signable request that also exposes its body.
pub trait SignableBody: SignableRequest {
    /// Request body bytes.
    fn body(&self) -> &[u8];
}

/// Request head with optional pseudo headers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestHead {
    /// The `:method` pseudo header.
    pub method: Option<Method>,
    /// The `:path` pseudo header, including query string.
    pub path: Option<String>,
    /// Regular headers.
    pub headers: HeaderMap,
}

impl RequestHead {
    /// Create a request head with method and path set.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method: Some(method),
            path: Some(path.into()),
            headers: HeaderMap::new(),
        }
    }
}

impl SignableRequest for RequestHead {
    fn method(&self) -> Option<&str> {
        self.method.as_ref().map(|m| m.as_str())
    }

    fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    fn set_path(&mut self, path: &str) -> Result<()> {
        self.path = Some(path.to_string());
        Ok(())
    }

    fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }
}

/// Request head together with a fully buffered body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestMessage {
    /// Request head.
    pub head: RequestHead,
    /// Request body.
    pub body: Bytes,
}

impl SignableRequest for RequestMessage {
    fn method(&self) -> Option<&str> {
        self.head.method()
    }

    fn path(&self) -> Option<&str> {
        self.head.path()
    }

    fn set_path(&mut self, path: &str) -> Result<()> {
        self.head.set_path(path)
    }

    fn headers(&self) -> &HeaderMap {
        &self.head.headers
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.head.headers
    }
}

impl SignableBody for RequestMessage {
    fn body(&self) -> &[u8] {
        &self.body
    }
}

impl SignableRequest for http::request::Parts {
    fn method(&self) -> Option<&str> {
        Some(self.method.as_str())
    }

    fn path(&self) -> Option<&str> {
        Some(uri_path(&self.uri))
    }

    fn set_path(&mut self, path: &str) -> Result<()> {
        self.uri = uri_with_path(&self.uri, path)?;
        Ok(())
    }

    fn authority(&self) -> Option<&str> {
        self.uri.authority().map(|v| v.as_str())
    }

    fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }
}

impl<B> SignableRequest for http::Request<B> {
    fn method(&self) -> Option<&str> {
        Some(http::Request::method(self).as_str())
    }

    fn path(&self) -> Option<&str> {
        Some(uri_path(self.uri()))
    }

    fn set_path(&mut self, path: &str) -> Result<()> {
        let uri = uri_with_path(self.uri(), path)?;
        *self.uri_mut() = uri;
        Ok(())
    }

    fn authority(&self) -> Option<&str> {
        self.uri().authority().map(|v| v.as_str())
    }

    fn headers(&self) -> &HeaderMap {
        http::Request::headers(self)
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        http::Request::headers_mut(self)
    }
}

impl<B: AsRef<[u8]>> SignableBody for http::Request<B> {
    fn body(&self) -> &[u8] {
        http::Request::body(self).as_ref()
    }
}

fn uri_path(uri: &Uri) -> &str {
    match uri.path_and_query().map(|v| v.as_str()) {
        Some(paq) if paq.starts_with('/') => paq,
        _ => "/",
    }
}

fn uri_with_path(uri: &Uri, path: &str) -> Result<Uri> {
    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(PathAndQuery::from_str(path)?);
    Ok(Uri::from_parts(parts)?)
}
