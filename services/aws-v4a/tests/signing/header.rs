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

use anyhow::Result;
use bytes::Bytes;
use http::header::AUTHORIZATION;
use http::{HeaderValue, Method};
use pretty_assertions::assert_eq;
use sigv4a_aws::{Config, HeaderMatcher, Signer, StaticCredentialProvider};
use sigv4a_core::time::FixedClock;
use sigv4a_core::{ErrorKind, RequestHead, RequestMessage};

use super::*;

const EMPTY_STRING_SHA256: &str =
    "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

fn message(method: Method, path: &str, body: &'static str) -> RequestMessage {
    RequestMessage {
        head: RequestHead::new(method, path),
        body: Bytes::from_static(body.as_bytes()),
    }
}

#[test]
fn test_anonymous_credential_is_noop() -> Result<()> {
    let signer = init_signer(
        Config::new("service", "region"),
        StaticCredentialProvider::anonymous(),
    );

    let mut req = message(Method::GET, "/", "");
    let before = req.clone();
    signer.sign(&mut req, true, None)?;
    assert_eq!(req, before);

    // Credentials are checked before the request.
    let mut req = RequestHead::default();
    signer.sign_empty_payload(&mut req, None)?;
    assert_eq!(req, RequestHead::default());
    Ok(())
}

#[test]
fn test_incomplete_credential_is_noop() -> Result<()> {
    let signer = init_signer(
        Config::new("service", "region"),
        StaticCredentialProvider::new("akid", ""),
    );

    let mut req = host_request("/");
    let before = req.clone();
    signer.sign_unsigned_payload(&mut req, None)?;
    assert_eq!(req, before);
    Ok(())
}

#[test]
fn test_missing_method() {
    let signer = header_signer();

    let mut req = RequestHead {
        path: Some("/".to_string()),
        ..Default::default()
    };
    let before = req.clone();
    let err = signer
        .sign_empty_payload(&mut req, None)
        .expect_err("request without method must fail");

    assert_eq!(err.kind(), ErrorKind::RequestInvalid);
    assert!(err.message().contains(":method"), "{err}");
    assert_eq!(req, before);
}

#[test]
fn test_missing_path() {
    let signer = header_signer();

    let mut req = RequestMessage {
        head: RequestHead {
            method: Some(Method::GET),
            ..Default::default()
        },
        body: Bytes::from_static(b"test1234"),
    };
    let before = req.clone();
    let err = signer
        .sign(&mut req, true, None)
        .expect_err("request without path must fail");

    assert_eq!(err.kind(), ErrorKind::RequestInvalid);
    assert!(err.message().contains(":path"), "{err}");
    assert_eq!(req, before);
}

#[test]
fn test_sign_date_header() -> Result<()> {
    let signer = header_signer();

    let mut req = RequestHead::new(Method::GET, "/");
    signer.sign_empty_payload(&mut req, None)?;

    assert_eq!(req.headers["x-amz-date"], "20180102T030400Z");
    assert_eq!(req.headers["x-amz-region-set"], "region");
    assert!(authorization(&req)?.starts_with(
        "AWS4-ECDSA-P256-SHA256 Credential=akid/20180102/service/aws4_request, \
         SignedHeaders=x-amz-content-sha256;x-amz-date;x-amz-region-set, \
         Signature="
    ));
    Ok(())
}

#[test]
fn test_sign_security_token_header() -> Result<()> {
    let signer = init_signer(
        Config::new("service", "region"),
        StaticCredentialProvider::new("akid", "secret").with_session_token("token"),
    );

    let mut req = RequestHead::new(Method::GET, "/");
    signer.sign_empty_payload(&mut req, None)?;

    assert_eq!(req.headers["x-amz-security-token"], "token");
    assert!(authorization(&req)?.starts_with(
        "AWS4-ECDSA-P256-SHA256 Credential=akid/20180102/service/aws4_request, \
         SignedHeaders=x-amz-content-sha256;x-amz-date;x-amz-region-set;x-amz-security-token, \
         Signature="
    ));
    Ok(())
}

#[test]
fn test_sign_empty_content_header() -> Result<()> {
    let signer = header_signer();

    let mut req = message(Method::GET, "/", "");
    signer.sign(&mut req, true, None)?;

    assert_eq!(req.head.headers["x-amz-content-sha256"], EMPTY_STRING_SHA256);
    Ok(())
}

#[test]
fn test_sign_content_header() -> Result<()> {
    let signer = header_signer();

    let mut req = message(Method::POST, "/", "test1234");
    signer.sign(&mut req, true, None)?;

    assert_eq!(
        req.head.headers["x-amz-content-sha256"],
        "937e8d5fbb48bd4949536cd65b8d35c426b80d2f830c5c308e2cdec422ae2244"
    );
    assert_eq!(req.body, Bytes::from_static(b"test1234"));
    Ok(())
}

#[test]
fn test_body_not_signed() -> Result<()> {
    let signer = header_signer();

    let mut req = message(Method::POST, "/", "test1234");
    signer.sign(&mut req, false, None)?;

    assert_eq!(req.head.headers["x-amz-content-sha256"], EMPTY_STRING_SHA256);
    Ok(())
}

#[test]
fn test_sign_content_header_override_region() -> Result<()> {
    let signer = header_signer();

    let mut req = message(Method::POST, "/", "test1234");
    signer.sign(&mut req, true, Some("region1"))?;

    assert_eq!(
        req.head.headers["x-amz-content-sha256"],
        "937e8d5fbb48bd4949536cd65b8d35c426b80d2f830c5c308e2cdec422ae2244"
    );
    assert_eq!(req.head.headers["x-amz-region-set"], "region1");
    assert_eq!(signer.config().region_set, "region");
    Ok(())
}

#[test]
fn test_sign_extra_headers() -> Result<()> {
    let signer = header_signer();

    let mut req = RequestHead::new(Method::GET, "/");
    req.headers.insert("c", HeaderValue::from_static("c_value"));
    req.headers.insert("a", HeaderValue::from_static("a_value"));
    req.headers.insert("b", HeaderValue::from_static("b_value"));
    signer.sign_empty_payload(&mut req, None)?;

    assert!(authorization(&req)?.starts_with(
        "AWS4-ECDSA-P256-SHA256 Credential=akid/20180102/service/aws4_request, \
         SignedHeaders=a;b;c;x-amz-content-sha256;x-amz-date;x-amz-region-set, \
         Signature="
    ));
    Ok(())
}

#[test]
fn test_sign_host_header() -> Result<()> {
    let signer = header_signer();

    let mut req = host_request("/");
    signer.sign_empty_payload(&mut req, None)?;

    assert!(authorization(&req)?.starts_with(
        "AWS4-ECDSA-P256-SHA256 Credential=akid/20180102/service/aws4_request, \
         SignedHeaders=host;x-amz-content-sha256;x-amz-date;x-amz-region-set, \
         Signature="
    ));
    Ok(())
}

#[test]
fn test_proxy_headers_are_not_signed() -> Result<()> {
    let signer = header_signer();

    let mut req = host_request("/");
    req.headers
        .insert("x-forwarded-for", HeaderValue::from_static("10.0.0.1"));
    req.headers
        .insert("x-forwarded-proto", HeaderValue::from_static("https"));
    req.headers
        .insert("x-amzn-trace-id", HeaderValue::from_static("Root=1-abc"));
    signer.sign_empty_payload(&mut req, None)?;

    assert!(authorization(&req)?
        .contains("SignedHeaders=host;x-amz-content-sha256;x-amz-date;x-amz-region-set,"));
    assert_eq!(req.headers["x-forwarded-for"], "10.0.0.1");
    Ok(())
}

#[test]
fn test_header_exclusions() -> Result<()> {
    let signer = init_signer(
        Config::new("service", "region")
            .with_header_exclusion(HeaderMatcher::Exact("User-Agent".to_string()))
            .with_header_exclusion(HeaderMatcher::Prefix("x-envoy-".to_string()))
            .with_header_exclusion(HeaderMatcher::Prefix("x-amz-".to_string())),
        StaticCredentialProvider::new("akid", "secret"),
    );

    let mut req = host_request("/");
    req.headers
        .insert("user-agent", HeaderValue::from_static("curl/8.0"));
    req.headers
        .insert("x-envoy-original-path", HeaderValue::from_static("/a"));
    req.headers.insert("a", HeaderValue::from_static("a_value"));
    signer.sign_empty_payload(&mut req, None)?;

    assert!(authorization(&req)?
        .contains("SignedHeaders=a;host;x-amz-content-sha256;x-amz-date;x-amz-region-set,"));
    Ok(())
}

#[test]
fn test_existing_authorization_is_replaced() -> Result<()> {
    let signer = header_signer();

    let mut req = host_request("/");
    req.headers
        .insert(AUTHORIZATION, HeaderValue::from_static("testValue"));
    signer.sign_empty_payload(&mut req, None)?;

    assert_eq!(req.headers.get_all(AUTHORIZATION).iter().count(), 1);
    assert!(authorization(&req)?.starts_with("AWS4-ECDSA-P256-SHA256 Credential="));
    Ok(())
}

#[test]
fn test_timestamps_in_same_minute() -> Result<()> {
    let sign_at = |timestamp: i64| -> Result<RequestHead> {
        let signer = Signer::new(
            Config::new("service", "region"),
            StaticCredentialProvider::new("akid", "secret"),
        )?
        .with_clock(FixedClock::new(test_time(timestamp)));
        let mut req = host_request("/");
        signer.sign_empty_payload(&mut req, None)?;
        Ok(req)
    };

    // 03:04:00, 03:04:05 and 03:04:59 share one minute.
    let a = sign_at(1514862240)?;
    let b = sign_at(TEST_TIMESTAMP)?;
    let c = sign_at(1514862299)?;
    assert_eq!(a.headers["x-amz-date"], "20180102T030400Z");
    assert_eq!(a.headers, b.headers);
    assert_eq!(b.headers, c.headers);

    let d = sign_at(1514862300)?;
    assert_eq!(d.headers["x-amz-date"], "20180102T030500Z");
    assert_ne!(authorization(&c)?, authorization(&d)?);
    Ok(())
}

#[test]
fn test_region_set_changes_signature_not_scope() -> Result<()> {
    let signer = header_signer();

    let mut a = host_request("/");
    signer.sign_empty_payload(&mut a, Some("us-east-1"))?;
    let mut b = host_request("/");
    signer.sign_empty_payload(&mut b, Some("us-east-1,us-west-*"))?;

    let (scope_a, signature_a) = authorization(&a)?
        .split_once(", Signature=")
        .expect("authorization must carry a signature");
    let (scope_b, signature_b) = authorization(&b)?
        .split_once(", Signature=")
        .expect("authorization must carry a signature");
    assert_eq!(scope_a, scope_b);
    assert_ne!(signature_a, signature_b);
    Ok(())
}

#[test]
fn test_http_request() -> Result<()> {
    let signer = header_signer();

    let mut req = http::Request::post("https://www.example.com/bucket/key?list-type=2")
        .body("test1234")?;
    signer.sign(&mut req, true, None)?;

    assert_eq!(req.uri().to_string(), "https://www.example.com/bucket/key?list-type=2");
    assert_eq!(req.headers()["host"], "www.example.com");
    assert_eq!(
        req.headers()["x-amz-content-sha256"],
        "937e8d5fbb48bd4949536cd65b8d35c426b80d2f830c5c308e2cdec422ae2244"
    );
    Ok(())
}
