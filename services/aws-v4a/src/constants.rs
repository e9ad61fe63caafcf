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

use percent_encoding::AsciiSet;
use percent_encoding::NON_ALPHANUMERIC;

/// Signing algorithm name, also the label of the key derivation.
pub const SIGV4A_ALGORITHM: &str = "AWS4-ECDSA-P256-SHA256";
/// Terminator of the credential scope.
pub const AWS4_REQUEST: &str = "aws4_request";

// Headers used in sigv4a.
pub const X_AMZ_CONTENT_SHA_256: &str = "x-amz-content-sha256";
pub const X_AMZ_DATE: &str = "x-amz-date";
pub const X_AMZ_SECURITY_TOKEN: &str = "x-amz-security-token";
pub const X_AMZ_REGION_SET: &str = "x-amz-region-set";

// Headers that proxies rewrite in flight, never signed.
pub const X_FORWARDED_FOR: &str = "x-forwarded-for";
pub const X_FORWARDED_PROTO: &str = "x-forwarded-proto";
pub const X_AMZN_TRACE_ID: &str = "x-amzn-trace-id";

// Query parameters used by presigned requests.
pub const X_AMZ_ALGORITHM_PARAM: &str = "X-Amz-Algorithm";
pub const X_AMZ_CREDENTIAL_PARAM: &str = "X-Amz-Credential";
pub const X_AMZ_DATE_PARAM: &str = "X-Amz-Date";
pub const X_AMZ_EXPIRES_PARAM: &str = "X-Amz-Expires";
pub const X_AMZ_REGION_SET_PARAM: &str = "X-Amz-Region-Set";
pub const X_AMZ_SIGNED_HEADERS_PARAM: &str = "X-Amz-SignedHeaders";
pub const X_AMZ_SECURITY_TOKEN_PARAM: &str = "X-Amz-Security-Token";
pub const X_AMZ_SIGNATURE_PARAM: &str = "X-Amz-Signature";

/// Payload hash used when the payload is not signed.
pub const UNSIGNED_PAYLOAD: &str = "UNSIGNED-PAYLOAD";
/// Hex encoded SHA256 of the empty string.
pub const EMPTY_STRING_SHA256: &str =
    "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

/// Expiration of presigned requests when none is configured, in seconds.
pub const DEFAULT_QUERY_EXPIRATION: u16 = 5;

// Env values used by config and providers.
pub const AWS_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
pub const AWS_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
pub const AWS_SESSION_TOKEN: &str = "AWS_SESSION_TOKEN";
pub const AWS_SIGV4A_SIGNING_REGION_SET: &str = "AWS_SIGV4A_SIGNING_REGION_SET";
pub const AWS_REGION: &str = "AWS_REGION";
pub const AWS_DEFAULT_REGION: &str = "AWS_DEFAULT_REGION";

/// AsciiSet for [AWS UriEncode](https://docs.aws.amazon.com/AmazonS3/latest/API/sig-v4-header-based-auth.html)
///
/// But used in query: every byte except `A-Z`, `a-z`, `0-9`, `-`, `.`, `_` and `~` is encoded.
pub static AWS_QUERY_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');
