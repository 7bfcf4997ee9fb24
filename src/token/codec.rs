//! Token 编解码模块
//!
//! 负责 Token 的构建、签名、序列化、解析与签名校验。
//!
//! ## 线格式
//!
//! 标准的三段式 JWT 字符串：
//!
//! ```text
//! base64url(header) . base64url(payload) . base64url(hmac_sha256)
//! ```
//!
//! 头部固定为 `{"typ":"JWT","alg":"HS256"}`，并把 `jti` 复制进头部。
//! 持有相同密钥的任何标准 JWT 实现都能校验本库签发的 Token。
//!
//! ## 设计
//!
//! 结构解析（[`TokenCodec::parse_token`]）、签名校验
//! （[`TokenCodec::valid_token`]）与过期判定（[`TokenCodec::expired`]）
//! 是三个独立步骤，调用方按固定顺序逐层应用，使"结构损坏"、
//! "签名伪造"与"已过期"成为可区分的结果。
//!
//! ## 示例
//!
//! ```rust
//! use std::collections::HashMap;
//! use chrono::Utc;
//! use guardrs::config::GuardConfig;
//! use guardrs::guard::Principal;
//! use guardrs::token::codec::TokenCodec;
//!
//! struct User;
//!
//! impl Principal for User {
//!     fn auth_id(&self) -> String {
//!         "42".to_string()
//!     }
//! }
//!
//! let config = GuardConfig::new("base64:MDEyMzQ1Njc4OWFiY2RlZg==");
//! let codec = TokenCodec::from_config(&config).unwrap();
//!
//! let token_string = codec.issue(&User, &HashMap::new()).unwrap();
//! let token = codec.parse_token(&token_string).unwrap();
//!
//! assert!(codec.valid_token(&token));
//! assert!(!codec.expired(&token, Utc::now()));
//! ```

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::collections::HashMap;

use super::claims::Claims;
use super::policy;
use crate::config::GuardConfig;
use crate::error::{Error, Result, TokenError};
use crate::guard::Principal;
use crate::random::{constant_time_compare, generate_token_id};
use crate::secret::Secret;

type HmacSha256 = Hmac<Sha256>;

/// 签名算法标识（本库只支持对称 HMAC-SHA-256）
const ALGORITHM: &str = "HS256";

/// Token 头部
///
/// `jti` 从载荷复制一份到头部，便于在不解码载荷的情况下
/// 识别 Token（如吊销记录的快速查找）。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Header {
    /// Token 类型，固定为 `"JWT"`
    pub typ: String,

    /// 签名算法标识
    pub alg: String,

    /// Token ID（与载荷中的 `jti` 一致）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

impl Header {
    fn new(jti: impl Into<String>) -> Self {
        Self {
            typ: "JWT".to_string(),
            alg: ALGORITHM.to_string(),
            jti: Some(jti.into()),
        }
    }
}

/// 解析后的 Token
///
/// 保留原始签名输入（前两段的原文），签名校验总是针对
/// 签发时的字节序列进行，而不是重新序列化的结果。
#[derive(Debug, Clone)]
pub struct ParsedToken {
    header: Header,
    claims: Claims,
    signing_input: String,
    signature: Vec<u8>,
}

impl ParsedToken {
    /// Token 头部
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Token 载荷（Claim Set）
    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    /// Token ID（来自载荷）
    pub fn jti(&self) -> Option<&str> {
        self.claims.jti.as_deref()
    }

    /// 主题（用户标识符）
    pub fn subject(&self) -> Option<&str> {
        self.claims.sub.as_deref()
    }
}

/// Token 编解码器
///
/// 持有签名密钥与签发参数，自身无请求状态，可跨请求共享。
#[derive(Debug, Clone)]
pub struct TokenCodec {
    secret: Secret,
    issuer: String,
    ttl_minutes: i64,
    refresh_limit_minutes: i64,
}

impl TokenCodec {
    /// 从配置构造编解码器
    ///
    /// 密钥在此处加载并校验。配置错误（密钥缺失或过短）立即失败，
    /// 不会延迟到第一次签发或校验。
    pub fn from_config(config: &GuardConfig) -> Result<Self> {
        let secret = Secret::load(&config.secret)?;

        Ok(Self {
            secret,
            issuer: config.issuer.clone(),
            ttl_minutes: config.ttl_minutes,
            refresh_limit_minutes: config.refresh_limit_minutes,
        })
    }

    /// 使用已加载的密钥构造编解码器
    pub fn new(
        secret: Secret,
        issuer: impl Into<String>,
        ttl_minutes: i64,
        refresh_limit_minutes: i64,
    ) -> Self {
        Self {
            secret,
            issuer: issuer.into(),
            ttl_minutes,
            refresh_limit_minutes,
        }
    }

    /// 为用户签发一个新 Token
    ///
    /// 以当前 UTC 时间为基准构建保留 claim：
    ///
    /// - `iat == nbf == now`
    /// - `exp == iat + ttl_minutes * 60`
    /// - `rli == iat + (ttl_minutes + refresh_limit_minutes) * 60`
    /// - `jti` 为 16 字符随机 ID，并复制进头部
    ///
    /// 自定义 claim 的合并顺序：先调用方提供的 `custom_claims`，
    /// 再用户对象贡献的默认 claim（同名时用户对象优先）。
    /// 用户对象收集 claim 时的失败会被忽略，不阻塞签发。
    ///
    /// # Errors
    ///
    /// 序列化或签名失败时返回 `TokenError::EncodingFailed`。
    pub fn issue(
        &self,
        user: &dyn Principal,
        custom_claims: &HashMap<String, serde_json::Value>,
    ) -> Result<String> {
        let now = Utc::now().timestamp();
        let jti = generate_token_id();

        let mut claims = Claims {
            iss: Some(self.issuer.clone()),
            sub: Some(user.auth_id()),
            jti: Some(jti.clone()),
            iat: Some(now),
            nbf: Some(now),
            exp: Some(now + self.ttl_minutes * 60),
            rli: Some(now + (self.ttl_minutes + self.refresh_limit_minutes) * 60),
            custom: HashMap::new(),
        };

        claims.merge_custom(custom_claims);

        // 用户对象贡献的默认 claim；收集失败不阻塞签发
        if let Ok(user_claims) = user.custom_claims() {
            claims.merge_custom(&user_claims);
        }

        let header = Header::new(jti);
        self.serialize(&header, &claims)
    }

    /// 解析 Token 字符串
    ///
    /// 只做结构解码：分段、Base64URL 解码、JSON 反序列化。
    /// **不校验签名**，签名校验由 [`valid_token`](Self::valid_token)
    /// 单独完成。
    ///
    /// # Errors
    ///
    /// 结构损坏（段数错误、编码无效、载荷非法）时返回
    /// `TokenError::Malformed`。该错误是可恢复的，调用方应捕获
    /// 并按"无 Token"处理。
    pub fn parse_token(&self, token_string: &str) -> Result<ParsedToken> {
        let segments: Vec<&str> = token_string.split('.').collect();
        if segments.len() != 3 {
            return Err(Error::Token(TokenError::Malformed(format!(
                "expected 3 segments, got {}",
                segments.len()
            ))));
        }

        let header_bytes = decode_segment(segments[0], "header")?;
        let payload_bytes = decode_segment(segments[1], "payload")?;
        let signature = decode_segment(segments[2], "signature")?;

        let header: Header = serde_json::from_slice(&header_bytes).map_err(|e| {
            Error::Token(TokenError::Malformed(format!("invalid header: {}", e)))
        })?;
        let claims: Claims = serde_json::from_slice(&payload_bytes).map_err(|e| {
            Error::Token(TokenError::Malformed(format!("invalid payload: {}", e)))
        })?;

        Ok(ParsedToken {
            header,
            claims,
            signing_input: format!("{}.{}", segments[0], segments[1]),
            signature,
        })
    }

    /// 校验 Token 签名是否有效
    ///
    /// 针对原始签名输入重新计算 HMAC-SHA-256，并与嵌入的签名做
    /// 常量时间比较，避免短路比较泄露时序信息。该检查独立于
    /// 过期判定，且应在过期判定之前执行。
    pub fn valid_token(&self, token: &ParsedToken) -> bool {
        // 只接受 HS256，防止算法替换
        if token.header.alg != ALGORITHM {
            return false;
        }

        let expected = match self.sign(&token.signing_input) {
            Ok(mac) => mac,
            Err(_) => return false,
        };

        constant_time_compare(&expected, &token.signature)
    }

    /// 校验 Token 签名是否无效
    pub fn invalid_token(&self, token: &ParsedToken) -> bool {
        !self.valid_token(token)
    }

    /// Token 是否已过期
    pub fn expired(&self, token: &ParsedToken, now: DateTime<Utc>) -> bool {
        policy::is_expired(&token.claims, now)
    }

    /// Token 是否可以续签
    pub fn can_be_renewed(&self, token: &ParsedToken, now: DateTime<Utc>) -> bool {
        policy::can_be_renewed(&token.claims, now)
    }

    /// 序列化并签名
    fn serialize(&self, header: &Header, claims: &Claims) -> Result<String> {
        let header_json = serde_json::to_vec(header).map_err(|e| {
            Error::Token(TokenError::EncodingFailed(format!("header: {}", e)))
        })?;
        let payload_json = serde_json::to_vec(claims).map_err(|e| {
            Error::Token(TokenError::EncodingFailed(format!("payload: {}", e)))
        })?;

        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(&header_json),
            URL_SAFE_NO_PAD.encode(&payload_json)
        );

        let signature = self.sign(&signing_input)?;

        Ok(format!(
            "{}.{}",
            signing_input,
            URL_SAFE_NO_PAD.encode(&signature)
        ))
    }

    /// 对签名输入计算 HMAC-SHA-256
    fn sign(&self, signing_input: &str) -> Result<Vec<u8>> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|e| Error::Token(TokenError::EncodingFailed(format!("hmac: {}", e))))?;
        mac.update(signing_input.as_bytes());
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

/// Base64URL 解码单个分段
fn decode_segment(segment: &str, name: &str) -> Result<Vec<u8>> {
    URL_SAFE_NO_PAD.decode(segment).map_err(|e| {
        Error::Token(TokenError::Malformed(format!(
            "invalid {} encoding: {}",
            name, e
        )))
    })
}
