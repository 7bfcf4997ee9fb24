//! 签名密钥模块
//!
//! 负责加载和校验 HMAC 签名所用的共享密钥。
//!
//! ## 密钥格式
//!
//! 配置值可以是两种形式之一：
//!
//! - 以 `base64:` 为前缀的 Base64 编码值（由 [`generate_secret`] 产生）
//! - 原始字符串，其字节序列直接作为密钥使用
//!
//! 解码后的密钥长度不得小于 16 字节（128 位）。校验在构造时完成，
//! 配置错误的部署会立即失败，而不是等到第一个请求才暴露问题。
//!
//! ## 示例
//!
//! ```rust
//! use guardrs::secret::{Secret, generate_secret};
//!
//! // 生成一个新密钥（32 字节随机数据，base64: 前缀）
//! let raw = generate_secret().unwrap();
//! assert!(raw.starts_with("base64:"));
//!
//! // 加载密钥
//! let secret = Secret::load(&raw).unwrap();
//! assert_eq!(secret.len(), 32);
//!
//! // 过短的密钥在加载时即失败
//! assert!(Secret::load("short").is_err());
//! ```

use base64::{Engine, engine::general_purpose::STANDARD};
use std::fmt;

use crate::error::{ConfigError, Error, Result};
use crate::random::generate_random_bytes;

/// 密钥的最小字节长度（128 位）
pub const MIN_SECRET_BYTES: usize = 16;

/// 生成密钥时使用的字节长度
const GENERATED_SECRET_BYTES: usize = 32;

/// 编码密钥的前缀标记
const BASE64_PREFIX: &str = "base64:";

/// HMAC 签名密钥
///
/// 加载后不可变，可在多个请求间安全共享（只读）。
#[derive(Clone, PartialEq, Eq)]
pub struct Secret {
    bytes: Vec<u8>,
}

impl Secret {
    /// 从配置值加载密钥
    ///
    /// 如果值以 `base64:` 开头，去掉前缀并做 Base64 解码；
    /// 否则将整个值的字节序列作为密钥。
    ///
    /// # Errors
    ///
    /// 当解码失败或解码后长度不足 16 字节时返回
    /// `ConfigError::InvalidSecret`。
    pub fn load(raw: &str) -> Result<Self> {
        let bytes = match raw.strip_prefix(BASE64_PREFIX) {
            Some(encoded) => STANDARD.decode(encoded).map_err(|e| {
                Error::Config(ConfigError::InvalidSecret(format!(
                    "base64 decoding failed: {}",
                    e
                )))
            })?,
            None => raw.as_bytes().to_vec(),
        };

        Self::from_bytes(bytes)
    }

    /// 从原始字节构造密钥
    ///
    /// # Errors
    ///
    /// 当长度不足 16 字节时返回 `ConfigError::InvalidSecret`。
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        if bytes.len() < MIN_SECRET_BYTES {
            return Err(Error::Config(ConfigError::InvalidSecret(format!(
                "secret must be at least {} bytes, got {}; \
                 use guardrs::secret::generate_secret to create a valid key",
                MIN_SECRET_BYTES,
                bytes.len()
            ))));
        }

        Ok(Self { bytes })
    }

    /// 获取密钥字节
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// 密钥字节长度
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// 密钥是否为空（构造约束下恒为 false，为满足 clippy 提供）
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

// 密钥内容不应出现在日志或调试输出中
impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secret")
            .field("bytes", &format!("<{} bytes redacted>", self.bytes.len()))
            .finish()
    }
}

/// 生成一个新的签名密钥配置值
///
/// 产生 32 字节的密码学安全随机数据，Base64 编码并加上 `base64:`
/// 前缀，可直接写入配置文件或环境变量。
///
/// # Example
///
/// ```rust
/// use guardrs::secret::{Secret, generate_secret};
///
/// let raw = generate_secret().unwrap();
/// let secret = Secret::load(&raw).unwrap();
/// assert_eq!(secret.len(), 32);
/// ```
pub fn generate_secret() -> Result<String> {
    let bytes = generate_random_bytes(GENERATED_SECRET_BYTES)?;
    Ok(format!("{}{}", BASE64_PREFIX, STANDARD.encode(&bytes)))
}
