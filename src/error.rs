//! 统一错误类型模块
//!
//! 提供 guardrs 库中所有操作的错误类型定义。
//!
//! 错误分为两类：
//!
//! - **致命错误**: 配置错误（如无效密钥）会在构造阶段直接失败，
//!   避免带着错误配置进入请求处理流程。
//! - **可恢复错误**: Token 解析失败、签名无效、已过期、用户查找失败等，
//!   在 Guard 层面统一坍缩为 `None`/`false`，不向认证调用方泄露失败原因。

use std::fmt;

/// guardrs 库的统一结果类型
pub type Result<T> = std::result::Result<T, Error>;

/// guardrs 库的错误类型
#[derive(Debug)]
pub enum Error {
    /// 配置错误（致命，启动阶段即失败）
    Config(ConfigError),

    /// Token 相关错误
    Token(TokenError),

    /// 用户目录查找错误
    Directory(DirectoryError),

    /// 内部错误
    Internal(String),

    /// 其他错误
    Other(String),
}

impl Error {
    /// 创建一个内部错误
    pub fn internal(msg: impl Into<String>) -> Self {
        Error::Internal(msg.into())
    }
}

/// 配置相关错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// 缺少必需的配置
    MissingRequired(String),
    /// 密钥无效（缺失或长度不足）
    InvalidSecret(String),
    /// 无效的配置值
    InvalidValue { key: String, message: String },
}

/// Token 相关错误
///
/// 各失败模式彼此可区分：结构损坏（`Malformed`）、签名伪造
/// （`InvalidSignature`）与单纯过期（`Expired`）对日志和续签路径
/// 是不同的结果，即使对认证调用方它们都表现为"无 Token"。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Token 结构无法解析（段数错误、编码无效、载荷非法）
    Malformed(String),
    /// Token 签名无效
    InvalidSignature,
    /// Token 已过期
    Expired,
    /// Token 已超出续签期限
    NotRenewable,
    /// Token 编码/签发失败
    EncodingFailed(String),
    /// 缺少必需的 claim
    MissingClaim(String),
}

/// 用户目录相关错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    /// 根据标识符找不到用户
    UserNotFound(String),
    /// 目录查找失败
    LookupFailed(String),
}

// ============================================================================
// Display 实现
// ============================================================================

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Config error: {}", e),
            Error::Token(e) => write!(f, "Token error: {}", e),
            Error::Directory(e) => write!(f, "Directory error: {}", e),
            Error::Internal(msg) => write!(f, "Internal error: {}", msg),
            Error::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingRequired(key) => {
                write!(f, "missing required configuration: {}", key)
            }
            ConfigError::InvalidSecret(msg) => write!(f, "invalid secret: {}", msg),
            ConfigError::InvalidValue { key, message } => {
                write!(f, "invalid configuration value for '{}': {}", key, message)
            }
        }
    }
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenError::Malformed(msg) => write!(f, "malformed token: {}", msg),
            TokenError::InvalidSignature => write!(f, "invalid token signature"),
            TokenError::Expired => write!(f, "token has expired"),
            TokenError::NotRenewable => write!(f, "token is past its renewal limit"),
            TokenError::EncodingFailed(msg) => write!(f, "token encoding failed: {}", msg),
            TokenError::MissingClaim(claim) => write!(f, "missing required claim: {}", claim),
        }
    }
}

impl fmt::Display for DirectoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DirectoryError::UserNotFound(id) => write!(f, "user not found: {}", id),
            DirectoryError::LookupFailed(msg) => write!(f, "directory lookup failed: {}", msg),
        }
    }
}

// ============================================================================
// std::error::Error 实现
// ============================================================================

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

impl std::error::Error for ConfigError {}
impl std::error::Error for TokenError {}
impl std::error::Error for DirectoryError {}

// ============================================================================
// From 实现 - 方便错误转换
// ============================================================================

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Config(err)
    }
}

impl From<TokenError> for Error {
    fn from(err: TokenError) -> Self {
        Error::Token(err)
    }
}

impl From<DirectoryError> for Error {
    fn from(err: DirectoryError) -> Self {
        Error::Directory(err)
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}
