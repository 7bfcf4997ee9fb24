//! 配置模块
//!
//! 定义 Token 签发与 Guard 行为的配置项。
//!
//! ## 配置项
//!
//! | 配置 | 默认值 | 说明 |
//! |---|---|---|
//! | `secret` | （必填） | 签名密钥，支持 `base64:` 前缀编码 |
//! | `ttl_minutes` | 60 | Token 有效期（分钟） |
//! | `refresh_limit_minutes` | 7200 | 过期后的续签宽限期（分钟） |
//! | `issuer` | `"guardrs"` | `iss` claim 的值（服务标识） |
//! | `verify_refresh_signature` | `true` | 续签前是否校验 Token 签名 |
//!
//! ## 示例
//!
//! ```rust
//! use guardrs::config::GuardConfig;
//!
//! let config = GuardConfig::new("base64:MDEyMzQ1Njc4OWFiY2RlZg==")
//!     .with_ttl_minutes(30)
//!     .with_refresh_limit_minutes(1440)
//!     .with_issuer("api.example.com");
//!
//! assert_eq!(config.ttl_minutes, 30);
//! ```

/// Token 签发与 Guard 行为的配置
#[derive(Debug, Clone)]
pub struct GuardConfig {
    /// 签名密钥的配置值（原始或 `base64:` 前缀编码）
    pub secret: String,

    /// Token 有效期（分钟）
    pub ttl_minutes: i64,

    /// 过期后的续签宽限期（分钟）
    ///
    /// 续签上限 `rli` = 签发时间 + (ttl + refresh_limit) 分钟。
    pub refresh_limit_minutes: i64,

    /// Token 签发者（`iss` claim）
    pub issuer: String,

    /// 续签前是否校验 Token 签名
    ///
    /// 默认开启。关闭后恢复为"从未校验签名的 Token 解析出 subject
    /// 并直接续签"的历史行为，仅用于兼容，不建议在生产中关闭。
    pub verify_refresh_signature: bool,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            ttl_minutes: 60,
            refresh_limit_minutes: 7200,
            issuer: "guardrs".to_string(),
            verify_refresh_signature: true,
        }
    }
}

impl GuardConfig {
    /// 使用给定密钥创建配置，其余项取默认值
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// 设置 Token 有效期（分钟）
    pub fn with_ttl_minutes(mut self, minutes: i64) -> Self {
        self.ttl_minutes = minutes;
        self
    }

    /// 设置续签宽限期（分钟）
    pub fn with_refresh_limit_minutes(mut self, minutes: i64) -> Self {
        self.refresh_limit_minutes = minutes;
        self
    }

    /// 设置签发者
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    /// 设置续签前是否校验签名
    pub fn with_refresh_signature_verification(mut self, enabled: bool) -> Self {
        self.verify_refresh_signature = enabled;
        self
    }
}
