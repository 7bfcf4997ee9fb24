//! # GuardRS
//!
//! 一个基于 JWT 的无状态 Bearer Token 认证守卫库。
//!
//! ## 功能特性
//!
//! - **Token 签发**: 为用户签发带过期时间与续签上限的 HS256 JWT
//! - **请求认证**: 从 `Authorization` 头或查询参数解析 Token 并认证请求
//! - **签名校验**: HMAC-SHA-256 常量时间比较，防止时序攻击
//! - **Token 续签**: 过期后的宽限期内可换发新 Token
//! - **密钥管理**: `base64:` 前缀密钥加载与新密钥生成
//! - **Token 吊销**: 可插拔的按 `jti` 吊销存储
//! - **认证事件**: 登录、登出、签发、续签的事件分发
//!
//! ## 设计要点
//!
//! Token 是无状态的：签名有效且未过期即被接受，服务端不保存
//! Token 本身。结构解析、签名校验与过期判定是三个独立步骤，
//! 认证失败对调用方统一坍缩为"未认证"，具体原因只通过事件分发器
//! 暴露给运维侧。所有时间判定基于显式传入的 UTC 时间，不读取
//! 环境时钟。
//!
//! ## 签发与认证示例
//!
//! ```rust
//! use std::collections::HashMap;
//! use guardrs::config::GuardConfig;
//! use guardrs::error::Result;
//! use guardrs::guard::{AuthRequest, Credentials, Guard, Principal, UserDirectory};
//!
//! #[derive(Clone)]
//! struct User {
//!     id: String,
//!     password: String,
//! }
//!
//! impl Principal for User {
//!     fn auth_id(&self) -> String {
//!         self.id.clone()
//!     }
//! }
//!
//! struct Directory {
//!     users: Vec<User>,
//! }
//!
//! impl UserDirectory for Directory {
//!     type User = User;
//!
//!     fn retrieve_by_id(&self, id: &str) -> Result<Option<User>> {
//!         Ok(self.users.iter().find(|u| u.id == id).cloned())
//!     }
//!
//!     fn retrieve_by_credentials(&self, credentials: &Credentials) -> Result<Option<User>> {
//!         match credentials.get("id") {
//!             Some(id) => self.retrieve_by_id(id),
//!             None => Ok(None),
//!         }
//!     }
//!
//!     fn validate_credentials(&self, user: &User, credentials: &Credentials) -> Result<bool> {
//!         Ok(credentials.get("password") == Some(&user.password))
//!     }
//! }
//!
//! let directory = Directory {
//!     users: vec![User {
//!         id: "42".to_string(),
//!         password: "hunter2".to_string(),
//!     }],
//! };
//!
//! let config = GuardConfig::new("base64:MDEyMzQ1Njc4OWFiY2RlZg==");
//! let mut guard = Guard::new(&config, directory).unwrap();
//!
//! // 登录并签发 Token
//! let mut credentials = Credentials::new();
//! credentials.insert("id".to_string(), "42".to_string());
//! credentials.insert("password".to_string(), "hunter2".to_string());
//!
//! assert!(guard.attempt(&credentials));
//! let token = guard.issue(&HashMap::new()).unwrap();
//!
//! // 后续请求用 Token 认证
//! guard.set_request(AuthRequest::new().with_bearer_token(&token));
//! ```
//!
//! ## 密钥生成示例
//!
//! ```rust
//! use guardrs::secret::{Secret, generate_secret};
//!
//! // 生成可直接写入配置的密钥值
//! let raw = generate_secret().unwrap();
//! assert!(raw.starts_with("base64:"));
//!
//! let secret = Secret::load(&raw).unwrap();
//! assert_eq!(secret.len(), 32);
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod guard;
pub mod random;
pub mod revocation;
pub mod secret;
pub mod token;

pub use error::{Error, Result};

// ============================================================================
// 配置与密钥导出
// ============================================================================

pub use config::GuardConfig;
pub use secret::{Secret, generate_secret};

// ============================================================================
// Token 相关导出
// ============================================================================

pub use token::{Claims, Header, ParsedToken, TokenCodec};

// ============================================================================
// Guard 相关导出
// ============================================================================

pub use guard::{AuthRequest, Credentials, Guard, Principal, UserDirectory};

// ============================================================================
// 事件与吊销导出
// ============================================================================

pub use events::{AuthEvent, AuthEventType, EventDispatcher};
pub use revocation::{InMemoryRevocationStore, RevocationStore};
