//! 认证守卫模块
//!
//! 负责认证携带 Token 的请求（并拒绝无 Token 或 Token 无效的请求）。
//!
//! ## 核心抽象
//!
//! - [`Principal`] - 可认证的用户对象（提供标识符和默认自定义 claim）
//! - [`UserDirectory`] - 用户目录（按标识符或凭据查找用户、验证凭据）
//! - [`AuthRequest`] - 请求的认证视图（Authorization 头与查询参数）
//! - [`Guard`] - 每请求的认证决策器
//!
//! ## 解析阶梯
//!
//! [`Guard::user`] 按固定顺序逐层收窄：
//!
//! 1. 已登出 → `None`（终态，本请求内不可逆）
//! 2. 已解析过 → 缓存的用户
//! 3. 提取 Token 字符串（`Authorization` 头优先，其次 `token` 参数）
//! 4. 结构解析
//! 5. 签名校验（常量时间比较）
//! 6. 吊销检查（如配置了吊销存储）
//! 7. 过期检查
//! 8. 按 `sub` claim 查找用户
//!
//! 任何一层失败都坍缩为 `None`，不向调用方泄露失败原因
//! （具体原因通过事件分发器暴露给运维侧）。
//!
//! ## 使用示例
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
//! }
//!
//! impl Principal for User {
//!     fn auth_id(&self) -> String {
//!         self.id.clone()
//!     }
//! }
//!
//! struct Directory;
//!
//! impl UserDirectory for Directory {
//!     type User = User;
//!
//!     fn retrieve_by_id(&self, id: &str) -> Result<Option<User>> {
//!         Ok(Some(User { id: id.to_string() }))
//!     }
//!
//!     fn retrieve_by_credentials(&self, _credentials: &Credentials) -> Result<Option<User>> {
//!         Ok(None)
//!     }
//!
//!     fn validate_credentials(&self, _user: &User, _credentials: &Credentials) -> Result<bool> {
//!         Ok(false)
//!     }
//! }
//!
//! let config = GuardConfig::new("base64:MDEyMzQ1Njc4OWFiY2RlZg==");
//! let mut guard = Guard::new(&config, Directory).unwrap();
//!
//! // 没有 Token 的请求解析为匿名
//! guard.set_request(AuthRequest::new());
//! assert!(guard.user().is_none());
//! ```

use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::GuardConfig;
use crate::error::Result;
use crate::events::{AuthEvent, EventDispatcher, NoOpEventDispatcher};
use crate::revocation::RevocationStore;
use crate::token::codec::{ParsedToken, TokenCodec};

/// Bearer 认证方案的头部前缀
const BEARER_PREFIX: &str = "Bearer ";

/// 查询参数中携带 Token 的参数名
const TOKEN_PARAMETER: &str = "token";

// ============================================================================
// Principal / UserDirectory
// ============================================================================

/// 可认证的用户对象
///
/// 实现方提供稳定的字符串标识符（写入 `sub` claim），
/// 并可选地为签发的 Token 贡献默认自定义 claim。
pub trait Principal {
    /// 用户的稳定标识符
    fn auth_id(&self) -> String;

    /// 用户对象贡献的默认自定义 claim
    ///
    /// 在签发时合并进 Token（晚于调用方提供的 claim，同名时优先）。
    /// 返回错误不会阻塞签发，只是不合并。
    fn custom_claims(&self) -> Result<HashMap<String, serde_json::Value>> {
        Ok(HashMap::new())
    }
}

/// 登录凭据
///
/// 键值对形式（如 `email` + `password`），具体字段由
/// [`UserDirectory`] 实现方约定。
pub type Credentials = HashMap<String, String>;

/// 用户目录
///
/// Guard 通过该接口查找用户和验证凭据，不关心底层存储
/// （数据库、LDAP、内存表）。
pub trait UserDirectory {
    /// 目录中的用户类型
    type User: Principal;

    /// 按标识符查找用户（Token 解析路径）
    fn retrieve_by_id(&self, id: &str) -> Result<Option<Self::User>>;

    /// 按凭据查找用户（登录路径，不验证凭据本身）
    fn retrieve_by_credentials(&self, credentials: &Credentials) -> Result<Option<Self::User>>;

    /// 验证用户的凭据是否正确
    fn validate_credentials(&self, user: &Self::User, credentials: &Credentials) -> Result<bool>;
}

// ============================================================================
// AuthRequest
// ============================================================================

/// 请求的认证视图
///
/// Guard 只关心请求中与认证有关的两个部分：`Authorization` 头
/// 和查询参数。由集成层从实际的 HTTP 请求构造。
#[derive(Debug, Clone, Default)]
pub struct AuthRequest {
    authorization: Option<String>,
    params: HashMap<String, String>,
}

impl AuthRequest {
    /// 创建一个空请求（无认证信息）
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置 `Authorization` 头的值
    pub fn with_authorization(mut self, value: impl Into<String>) -> Self {
        self.authorization = Some(value.into());
        self
    }

    /// 设置 `Authorization: Bearer <token>` 头
    pub fn with_bearer_token(self, token: impl AsRef<str>) -> Self {
        self.with_authorization(format!("{}{}", BEARER_PREFIX, token.as_ref()))
    }

    /// 添加一个查询参数
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// 从请求中提取 Token 字符串
    ///
    /// `Authorization` 头优先；头缺失时回退到 `token` 查询参数。
    /// 头的值若带 `Bearer ` 前缀则去掉，否则原样使用。
    pub fn token_string(&self) -> Option<&str> {
        if let Some(header) = self.authorization.as_deref() {
            return Some(header.strip_prefix(BEARER_PREFIX).unwrap_or(header));
        }

        self.params.get(TOKEN_PARAMETER).map(String::as_str)
    }
}

// ============================================================================
// Guard
// ============================================================================

/// 认证守卫
///
/// 每个请求一个实例：解析结果（用户、Token、登出标记）是
/// 请求范围的状态。[`TokenCodec`]、目录和事件分发器可跨请求共享。
pub struct Guard<D: UserDirectory> {
    codec: TokenCodec,
    directory: D,
    events: Arc<dyn EventDispatcher>,
    revocation: Option<Arc<dyn RevocationStore>>,
    verify_refresh_signature: bool,
    request: AuthRequest,

    // 请求范围的解析状态
    user: Option<D::User>,
    token: Option<ParsedToken>,
    logged_out: bool,
}

impl<D: UserDirectory> Guard<D> {
    /// 创建认证守卫
    ///
    /// # Errors
    ///
    /// 配置中的密钥无效时返回 `ConfigError::InvalidSecret`，
    /// 构造即失败，不会进入请求处理。
    pub fn new(config: &GuardConfig, directory: D) -> Result<Self> {
        let codec = TokenCodec::from_config(config)?;

        Ok(Self {
            codec,
            directory,
            events: Arc::new(NoOpEventDispatcher),
            revocation: None,
            verify_refresh_signature: config.verify_refresh_signature,
            request: AuthRequest::new(),
            user: None,
            token: None,
            logged_out: false,
        })
    }

    /// 设置事件分发器
    pub fn with_dispatcher(mut self, events: Arc<dyn EventDispatcher>) -> Self {
        self.events = events;
        self
    }

    /// 设置吊销存储
    pub fn with_revocation_store(mut self, store: Arc<dyn RevocationStore>) -> Self {
        self.revocation = Some(store);
        self
    }

    /// 设置当前请求
    pub fn set_request(&mut self, request: AuthRequest) -> &mut Self {
        self.request = request;
        self.token = None;
        self
    }

    /// 底层 Token 编解码器
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// 本次请求检测到的 Token（结构解析成功的）
    pub fn token(&self) -> Option<&ParsedToken> {
        self.token.as_ref()
    }

    /// 获取/解析当前请求的认证用户
    ///
    /// 解析结果在请求范围内缓存：第一次调用执行完整阶梯，
    /// 之后直接返回缓存。任何一层失败都返回 `None`。
    pub fn user(&mut self) -> Option<&D::User> {
        // 登出是终态
        if self.logged_out {
            return None;
        }

        if self.user.is_some() {
            return self.user.as_ref();
        }

        let token = match self.detect_token() {
            Some(token) => token,
            None => return None,
        };

        if self.codec.invalid_token(&token) {
            self.events
                .dispatch(AuthEvent::token_rejected("invalid signature"));
            return None;
        }

        if self.is_revoked(&token) {
            self.events.dispatch(AuthEvent::token_rejected("revoked"));
            return None;
        }

        if self.codec.expired(&token, Utc::now()) {
            self.events.dispatch(AuthEvent::token_rejected("expired"));
            return None;
        }

        let user = match self.find_user_by_token(&token) {
            Some(user) => user,
            None => return None,
        };

        self.user = Some(user);
        self.user.as_ref()
    }

    /// 当前请求是否已认证
    pub fn check(&mut self) -> bool {
        self.user().is_some()
    }

    /// 当前请求是否为匿名
    pub fn guest(&mut self) -> bool {
        !self.check()
    }

    /// 当前认证用户的标识符
    pub fn id(&mut self) -> Option<String> {
        self.user().map(Principal::auth_id)
    }

    /// 验证凭据是否正确（不登录）
    pub fn validate(&self, credentials: &Credentials) -> bool {
        match self.directory.retrieve_by_credentials(credentials) {
            Ok(Some(user)) => self.has_valid_credentials(&user, credentials),
            _ => false,
        }
    }

    /// 使用凭据尝试登录
    ///
    /// 凭据验证通过后把用户设为当前认证用户并返回 `true`；
    /// 之后可调用 [`issue`](Self::issue) 为其签发 Token。
    pub fn attempt(&mut self, credentials: &Credentials) -> bool {
        self.events.dispatch(AuthEvent::attempting());

        let user = match self.directory.retrieve_by_credentials(credentials) {
            Ok(Some(user)) => user,
            _ => {
                self.events.dispatch(AuthEvent::login_failed());
                return false;
            }
        };

        if self.has_valid_credentials(&user, credentials) {
            self.login(user);
            return true;
        }

        self.events.dispatch(AuthEvent::login_failed());
        false
    }

    /// 把给定用户设为当前认证用户
    pub fn login(&mut self, user: D::User) {
        self.events
            .dispatch(AuthEvent::login_succeeded(user.auth_id()));
        self.logged_out = false;
        self.user = Some(user);
    }

    /// 登出当前用户
    ///
    /// 先解析当前用户（保证事件携带用户标识），如配置了吊销存储
    /// 则吊销当前 Token，然后进入登出终态：本请求内后续的
    /// [`user`](Self::user) 一律返回 `None`。
    pub fn logout(&mut self) {
        let user_id = self.user().map(Principal::auth_id);
        if let Some(id) = user_id {
            self.events.dispatch(AuthEvent::logged_out(id));
        }

        if let (Some(store), Some(token)) = (self.revocation.as_ref(), self.token.as_ref()) {
            if let (Some(jti), Some(exp)) = (token.jti(), token.claims().exp) {
                if let Some(expires_at) = chrono::DateTime::from_timestamp(exp, 0) {
                    store.revoke(jti, expires_at);
                }
            }
        }

        self.user = None;
        self.logged_out = true;
    }

    /// 为当前认证用户签发 Token
    ///
    /// 没有认证用户或签发失败时返回 `None`。
    pub fn issue(&mut self, custom_claims: &HashMap<String, serde_json::Value>) -> Option<String> {
        let user = self.user.as_ref()?;

        let token_string = self.codec.issue(user, custom_claims).ok()?;
        self.dispatch_issued(IssueKind::Issued, &token_string);

        Some(token_string)
    }

    /// 续签 Token
    ///
    /// `token_string` 为 `None` 时使用当前请求检测到的 Token。
    /// 过期但未越过续签上限的 Token 可换发新 Token；
    /// 结构损坏、不可续签或用户不存在时返回 `None`。
    ///
    /// 按配置（默认开启）在续签前校验签名；关闭校验时恢复
    /// 历史的"解析即续签"行为。
    pub fn refresh(
        &mut self,
        token_string: Option<&str>,
        custom_claims: &HashMap<String, serde_json::Value>,
    ) -> Option<String> {
        let token = match token_string {
            Some(raw) => self.codec.parse_token(raw).ok()?,
            None => self.detect_token()?,
        };

        if self.verify_refresh_signature && self.codec.invalid_token(&token) {
            self.events
                .dispatch(AuthEvent::token_rejected("invalid signature on refresh"));
            return None;
        }

        if self.is_revoked(&token) {
            self.events.dispatch(AuthEvent::token_rejected("revoked"));
            return None;
        }

        if !self.codec.can_be_renewed(&token, Utc::now()) {
            return None;
        }

        let user = self.find_user_by_token(&token)?;
        self.user = Some(user);

        let new_token = self
            .codec
            .issue(self.user.as_ref()?, custom_claims)
            .ok()?;
        self.dispatch_issued(IssueKind::Refreshed, &new_token);

        Some(new_token)
    }

    // ========================================================================
    // 内部方法
    // ========================================================================

    /// 检测并结构解析当前请求中的 Token
    fn detect_token(&mut self) -> Option<ParsedToken> {
        if let Some(token) = self.token.as_ref() {
            return Some(token.clone());
        }

        let raw = self.request.token_string()?;
        let token = self.codec.parse_token(raw).ok()?;
        self.token = Some(token.clone());
        Some(token)
    }

    fn is_revoked(&self, token: &ParsedToken) -> bool {
        match (self.revocation.as_ref(), token.jti()) {
            (Some(store), Some(jti)) => store.is_revoked(jti),
            _ => false,
        }
    }

    fn find_user_by_token(&self, token: &ParsedToken) -> Option<D::User> {
        let id = token.subject()?;
        self.directory.retrieve_by_id(id).ok().flatten()
    }

    fn has_valid_credentials(&self, user: &D::User, credentials: &Credentials) -> bool {
        self.directory
            .validate_credentials(user, credentials)
            .unwrap_or(false)
    }

    fn dispatch_issued(&self, kind: IssueKind, token_string: &str) {
        let user_id = match self.user.as_ref() {
            Some(user) => user.auth_id(),
            None => return,
        };
        let jti = self
            .codec
            .parse_token(token_string)
            .ok()
            .and_then(|t| t.jti().map(str::to_string))
            .unwrap_or_default();

        let event = match kind {
            IssueKind::Issued => AuthEvent::token_issued(user_id, jti),
            IssueKind::Refreshed => AuthEvent::token_refreshed(user_id, jti),
        };
        self.events.dispatch(event);
    }
}

enum IssueKind {
    Issued,
    Refreshed,
}

// ============================================================================
// 测试
// ============================================================================
