//! 认证事件模块
//!
//! 提供认证生命周期事件的分发和记录功能，包括：
//!
//! - **事件枚举**: 定义认证过程中的各种事件
//! - **分发器 Trait**: 定义事件分发接口
//! - **内存实现**: 用于测试和开发的简单实现
//!
//! ## 使用示例
//!
//! ```rust
//! use guardrs::events::{AuthEvent, EventDispatcher, InMemoryEventDispatcher};
//!
//! let dispatcher = InMemoryEventDispatcher::new();
//!
//! // 记录登录成功事件
//! dispatcher.dispatch(AuthEvent::login_succeeded("user123"));
//!
//! // 记录登录失败事件
//! dispatcher.dispatch(AuthEvent::login_failed());
//!
//! let events = dispatcher.get_events();
//! assert_eq!(events.len(), 2);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::random::generate_random_alphanumeric;

/// 认证事件类型
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthEventType {
    /// 凭据验证开始
    Attempting,
    /// 登录成功（凭据验证通过并签发 Token）
    LoginSucceeded,
    /// 登录失败（用户不存在或凭据错误）
    LoginFailed,
    /// 登出
    LoggedOut,
    /// Token 签发
    TokenIssued,
    /// Token 续签
    TokenRefreshed,
    /// Token 被拒绝（签名无效或已过期）
    TokenRejected,
}

impl std::fmt::Display for AuthEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthEventType::Attempting => write!(f, "attempting"),
            AuthEventType::LoginSucceeded => write!(f, "login_succeeded"),
            AuthEventType::LoginFailed => write!(f, "login_failed"),
            AuthEventType::LoggedOut => write!(f, "logged_out"),
            AuthEventType::TokenIssued => write!(f, "token_issued"),
            AuthEventType::TokenRefreshed => write!(f, "token_refreshed"),
            AuthEventType::TokenRejected => write!(f, "token_rejected"),
        }
    }
}

/// 认证事件
///
/// 表示认证流程中的一次状态变化记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthEvent {
    /// 事件 ID
    pub id: String,
    /// 事件类型
    pub event_type: AuthEventType,
    /// 用户 ID（如果适用）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Token ID（如果适用）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_id: Option<String>,
    /// 事件消息/描述
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// 额外详情
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub details: HashMap<String, String>,
    /// 事件时间
    pub timestamp: DateTime<Utc>,
}

impl AuthEvent {
    /// 创建新的认证事件
    pub fn new(event_type: AuthEventType) -> Self {
        Self {
            id: generate_event_id(),
            event_type,
            user_id: None,
            token_id: None,
            message: None,
            details: HashMap::new(),
            timestamp: Utc::now(),
        }
    }

    // ========================================================================
    // 便捷构造方法
    // ========================================================================

    /// 创建凭据验证开始事件
    pub fn attempting() -> Self {
        Self::new(AuthEventType::Attempting).with_message("Credential validation started")
    }

    /// 创建登录成功事件
    pub fn login_succeeded(user_id: impl Into<String>) -> Self {
        Self::new(AuthEventType::LoginSucceeded)
            .with_user_id(user_id)
            .with_message("User logged in successfully")
    }

    /// 创建登录失败事件
    pub fn login_failed() -> Self {
        Self::new(AuthEventType::LoginFailed).with_message("Credential validation failed")
    }

    /// 创建登出事件
    pub fn logged_out(user_id: impl Into<String>) -> Self {
        Self::new(AuthEventType::LoggedOut)
            .with_user_id(user_id)
            .with_message("User logged out")
    }

    /// 创建 Token 签发事件
    pub fn token_issued(user_id: impl Into<String>, token_id: impl Into<String>) -> Self {
        Self::new(AuthEventType::TokenIssued)
            .with_user_id(user_id)
            .with_token_id(token_id)
            .with_message("Token issued")
    }

    /// 创建 Token 续签事件
    pub fn token_refreshed(user_id: impl Into<String>, token_id: impl Into<String>) -> Self {
        Self::new(AuthEventType::TokenRefreshed)
            .with_user_id(user_id)
            .with_token_id(token_id)
            .with_message("Token refreshed")
    }

    /// 创建 Token 拒绝事件
    pub fn token_rejected(reason: impl Into<String>) -> Self {
        Self::new(AuthEventType::TokenRejected).with_message(reason)
    }

    // ========================================================================
    // Builder 方法
    // ========================================================================

    /// 设置用户 ID
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// 设置 Token ID
    pub fn with_token_id(mut self, token_id: impl Into<String>) -> Self {
        self.token_id = Some(token_id.into());
        self
    }

    /// 设置消息
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// 添加详情
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// 获取事件类型名称
    pub fn event_name(&self) -> String {
        self.event_type.to_string()
    }
}

/// 生成事件 ID
fn generate_event_id() -> String {
    format!("evt_{}", generate_random_alphanumeric(16))
}

// ============================================================================
// EventDispatcher Trait
// ============================================================================

/// 事件分发器 trait
///
/// 定义认证事件的分发接口。事件分发是"尽力而为"的：
/// 分发器不返回错误，事件处理失败不得影响认证结果。
pub trait EventDispatcher: Send + Sync {
    /// 分发一个认证事件
    fn dispatch(&self, event: AuthEvent);
}

// ============================================================================
// InMemoryEventDispatcher
// ============================================================================

/// 内存事件分发器
///
/// 用于测试和开发环境，将事件存储在内存中
#[derive(Debug, Default)]
pub struct InMemoryEventDispatcher {
    events: Arc<RwLock<Vec<AuthEvent>>>,
}

impl InMemoryEventDispatcher {
    /// 创建新的内存分发器
    pub fn new() -> Self {
        Self {
            events: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// 获取所有事件
    pub fn get_events(&self) -> Vec<AuthEvent> {
        self.events.read().unwrap().clone()
    }

    /// 获取事件数量
    pub fn event_count(&self) -> usize {
        self.events.read().unwrap().len()
    }

    /// 按事件类型获取事件
    pub fn get_events_by_type(&self, event_type: &AuthEventType) -> Vec<AuthEvent> {
        self.events
            .read()
            .unwrap()
            .iter()
            .filter(|e| &e.event_type == event_type)
            .cloned()
            .collect()
    }

    /// 按用户 ID 获取事件
    pub fn get_events_by_user(&self, user_id: &str) -> Vec<AuthEvent> {
        self.events
            .read()
            .unwrap()
            .iter()
            .filter(|e| e.user_id.as_deref() == Some(user_id))
            .cloned()
            .collect()
    }

    /// 清空所有事件
    pub fn clear(&self) {
        self.events.write().unwrap().clear();
    }
}

impl EventDispatcher for InMemoryEventDispatcher {
    fn dispatch(&self, event: AuthEvent) {
        self.events.write().unwrap().push(event);
    }
}

impl Clone for InMemoryEventDispatcher {
    fn clone(&self) -> Self {
        Self {
            events: Arc::clone(&self.events),
        }
    }
}

// ============================================================================
// NoOpEventDispatcher
// ============================================================================

/// 空操作事件分发器
///
/// 不执行任何操作，用于禁用事件记录
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpEventDispatcher;

impl NoOpEventDispatcher {
    /// 创建新的空操作分发器
    pub fn new() -> Self {
        Self
    }
}

impl EventDispatcher for NoOpEventDispatcher {
    fn dispatch(&self, _event: AuthEvent) {
        // 不执行任何操作
    }
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_creation() {
        let event = AuthEvent::login_succeeded("user123");

        assert_eq!(event.event_type, AuthEventType::LoginSucceeded);
        assert_eq!(event.user_id, Some("user123".to_string()));
        assert!(event.id.starts_with("evt_"));
    }

    #[test]
    fn test_event_builder() {
        let event = AuthEvent::token_issued("user456", "abcdef0123456789")
            .with_detail("source", "login");

        assert_eq!(event.user_id, Some("user456".to_string()));
        assert_eq!(event.token_id, Some("abcdef0123456789".to_string()));
        assert_eq!(event.details.get("source"), Some(&"login".to_string()));
    }

    #[test]
    fn test_in_memory_dispatcher() {
        let dispatcher = InMemoryEventDispatcher::new();

        dispatcher.dispatch(AuthEvent::attempting());
        dispatcher.dispatch(AuthEvent::login_succeeded("user1"));
        dispatcher.dispatch(AuthEvent::login_failed());

        assert_eq!(dispatcher.event_count(), 3);
    }

    #[test]
    fn test_filter_by_type() {
        let dispatcher = InMemoryEventDispatcher::new();

        dispatcher.dispatch(AuthEvent::login_succeeded("user1"));
        dispatcher.dispatch(AuthEvent::login_failed());
        dispatcher.dispatch(AuthEvent::login_succeeded("user2"));

        let succeeded = dispatcher.get_events_by_type(&AuthEventType::LoginSucceeded);
        assert_eq!(succeeded.len(), 2);

        let failed = dispatcher.get_events_by_type(&AuthEventType::LoginFailed);
        assert_eq!(failed.len(), 1);
    }

    #[test]
    fn test_filter_by_user() {
        let dispatcher = InMemoryEventDispatcher::new();

        dispatcher.dispatch(AuthEvent::login_succeeded("user1"));
        dispatcher.dispatch(AuthEvent::logged_out("user1"));
        dispatcher.dispatch(AuthEvent::login_succeeded("user2"));

        assert_eq!(dispatcher.get_events_by_user("user1").len(), 2);
        assert_eq!(dispatcher.get_events_by_user("user2").len(), 1);
    }

    #[test]
    fn test_clear_events() {
        let dispatcher = InMemoryEventDispatcher::new();

        dispatcher.dispatch(AuthEvent::attempting());
        assert_eq!(dispatcher.event_count(), 1);

        dispatcher.clear();
        assert_eq!(dispatcher.event_count(), 0);
    }

    #[test]
    fn test_clone_dispatcher_shares_state() {
        let dispatcher1 = InMemoryEventDispatcher::new();
        let dispatcher2 = dispatcher1.clone();

        dispatcher1.dispatch(AuthEvent::login_succeeded("user1"));

        // 两个分发器应该共享状态
        assert_eq!(dispatcher2.event_count(), 1);
    }

    #[test]
    fn test_event_serialization() {
        let event = AuthEvent::token_refreshed("user123", "abcdef0123456789");

        let json = serde_json::to_string(&event).unwrap();
        let deserialized: AuthEvent = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.user_id, event.user_id);
        assert_eq!(deserialized.token_id, event.token_id);
        assert_eq!(deserialized.event_type, AuthEventType::TokenRefreshed);
    }

    #[test]
    fn test_noop_dispatcher() {
        let dispatcher = NoOpEventDispatcher::new();

        // 不应该做任何事情，只是确保不会 panic
        dispatcher.dispatch(AuthEvent::login_succeeded("user1"));
    }

    #[test]
    fn test_event_name() {
        assert_eq!(AuthEvent::attempting().event_name(), "attempting");
        assert_eq!(
            AuthEvent::token_rejected("bad signature").event_name(),
            "token_rejected"
        );
    }
}
