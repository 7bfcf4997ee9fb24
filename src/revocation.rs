//! Token 吊销模块
//!
//! 提供按 Token ID（`jti`）吊销 Token 的可插拔存储接口。
//!
//! 本库签发的 Token 是无状态的：签名有效且未过期即被接受。
//! 吊销存储是在此之上可选的一层，用于在 Token 自然过期前使其失效
//! （如登出后立即作废、密钥泄露时批量作废）。
//!
//! ## 使用示例
//!
//! ```rust
//! use chrono::{Duration, Utc};
//! use guardrs::revocation::{InMemoryRevocationStore, RevocationStore};
//!
//! let store = InMemoryRevocationStore::new();
//! let expires_at = Utc::now() + Duration::hours(1);
//!
//! store.revoke("abcdef0123456789", expires_at);
//! assert!(store.is_revoked("abcdef0123456789"));
//! assert!(!store.is_revoked("other"));
//! ```

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Token 吊销存储 trait
///
/// 以 `jti` 为键记录被吊销的 Token。记录只需保留到 Token 的
/// 自然过期时刻，之后 Token 本身已失效，记录可以清理。
pub trait RevocationStore: Send + Sync {
    /// 吊销一个 Token
    ///
    /// `expires_at` 是该 Token 的自然过期时刻，用于后续清理。
    fn revoke(&self, jti: &str, expires_at: DateTime<Utc>);

    /// 检查 Token 是否已被吊销
    fn is_revoked(&self, jti: &str) -> bool;

    /// 清理已过自然过期时刻的吊销记录
    ///
    /// 返回被清理的记录数。
    fn cleanup_expired(&self, now: DateTime<Utc>) -> usize;
}

// ============================================================================
// InMemoryRevocationStore
// ============================================================================

/// 内存吊销存储
///
/// 用于测试、开发和单实例部署。多实例部署应实现
/// [`RevocationStore`] 对接共享存储。
#[derive(Debug, Default)]
pub struct InMemoryRevocationStore {
    revoked: Arc<RwLock<HashMap<String, DateTime<Utc>>>>,
}

impl InMemoryRevocationStore {
    /// 创建新的内存吊销存储
    pub fn new() -> Self {
        Self {
            revoked: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// 当前记录数
    pub fn len(&self) -> usize {
        self.revoked.read().unwrap().len()
    }

    /// 是否没有任何记录
    pub fn is_empty(&self) -> bool {
        self.revoked.read().unwrap().is_empty()
    }
}

impl RevocationStore for InMemoryRevocationStore {
    fn revoke(&self, jti: &str, expires_at: DateTime<Utc>) {
        self.revoked
            .write()
            .unwrap()
            .insert(jti.to_string(), expires_at);
    }

    fn is_revoked(&self, jti: &str) -> bool {
        self.revoked.read().unwrap().contains_key(jti)
    }

    fn cleanup_expired(&self, now: DateTime<Utc>) -> usize {
        let mut revoked = self.revoked.write().unwrap();
        let before = revoked.len();
        revoked.retain(|_, expires_at| *expires_at > now);
        before - revoked.len()
    }
}

impl Clone for InMemoryRevocationStore {
    fn clone(&self) -> Self {
        Self {
            revoked: Arc::clone(&self.revoked),
        }
    }
}

// ============================================================================
// NoOpRevocationStore
// ============================================================================

/// 空操作吊销存储
///
/// 从不吊销任何 Token，用于纯无状态部署（吊销被显式放弃）。
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpRevocationStore;

impl NoOpRevocationStore {
    /// 创建新的空操作吊销存储
    pub fn new() -> Self {
        Self
    }
}

impl RevocationStore for NoOpRevocationStore {
    fn revoke(&self, _jti: &str, _expires_at: DateTime<Utc>) {
        // 不执行任何操作
    }

    fn is_revoked(&self, _jti: &str) -> bool {
        false
    }

    fn cleanup_expired(&self, _now: DateTime<Utc>) -> usize {
        0
    }
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_revoke_and_check() {
        let store = InMemoryRevocationStore::new();
        let expires_at = Utc::now() + Duration::hours(1);

        assert!(!store.is_revoked("token-a"));

        store.revoke("token-a", expires_at);
        assert!(store.is_revoked("token-a"));
        assert!(!store.is_revoked("token-b"));
    }

    #[test]
    fn test_cleanup_expired() {
        let store = InMemoryRevocationStore::new();
        let now = Utc::now();

        store.revoke("live", now + Duration::hours(1));
        store.revoke("dead", now - Duration::hours(1));
        assert_eq!(store.len(), 2);

        let removed = store.cleanup_expired(now);
        assert_eq!(removed, 1);

        // 尚未过期的记录保留，已过期的被清理
        assert!(store.is_revoked("live"));
        assert!(!store.is_revoked("dead"));
    }

    #[test]
    fn test_cleanup_on_empty_store() {
        let store = InMemoryRevocationStore::new();
        assert_eq!(store.cleanup_expired(Utc::now()), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_clone_shares_state() {
        let store1 = InMemoryRevocationStore::new();
        let store2 = store1.clone();

        store1.revoke("token-a", Utc::now() + Duration::hours(1));
        assert!(store2.is_revoked("token-a"));
    }

    #[test]
    fn test_noop_store_never_revokes() {
        let store = NoOpRevocationStore::new();

        store.revoke("token-a", Utc::now() + Duration::hours(1));
        assert!(!store.is_revoked("token-a"));
        assert_eq!(store.cleanup_expired(Utc::now()), 0);
    }
}
