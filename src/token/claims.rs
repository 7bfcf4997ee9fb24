//! Claim Set 模块
//!
//! 定义 Token 载荷中的保留 claim 与自定义 claim。
//!
//! ## 保留 claim
//!
//! | claim | 含义 |
//! |---|---|
//! | `iss` | 签发者（服务标识） |
//! | `sub` | 主题（用户标识符） |
//! | `jti` | Token ID（随机生成，用于吊销记录） |
//! | `iat` | 签发时间（UTC 秒级时间戳） |
//! | `nbf` | 生效时间（签发时等于 `iat`） |
//! | `exp` | 过期时间（`iat + ttl`） |
//! | `rli` | 续签上限（`iat + ttl + refresh_limit`） |
//!
//! 自定义 claim 通过 serde flatten 与保留 claim 共存于同一 JSON 对象。

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::collections::HashMap;

/// 保留 claim 的名称列表
///
/// 签发时自定义 claim 不允许覆盖这些名称。
pub const RESERVED_CLAIMS: [&str; 7] = ["iss", "sub", "jti", "iat", "nbf", "exp", "rli"];

/// Token 载荷中的 Claim Set
///
/// 包含 JWT 规范的标准字段、续签上限 `rli` 以及自定义字段。
/// Claim Set 只在签发或续签时创建，一经签名不再变更。
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Claims {
    /// 签发者
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    /// 主题（用户标识符）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Token ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,

    /// 签发时间（Unix 时间戳，UTC）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// 生效时间（Unix 时间戳，UTC）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,

    /// 过期时间（Unix 时间戳，UTC）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    /// 续签上限（Unix 时间戳，UTC）
    ///
    /// 过期后的 Token 只要尚未越过该时刻仍可换发新 Token。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rli: Option<i64>,

    /// 自定义字段
    #[serde(flatten)]
    pub custom: HashMap<String, serde_json::Value>,
}

impl Claims {
    /// 创建新的空 Claim Set
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取自定义字段值
    pub fn get_custom<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.custom
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// 插入一个自定义字段
    ///
    /// 保留 claim 名称会被拒绝（返回 false），保证签发路径上的
    /// 时间与身份字段不会被调用方或用户对象悄悄覆盖。
    pub fn set_custom<V: Serialize>(&mut self, key: impl Into<String>, value: V) -> bool {
        let key = key.into();
        if RESERVED_CLAIMS.contains(&key.as_str()) {
            return false;
        }
        match serde_json::to_value(value) {
            Ok(json_value) => {
                self.custom.insert(key, json_value);
                true
            }
            Err(_) => false,
        }
    }

    /// 合并一组自定义字段（保留 claim 名称被跳过）
    pub fn merge_custom(&mut self, claims: &HashMap<String, serde_json::Value>) {
        for (key, value) in claims {
            if !RESERVED_CLAIMS.contains(&key.as_str()) {
                self.custom.insert(key.clone(), value.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_serialization_roundtrip() {
        let mut claims = Claims {
            iss: Some("guardrs-test".to_string()),
            sub: Some("user_42".to_string()),
            jti: Some("abcdef0123456789".to_string()),
            iat: Some(1_700_000_000),
            nbf: Some(1_700_000_000),
            exp: Some(1_700_003_600),
            rli: Some(1_700_435_600),
            custom: HashMap::new(),
        };
        claims.set_custom("role", "admin");

        let json = serde_json::to_string(&claims).unwrap();
        let decoded: Claims = serde_json::from_str(&json).unwrap();

        // 保留 claim 逐位一致
        assert_eq!(decoded.iss, claims.iss);
        assert_eq!(decoded.sub, claims.sub);
        assert_eq!(decoded.jti, claims.jti);
        assert_eq!(decoded.iat, claims.iat);
        assert_eq!(decoded.nbf, claims.nbf);
        assert_eq!(decoded.exp, claims.exp);
        assert_eq!(decoded.rli, claims.rli);

        let role: Option<String> = decoded.get_custom("role");
        assert_eq!(role, Some("admin".to_string()));
    }

    #[test]
    fn test_absent_claims_are_omitted() {
        let claims = Claims::new();
        let json = serde_json::to_string(&claims).unwrap();
        assert_eq!(json, "{}");
    }

    #[test]
    fn test_set_custom_rejects_reserved_names() {
        let mut claims = Claims::new();

        assert!(!claims.set_custom("exp", 0));
        assert!(!claims.set_custom("sub", "intruder"));
        assert!(!claims.set_custom("rli", i64::MAX));
        assert!(claims.custom.is_empty());

        assert!(claims.set_custom("department", "engineering"));
        assert_eq!(claims.custom.len(), 1);
    }

    #[test]
    fn test_merge_custom_skips_reserved_names() {
        let mut claims = Claims::new();
        let mut extra = HashMap::new();
        extra.insert("exp".to_string(), serde_json::json!(0));
        extra.insert("team".to_string(), serde_json::json!("platform"));

        claims.merge_custom(&extra);

        assert!(!claims.custom.contains_key("exp"));
        let team: Option<String> = claims.get_custom("team");
        assert_eq!(team, Some("platform".to_string()));
    }

    #[test]
    fn test_get_custom_with_typed_values() {
        let mut claims = Claims::new();
        claims.set_custom("level", 5);
        claims.set_custom("verified", true);
        claims.set_custom("tags", vec!["a", "b"]);

        assert_eq!(claims.get_custom::<i64>("level"), Some(5));
        assert_eq!(claims.get_custom::<bool>("verified"), Some(true));
        assert_eq!(
            claims.get_custom::<Vec<String>>("tags"),
            Some(vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(claims.get_custom::<String>("missing"), None);
    }
}
