//! Token 签发、解析、校验与时间策略的集成测试

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{Duration, Utc};
use std::collections::HashMap;

use guardrs::config::GuardConfig;
use guardrs::error::Result;
use guardrs::guard::Principal;
use guardrs::secret::{Secret, generate_secret};
use guardrs::token::codec::TokenCodec;

const TEST_SECRET: &str = "integration-test-secret-32-bytes";

struct User {
    id: String,
}

impl User {
    fn new(id: &str) -> Self {
        Self { id: id.to_string() }
    }
}

impl Principal for User {
    fn auth_id(&self) -> String {
        self.id.clone()
    }

    fn custom_claims(&self) -> Result<HashMap<String, serde_json::Value>> {
        let mut claims = HashMap::new();
        claims.insert("plan".to_string(), serde_json::json!("pro"));
        Ok(claims)
    }
}

fn codec() -> TokenCodec {
    TokenCodec::from_config(&GuardConfig::new(TEST_SECRET)).unwrap()
}

// ============================================================================
// 签发与往返
// ============================================================================

#[test]
fn test_issue_parse_verify_roundtrip() {
    let codec = codec();
    let now = Utc::now();

    let token_string = codec.issue(&User::new("42"), &HashMap::new()).unwrap();
    let token = codec.parse_token(&token_string).unwrap();

    assert!(codec.valid_token(&token));
    assert!(!codec.expired(&token, now));
    assert!(codec.can_be_renewed(&token, now));

    assert_eq!(token.subject(), Some("42"));
    assert_eq!(token.claims().iss.as_deref(), Some("guardrs"));
    assert_eq!(token.claims().get_custom::<String>("plan").as_deref(), Some("pro"));
}

#[test]
fn test_issued_tokens_have_unique_ids() {
    let codec = codec();
    let user = User::new("42");

    let a = codec.issue(&user, &HashMap::new()).unwrap();
    let b = codec.issue(&user, &HashMap::new()).unwrap();
    assert_ne!(a, b);

    let jti_a = codec.parse_token(&a).unwrap().jti().unwrap().to_string();
    let jti_b = codec.parse_token(&b).unwrap().jti().unwrap().to_string();
    assert_ne!(jti_a, jti_b);
    assert_eq!(jti_a.len(), 16);
}

#[test]
fn test_caller_claims_survive_roundtrip() {
    let codec = codec();

    let mut claims = HashMap::new();
    claims.insert("scope".to_string(), serde_json::json!(["read", "write"]));
    claims.insert("org".to_string(), serde_json::json!(7));

    let token_string = codec.issue(&User::new("42"), &claims).unwrap();
    let token = codec.parse_token(&token_string).unwrap();

    assert_eq!(
        token.claims().get_custom::<Vec<String>>("scope"),
        Some(vec!["read".to_string(), "write".to_string()])
    );
    assert_eq!(token.claims().get_custom::<i64>("org"), Some(7));
}

// ============================================================================
// 结构解析失败
// ============================================================================

#[test]
fn test_malformed_tokens_are_rejected_structurally() {
    let codec = codec();

    for bad in [
        "",
        "a",
        "a.b",
        "a.b.c.d",
        "!!!.???.***",
        "  .  .  ",
    ] {
        assert!(codec.parse_token(bad).is_err(), "{:?} should fail", bad);
    }
}

#[test]
fn test_valid_base64_with_garbage_json_is_rejected() {
    let codec = codec();
    let seg = URL_SAFE_NO_PAD.encode(b"[1,2,3]");
    assert!(codec.parse_token(&format!("{0}.{0}.{0}", seg)).is_err());
}

// ============================================================================
// 签名校验
// ============================================================================

#[test]
fn test_signature_tampering_is_detected() {
    let codec = codec();
    let token_string = codec.issue(&User::new("42"), &HashMap::new()).unwrap();

    let (prefix, signature) = token_string.rsplit_once('.').unwrap();
    let mut sig_bytes = URL_SAFE_NO_PAD.decode(signature).unwrap();

    // 逐个翻转每个签名字节的最低位，每个变体都必须被拒绝
    for i in 0..sig_bytes.len() {
        sig_bytes[i] ^= 0x01;
        let tampered = format!("{}.{}", prefix, URL_SAFE_NO_PAD.encode(&sig_bytes));
        let token = codec.parse_token(&tampered).unwrap();
        assert!(!codec.valid_token(&token), "flipped byte {} accepted", i);
        sig_bytes[i] ^= 0x01;
    }
}

#[test]
fn test_token_from_different_secret_is_rejected() {
    let issuing = codec();
    let verifying =
        TokenCodec::from_config(&GuardConfig::new("another-independent-secret-32b!")).unwrap();

    let token_string = issuing.issue(&User::new("42"), &HashMap::new()).unwrap();
    let token = verifying.parse_token(&token_string).unwrap();

    assert!(!verifying.valid_token(&token));
    // 同一 Token 在签发方这里仍然有效
    let token = issuing.parse_token(&token_string).unwrap();
    assert!(issuing.valid_token(&token));
}

// ============================================================================
// 时间策略
// ============================================================================

#[test]
fn test_expiry_and_renewal_over_time() {
    let config = GuardConfig::new(TEST_SECRET)
        .with_ttl_minutes(60)
        .with_refresh_limit_minutes(1440);
    let codec = TokenCodec::from_config(&config).unwrap();

    let token_string = codec.issue(&User::new("42"), &HashMap::new()).unwrap();
    let token = codec.parse_token(&token_string).unwrap();
    let now = Utc::now();

    // 有效期内：未过期，可续签
    assert!(!codec.expired(&token, now + Duration::minutes(59)));
    assert!(codec.can_be_renewed(&token, now + Duration::minutes(59)));

    // 过期后宽限期内：已过期，仍可续签
    assert!(codec.expired(&token, now + Duration::minutes(61)));
    assert!(codec.can_be_renewed(&token, now + Duration::minutes(61)));
    assert!(codec.can_be_renewed(&token, now + Duration::minutes(60 + 1439)));

    // 越过续签上限：不可续签
    assert!(!codec.can_be_renewed(&token, now + Duration::minutes(60 + 1441)));
}

#[test]
fn test_zero_grace_period_scenario() {
    // 32 个零字节的密钥、ttl=60、宽限期=0：
    // 过期 1 分钟后既不通过过期检查也不可续签
    let secret = Secret::from_bytes(vec![0u8; 32]).unwrap();
    let codec = TokenCodec::new(secret, "guardrs", 60, 0);

    let token_string = codec.issue(&User::new("42"), &HashMap::new()).unwrap();
    let token = codec.parse_token(&token_string).unwrap();
    let now = Utc::now();

    assert!(codec.valid_token(&token));
    assert_eq!(token.subject(), Some("42"));

    let later = now + Duration::minutes(61);
    assert!(codec.expired(&token, later));
    assert!(!codec.can_be_renewed(&token, later));
}

// ============================================================================
// 密钥管理
// ============================================================================

#[test]
fn test_generated_secret_signs_and_verifies() {
    let raw = generate_secret().unwrap();
    let codec = TokenCodec::from_config(&GuardConfig::new(&raw)).unwrap();

    let token_string = codec.issue(&User::new("42"), &HashMap::new()).unwrap();
    let token = codec.parse_token(&token_string).unwrap();
    assert!(codec.valid_token(&token));
}

#[test]
fn test_short_secret_fails_at_construction() {
    for raw in ["", "abc", "fifteen-bytes!!", "base64:c2hvcnQ="] {
        let config = GuardConfig::new(raw);
        assert!(TokenCodec::from_config(&config).is_err(), "{:?} accepted", raw);
    }
}
