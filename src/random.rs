//! 安全随机数生成模块
//!
//! 提供密码学安全的随机数生成功能，用于生成签名密钥和 Token ID。

use rand::{Rng, TryRngCore, distr::Alphanumeric, rngs::OsRng};

use crate::error::{Error, Result};

/// 生成指定长度的随机字节数组
///
/// 使用操作系统提供的密码学安全随机数生成器 (CSPRNG)
///
/// # Arguments
///
/// * `length` - 要生成的字节数
///
/// # Example
///
/// ```rust
/// use guardrs::random::generate_random_bytes;
///
/// let bytes = generate_random_bytes(32).unwrap();
/// assert_eq!(bytes.len(), 32);
/// ```
pub fn generate_random_bytes(length: usize) -> Result<Vec<u8>> {
    let mut bytes = vec![0u8; length];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| Error::internal(format!("rng failed: {:?}", e)))?;
    Ok(bytes)
}

/// 生成指定长度的字母数字随机字符串
///
/// 只包含 a-z, A-Z, 0-9 字符
///
/// # Example
///
/// ```rust
/// use guardrs::random::generate_random_alphanumeric;
///
/// let token = generate_random_alphanumeric(16);
/// assert_eq!(token.len(), 16);
/// assert!(token.chars().all(|c| c.is_alphanumeric()));
/// ```
pub fn generate_random_alphanumeric(length: usize) -> String {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// 生成 Token ID（`jti` claim）
///
/// 16 个字符的字母数字随机字符串。该 ID 只用于标识 Token
/// （如吊销记录），不构成安全边界，因此无需不可猜测性。
///
/// # Example
///
/// ```rust
/// use guardrs::random::generate_token_id;
///
/// let jti = generate_token_id();
/// assert_eq!(jti.len(), 16);
/// ```
pub fn generate_token_id() -> String {
    generate_random_alphanumeric(16)
}

/// 常量时间比较两个字节切片
///
/// 用于防止时序攻击（如签名比较时的短路泄露）
///
/// # Example
///
/// ```rust
/// use guardrs::random::constant_time_compare;
///
/// assert!(constant_time_compare(b"signature", b"signature"));
/// assert!(!constant_time_compare(b"signature", b"forgery!!"));
/// ```
pub fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    use subtle::ConstantTimeEq;
    a.ct_eq(b).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_random_bytes() {
        let bytes = generate_random_bytes(32).unwrap();
        assert_eq!(bytes.len(), 32);

        // 确保生成的是随机的（两次生成不应相同）
        let bytes2 = generate_random_bytes(32).unwrap();
        assert_ne!(bytes, bytes2);
    }

    #[test]
    fn test_generate_random_alphanumeric() {
        let token = generate_random_alphanumeric(24);
        assert_eq!(token.len(), 24);
        assert!(token.chars().all(|c| c.is_alphanumeric()));
    }

    #[test]
    fn test_generate_token_id() {
        let id = generate_token_id();
        assert_eq!(id.len(), 16);

        // 多次生成应互不相同
        let ids: HashSet<String> = (0..50).map(|_| generate_token_id()).collect();
        assert_eq!(ids.len(), 50);
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare(b"hello", b"hello"));
        assert!(!constant_time_compare(b"hello", b"world"));
        assert!(!constant_time_compare(b"hello", b"hell"));
        assert!(!constant_time_compare(b"", b"x"));
        assert!(constant_time_compare(b"", b""));
    }
}
