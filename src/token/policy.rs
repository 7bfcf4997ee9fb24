//! Token 时间策略模块
//!
//! 提供过期与续签判定的纯函数。所有比较都基于显式传入的 `now`
//! 和 UTC 秒级时间戳，不读取环境时钟，便于测试和避免时区漂移。

use chrono::{DateTime, Utc};

use super::claims::Claims;

/// 判断 Token 是否已过期
///
/// `now > exp` 时为过期。没有 `exp` claim 的 Token 视为不过期
/// （与签发路径的约束配合：本库签发的 Token 总是带 `exp`）。
pub fn is_expired(claims: &Claims, now: DateTime<Utc>) -> bool {
    match claims.exp {
        Some(exp) => now.timestamp() > exp,
        None => false,
    }
}

/// 判断 Token 是否可以续签（换发新 Token）
///
/// - 尚未过期的 Token 总是可以续签；
/// - 已过期的 Token 仅当存在 `rli` claim 且 `now <= rli` 时可以续签；
/// - 没有 `rli` 的过期 Token 不可续签。
pub fn can_be_renewed(claims: &Claims, now: DateTime<Utc>) -> bool {
    if !is_expired(claims, now) {
        return true;
    }

    match claims.rli {
        Some(limit) => now.timestamp() <= limit,
        None => false,
    }
}
