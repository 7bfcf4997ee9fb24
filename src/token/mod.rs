//! Token 模块
//!
//! 负责 Token 的完整生命周期：
//!
//! - [`claims`] - Claim Set 定义（保留 claim 与自定义 claim）
//! - [`codec`] - Token 构建、签名、解析与签名校验
//! - [`policy`] - 过期与续签的时间策略（纯函数）
//!
//! 各层职责分离：结构解析不碰签名，签名校验不看时间，
//! 时间策略不读环境时钟。

pub mod claims;
pub mod codec;
pub mod policy;

pub use claims::{Claims, RESERVED_CLAIMS};
pub use codec::{Header, ParsedToken, TokenCodec};
pub use policy::{can_be_renewed, is_expired};
