// 控制 API 类型定义模块
// stats_config / stats_info 的请求和响应类型

use serde::{Deserialize, Serialize};

/// stats_config 请求体
/// (缺失或为 null 的 interval 按 0 处理，交给校验拒绝)
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct StatsConfigRequest {
    /// 统计周期（天），解码时不限制取值范围
    #[serde(default)]
    pub interval: Option<u64>,
}

/// stats_info 响应体
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatsInfoResponse {
    /// 当前统计周期（天）
    pub interval: u32,
}
