// ==========================================
// 制造跟踪数据平台 - 领域类型定义
// ==========================================
// 序列化格式: snake_case 小写（与数据库存储一致）
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::repository::error::RepositoryError;

// ==========================================
// 工单状态 (Work Order Status)
// ==========================================
// 状态流转由外部流程负责，核心层只在创建时写入 planned，
// 其余时间只读取状态，不做流转
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkOrderStatus {
    Planned,    // 已计划
    Released,   // 已下达
    Delayed,    // 已延期
    InProgress, // 进行中
    Completed,  // 已完成
    Cancelled,  // 已取消
}

impl WorkOrderStatus {
    /// 数据库存储编码
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkOrderStatus::Planned => "planned",
            WorkOrderStatus::Released => "released",
            WorkOrderStatus::Delayed => "delayed",
            WorkOrderStatus::InProgress => "in_progress",
            WorkOrderStatus::Completed => "completed",
            WorkOrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for WorkOrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for WorkOrderStatus {
    type Err = RepositoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "planned" => Ok(WorkOrderStatus::Planned),
            "released" => Ok(WorkOrderStatus::Released),
            "delayed" => Ok(WorkOrderStatus::Delayed),
            "in_progress" => Ok(WorkOrderStatus::InProgress),
            "completed" => Ok(WorkOrderStatus::Completed),
            "cancelled" => Ok(WorkOrderStatus::Cancelled),
            other => Err(RepositoryError::InternalError(format!(
                "未知的工单状态: {}",
                other
            ))),
        }
    }
}

// ==========================================
// 废品分析维度 (Scrap Dimension)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrapDimension {
    Product, // 按产品
    Machine, // 按机台
}

impl fmt::Display for ScrapDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScrapDimension::Product => write!(f, "product"),
            ScrapDimension::Machine => write!(f, "machine"),
        }
    }
}
