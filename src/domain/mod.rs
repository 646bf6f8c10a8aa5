// ==========================================
// 制造跟踪数据平台 - 领域模型层
// ==========================================
// 职责: 定义领域实体、报表行类型与枚举
// 约束: 不含数据访问逻辑
// ==========================================

pub mod entities;
pub mod report;
pub mod types;

// 重导出核心类型
pub use entities::{Operation, WorkOrder};
pub use report::{
    MachineUtilization, MonthlyProductOutput, PendingWorkOrder, ProductSummary, ScrapDriver,
    WipOrder,
};
pub use types::{ScrapDimension, WorkOrderStatus};
