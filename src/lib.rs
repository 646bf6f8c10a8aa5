// ==========================================
// 制造跟踪数据平台 - 核心库
// ==========================================
// 系统定位: 演示用数据访问层（报表查询 + 工单写入）
// 技术栈: Rust + SQLite
// 运行模型: 单进程、同步、单连接；无并发、无缓存、无分布式协调
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与报表行类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 建库与演示数据
pub mod schema;

// 时间与区间工具
pub mod timeutil;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    MachineUtilization, MonthlyProductOutput, Operation, PendingWorkOrder, ProductSummary,
    ScrapDimension, ScrapDriver, WipOrder, WorkOrder, WorkOrderStatus,
};

// 仓储
pub use repository::{
    ReportRepository, RepositoryError, RepositoryResult, WorkOrderRepository, DEFAULT_PLANT_ID,
};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "制造跟踪数据平台";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
