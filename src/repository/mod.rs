// ==========================================
// 制造跟踪数据平台 - 数据仓储层
// ==========================================
// 职责: 提供数据访问接口，屏蔽数据库细节
// 约束: 所有查询使用参数化，防止 SQL 注入
// 约束: Repository 不含展示逻辑
// ==========================================

pub mod error;
pub mod report_repo;
pub mod work_order_repo;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use report_repo::ReportRepository;
pub use work_order_repo::{WorkOrderRepository, DEFAULT_PLANT_ID};
