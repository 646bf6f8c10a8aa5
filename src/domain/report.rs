// ==========================================
// 制造跟踪数据平台 - 报表行类型
// ==========================================
// 每个报表查询对应一个强类型行结构，
// 仅在展示边界经 serde 序列化为通用映射
// ==========================================

use serde::{Deserialize, Serialize};

use crate::domain::types::WorkOrderStatus;

/// 按月产品产出行（product_output_by_month）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyProductOutput {
    pub product_name: String,
    pub good_qty: i64,   // 良品合计（零默认）
    pub scrap_qty: i64,  // 废品合计（零默认）
    pub num_orders: i64, // 当月有工序的去重工单数
}

/// 在制工单行（list_wip）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WipOrder {
    pub id: i64,
    pub product: String,          // 产品名
    pub planned_qty: i64,
    pub status: WorkOrderStatus,
    pub planned_start: String,
    pub planned_end: String,
    pub machine_id: Option<i64>,
}

/// 机台利用率行（machine_utilization）
///
/// 小时值保留 2 位小数，利用率保留 4 位小数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MachineUtilization {
    pub machine_id: i64,
    pub machine_name: String,
    pub runtime_hours: f64,   // 窗口内完整包含工序的运行时长
    pub available_hours: f64, // 简单口径=窗口时长；调整口径=窗口时长-停机时长（夹到 0）
    pub downtime_hours: f64,  // 简单口径恒为 0
    pub utilization: f64,     // runtime / available，available<=0 时为 0
}

/// 无产出工单行（work_orders_no_production）
///
/// completed / cancelled 视为已关闭，不参与此检查
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingWorkOrder {
    pub id: i64,
    pub product: String,
    pub status: WorkOrderStatus,
    pub planned_start: String,
    pub planned_end: String,
    pub planned_qty: i64,
}

/// 废品驱动因素行（top_scrap_by）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapDriver {
    pub name: String,    // 产品名或机台名，取决于分析维度
    pub scrap_qty: i64,
    pub total_qty: i64,  // good + scrap
    pub scrap_rate: f64, // scrap / total，total=0 时为 0
}

/// 产品汇总（product_summary）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductSummary {
    pub product_id: i64,
    pub product_name: String,
    pub good_qty: i64,
    pub scrap_qty: i64,
    pub num_orders: i64, // 窗口内有工序的去重工单数
}
