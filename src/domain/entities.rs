// ==========================================
// 制造跟踪数据平台 - 领域实体
// ==========================================
// 只为写入路径可回读的两张表建实体；
// products / machines / downtime_events 只通过报表行类型对外暴露
// ==========================================

use serde::{Deserialize, Serialize};

use crate::domain::types::WorkOrderStatus;

/// 工单
///
/// 创建时状态固定为 planned，后续流转由外部流程负责，
/// 核心层只读取状态、不做流转
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkOrder {
    pub id: i64,
    pub product_id: i64,         // → products.id
    pub plant_id: i64,           // → plants.id（演示库为单厂区）
    pub planned_qty: i64,        // 计划数量（> 0）
    pub status: WorkOrderStatus, // 工单状态
    pub planned_start: String,   // 计划开始（UTC ISO-8601）
    pub planned_end: String,     // 计划结束（planned_start < planned_end）
    pub machine_id: Option<i64>, // → machines.id（可空）
}

/// 生产工序记录
///
/// 只追加，核心层不更新、不删除
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
    pub id: i64,
    pub work_order_id: i64,          // → work_orders.id
    pub machine_id: i64,             // → machines.id
    pub op_start: String,            // 工序开始（UTC ISO-8601）
    pub op_end: String,              // 工序结束（写入时不校验先后，时长运算负责夹取）
    pub good_qty: i64,               // 良品数（>= 0）
    pub scrap_qty: i64,              // 废品数（>= 0）
    pub defect_code: Option<String>, // 缺陷码（可空）
}
