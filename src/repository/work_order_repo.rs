// ==========================================
// 制造跟踪数据平台 - 工单写入仓储
// ==========================================
// 职责: 创建计划工单、追加生产工序记录
// 约束: 全部校验先于任何写入；校验查询与 INSERT 在同一事务内，
//       失败时不留下任何行
// ==========================================

use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

use crate::db::open_sqlite_connection;
use crate::domain::entities::{Operation, WorkOrder};
use crate::domain::types::WorkOrderStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};

/// 演示库为单厂区，新工单固定挂到该厂区
pub const DEFAULT_PLANT_ID: i64 = 1;

pub struct WorkOrderRepository {
    conn: Arc<Mutex<Connection>>,
}

impl WorkOrderRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 按 id 判断行是否存在
    fn row_exists(conn: &Connection, sql: &str, id: i64) -> RepositoryResult<bool> {
        let found: Option<i64> = conn
            .query_row(sql, params![id], |row| row.get(0))
            .optional()?;
        Ok(found.is_some())
    }

    /// 创建新工单（状态固定为 planned），返回新 id
    ///
    /// 校验顺序:
    /// 1. planned_qty > 0                 （Validation）
    /// 2. planned_start < planned_end     （Validation，固定宽度格式下字典序即时间序）
    /// 3. product_id 存在                 （NotFound）
    /// 4. machine_id 如提供则必须存在      （NotFound）
    pub fn create_work_order(
        &self,
        product_id: i64,
        planned_qty: i64,
        planned_start: &str,
        planned_end: &str,
        machine_id: Option<i64>,
    ) -> RepositoryResult<i64> {
        if planned_qty <= 0 {
            return Err(RepositoryError::Validation(format!(
                "planned_qty 必须大于 0（实际: {}）",
                planned_qty
            )));
        }
        if planned_start >= planned_end {
            return Err(RepositoryError::Validation(format!(
                "planned_start 必须早于 planned_end（实际: {} >= {}）",
                planned_start, planned_end
            )));
        }

        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        if !Self::row_exists(&tx, "SELECT id FROM products WHERE id = ?1", product_id)? {
            return Err(RepositoryError::not_found("Product", product_id));
        }
        if let Some(mid) = machine_id {
            if !Self::row_exists(&tx, "SELECT id FROM machines WHERE id = ?1", mid)? {
                return Err(RepositoryError::not_found("Machine", mid));
            }
        }

        tx.execute(
            r#"
            INSERT INTO work_orders
              (product_id, plant_id, planned_qty, status, planned_start, planned_end, machine_id)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                product_id,
                DEFAULT_PLANT_ID,
                planned_qty,
                WorkOrderStatus::Planned.as_str(),
                planned_start,
                planned_end,
                machine_id,
            ],
        )?;
        let new_id = tx.last_insert_rowid();

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        tracing::info!(work_order_id = new_id, product_id, planned_qty, "工单已创建");
        Ok(new_id)
    }

    /// 追加生产工序记录，返回新 id
    ///
    /// 只校验工单与机台的存在性；op_start/op_end 的先后关系与数量
    /// 不在此处校验（下游时长运算对倒置区间按 0 计）
    pub fn add_production_record(
        &self,
        work_order_id: i64,
        machine_id: i64,
        op_start: &str,
        op_end: &str,
        good_qty: i64,
        scrap_qty: i64,
        defect_code: Option<&str>,
    ) -> RepositoryResult<i64> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        if !Self::row_exists(&tx, "SELECT id FROM work_orders WHERE id = ?1", work_order_id)? {
            return Err(RepositoryError::not_found("WorkOrder", work_order_id));
        }
        if !Self::row_exists(&tx, "SELECT id FROM machines WHERE id = ?1", machine_id)? {
            return Err(RepositoryError::not_found("Machine", machine_id));
        }

        tx.execute(
            r#"
            INSERT INTO operations
              (work_order_id, machine_id, op_start, op_end, good_qty, scrap_qty, defect_code)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                work_order_id,
                machine_id,
                op_start,
                op_end,
                good_qty,
                scrap_qty,
                defect_code,
            ],
        )?;
        let new_id = tx.last_insert_rowid();

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        tracing::info!(operation_id = new_id, work_order_id, machine_id, "工序记录已追加");
        Ok(new_id)
    }

    /// 按 id 查找工单
    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<WorkOrder>> {
        let conn = self.get_conn()?;
        let result = conn.query_row(
            r#"
            SELECT id, product_id, plant_id, planned_qty, status,
                   planned_start, planned_end, machine_id
            FROM work_orders
            WHERE id = ?1
            "#,
            params![id],
            |row| {
                let status: String = row.get(4)?;
                let status = status.parse::<WorkOrderStatus>().map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        4,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })?;
                Ok(WorkOrder {
                    id: row.get(0)?,
                    product_id: row.get(1)?,
                    plant_id: row.get(2)?,
                    planned_qty: row.get(3)?,
                    status,
                    planned_start: row.get(5)?,
                    planned_end: row.get(6)?,
                    machine_id: row.get(7)?,
                })
            },
        );

        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 按 id 查找工序记录
    pub fn find_operation_by_id(&self, id: i64) -> RepositoryResult<Option<Operation>> {
        let conn = self.get_conn()?;
        let result = conn.query_row(
            r#"
            SELECT id, work_order_id, machine_id, op_start, op_end,
                   good_qty, scrap_qty, defect_code
            FROM operations
            WHERE id = ?1
            "#,
            params![id],
            |row| {
                Ok(Operation {
                    id: row.get(0)?,
                    work_order_id: row.get(1)?,
                    machine_id: row.get(2)?,
                    op_start: row.get(3)?,
                    op_end: row.get(4)?,
                    good_qty: row.get(5)?,
                    scrap_qty: row.get(6)?,
                    defect_code: row.get(7)?,
                })
            },
        );

        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
