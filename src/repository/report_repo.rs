// ==========================================
// 制造跟踪数据平台 - 报表查询仓储
// ==========================================
// 职责: 只读聚合查询（按月产出 / 在制工单 / 机台利用率 /
//       无产出工单 / 废品驱动因素 / 产品汇总）
// 约束: 所有查询使用参数化，防止 SQL 注入
// 窗口语义: [start, end] 双闭区间，完整包含
//           （op_start >= start AND op_end <= end），
//           部分重叠的区间不计入、不按比例折算；不得改为重叠口径
// ==========================================

use rusqlite::{params, Connection, Result as SqliteResult};
use std::sync::{Arc, Mutex};

use crate::db::open_sqlite_connection;
use crate::domain::report::{
    MachineUtilization, MonthlyProductOutput, PendingWorkOrder, ProductSummary, ScrapDriver,
    WipOrder,
};
use crate::domain::types::{ScrapDimension, WorkOrderStatus};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::timeutil::{duration_hours, hours_between, parse_instant, round_hours, round_ratio};

/// 在 rusqlite 行映射闭包内解析工单状态
///
/// 解析失败按列转换失败上报（schema 的 CHECK 约束保证正常库中不会出现）
fn status_from_column(idx: usize, raw: String) -> SqliteResult<WorkOrderStatus> {
    raw.parse::<WorkOrderStatus>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

pub struct ReportRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ReportRepository {
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

    /// 按月产品产出
    ///
    /// month 为 'YYYY-MM' 字面量；工序按 op_start 前 7 个字符归月
    /// （前缀匹配，跨月工序整体计入开始月）。
    /// 月份过滤条件位于 WHERE 而非 JOIN 条件，因此当月无工序的产品
    /// 不出现在结果中；不要改成补零口径
    pub fn product_output_by_month(
        &self,
        month: &str,
    ) -> RepositoryResult<Vec<MonthlyProductOutput>> {
        tracing::debug!(month, "查询按月产品产出");
        let like = format!("{}%", month);
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT p.name AS product_name,
                   COALESCE(SUM(o.good_qty), 0)  AS good_qty,
                   COALESCE(SUM(o.scrap_qty), 0) AS scrap_qty,
                   COUNT(DISTINCT o.work_order_id) AS num_orders
            FROM products p
            LEFT JOIN work_orders w ON w.product_id = p.id
            LEFT JOIN operations o  ON o.work_order_id = w.id
            WHERE o.op_start LIKE ?1
            GROUP BY p.name
            ORDER BY p.name
            "#,
        )?;

        let rows = stmt
            .query_map(params![like], |row| {
                Ok(MonthlyProductOutput {
                    product_name: row.get(0)?,
                    good_qty: row.get(1)?,
                    scrap_qty: row.get(2)?,
                    num_orders: row.get(3)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(rows)
    }

    /// 在制工单
    ///
    /// 判定: status = 'in_progress'
    ///   或 (now 落在 [planned_start, planned_end] 闭区间内
    ///       且 status 不属于 completed / cancelled)
    pub fn list_wip(&self, now: &str) -> RepositoryResult<Vec<WipOrder>> {
        tracing::debug!(now, "查询在制工单");
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT w.id,
                   p.name AS product,
                   w.planned_qty,
                   w.status,
                   w.planned_start,
                   w.planned_end,
                   w.machine_id
            FROM work_orders w
            JOIN products p ON p.id = w.product_id
            WHERE w.status = 'in_progress'
               OR ( ?1 >= w.planned_start AND ?1 <= w.planned_end
                    AND w.status NOT IN ('completed','cancelled') )
            ORDER BY w.planned_start
            "#,
        )?;

        let rows = stmt
            .query_map(params![now], |row| {
                Ok(WipOrder {
                    id: row.get(0)?,
                    product: row.get(1)?,
                    planned_qty: row.get(2)?,
                    status: status_from_column(3, row.get(3)?)?,
                    planned_start: row.get(4)?,
                    planned_end: row.get(5)?,
                    machine_id: row.get(6)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(rows)
    }

    /// 机台利用率
    ///
    /// 每台机台都出现（零默认）。窗口时长只计算一次，全机台共享。
    /// - 简单口径: available = 窗口时长, downtime = 0
    /// - 调整口径: downtime = 窗口内完整包含停机事件的时长合计,
    ///             available = max(0, 窗口时长 - downtime)
    /// - available <= 0 时利用率为 0，不报错、不产生无穷
    pub fn machine_utilization(
        &self,
        start: &str,
        end: &str,
        adjusted: bool,
    ) -> RepositoryResult<Vec<MachineUtilization>> {
        tracing::debug!(start, end, adjusted, "计算机台利用率");
        let start_epoch = parse_instant(start)?;
        let end_epoch = parse_instant(end)?;
        let total_hours = hours_between(start_epoch, end_epoch);

        let conn = self.get_conn()?;
        let mut machine_stmt = conn.prepare("SELECT id, name FROM machines ORDER BY id")?;
        let machines = machine_stmt
            .query_map([], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        let mut results = Vec::with_capacity(machines.len());
        for (machine_id, machine_name) in machines {
            let runtime_hours = Self::sum_interval_hours(
                &conn,
                r#"
                SELECT op_start, op_end
                FROM operations
                WHERE machine_id = ?1
                  AND op_start >= ?2
                  AND op_end   <= ?3
                "#,
                machine_id,
                start,
                end,
            )?;

            let mut downtime_hours = 0.0;
            let mut available_hours = total_hours;
            if adjusted {
                downtime_hours = Self::sum_interval_hours(
                    &conn,
                    r#"
                    SELECT dt_start, dt_end
                    FROM downtime_events
                    WHERE machine_id = ?1
                      AND dt_start >= ?2
                      AND dt_end   <= ?3
                    "#,
                    machine_id,
                    start,
                    end,
                )?;
                available_hours = (total_hours - downtime_hours).max(0.0);
            }

            let utilization = if available_hours > 0.0 {
                runtime_hours / available_hours
            } else {
                0.0
            };

            results.push(MachineUtilization {
                machine_id,
                machine_name,
                runtime_hours: round_hours(runtime_hours),
                available_hours: round_hours(available_hours),
                downtime_hours: round_hours(downtime_hours),
                utilization: round_ratio(utilization),
            });
        }

        Ok(results)
    }

    /// 窗口内完整包含区间的小时合计（倒置区间按 0 计）
    fn sum_interval_hours(
        conn: &Connection,
        sql: &str,
        machine_id: i64,
        start: &str,
        end: &str,
    ) -> RepositoryResult<f64> {
        let mut stmt = conn.prepare(sql)?;
        let intervals = stmt
            .query_map(params![machine_id, start, end], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        let mut hours = 0.0;
        for (s, e) in intervals {
            hours += duration_hours(parse_instant(&s)?, parse_instant(&e)?);
        }
        Ok(hours)
    }

    /// 无产出工单
    ///
    /// 范围限定为 released / planned / delayed / in_progress 且无任何工序记录；
    /// completed / cancelled 视为已关闭，无论是否有工序都不参与此检查
    pub fn work_orders_no_production(&self) -> RepositoryResult<Vec<PendingWorkOrder>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT w.id,
                   p.name AS product,
                   w.status,
                   w.planned_start,
                   w.planned_end,
                   w.planned_qty
            FROM work_orders w
            JOIN products p ON p.id = w.product_id
            LEFT JOIN operations o ON o.work_order_id = w.id
            WHERE w.status IN ('released','planned','delayed','in_progress')
              AND o.id IS NULL
            ORDER BY w.planned_start
            "#,
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok(PendingWorkOrder {
                    id: row.get(0)?,
                    product: row.get(1)?,
                    status: status_from_column(2, row.get(2)?)?,
                    planned_start: row.get(3)?,
                    planned_end: row.get(4)?,
                    planned_qty: row.get(5)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(rows)
    }

    /// 废品驱动因素（按产品或按机台）
    ///
    /// 内连接: 窗口内无工序的实体不出现；
    /// 与利用率查询的补零口径不同，不要统一两者
    pub fn top_scrap_by(
        &self,
        dimension: ScrapDimension,
        start: &str,
        end: &str,
    ) -> RepositoryResult<Vec<ScrapDriver>> {
        tracing::debug!(%dimension, start, end, "查询废品驱动因素");
        let sql = match dimension {
            ScrapDimension::Product => {
                r#"
                SELECT p.name AS name,
                       COALESCE(SUM(o.scrap_qty), 0) AS scrap_qty,
                       COALESCE(SUM(o.good_qty + o.scrap_qty), 0) AS total_qty,
                       CASE
                         WHEN COALESCE(SUM(o.good_qty + o.scrap_qty), 0) = 0 THEN 0.0
                         ELSE CAST(SUM(o.scrap_qty) AS REAL) / SUM(o.good_qty + o.scrap_qty)
                       END AS scrap_rate
                FROM products p
                JOIN work_orders w ON w.product_id = p.id
                JOIN operations o  ON o.work_order_id = w.id
                WHERE o.op_start >= ?1
                  AND o.op_end   <= ?2
                GROUP BY p.name
                ORDER BY scrap_qty DESC, scrap_rate DESC
                "#
            }
            ScrapDimension::Machine => {
                r#"
                SELECT m.name AS name,
                       COALESCE(SUM(o.scrap_qty), 0) AS scrap_qty,
                       COALESCE(SUM(o.good_qty + o.scrap_qty), 0) AS total_qty,
                       CASE
                         WHEN COALESCE(SUM(o.good_qty + o.scrap_qty), 0) = 0 THEN 0.0
                         ELSE CAST(SUM(o.scrap_qty) AS REAL) / SUM(o.good_qty + o.scrap_qty)
                       END AS scrap_rate
                FROM machines m
                JOIN operations o ON o.machine_id = m.id
                WHERE o.op_start >= ?1
                  AND o.op_end   <= ?2
                GROUP BY m.name
                ORDER BY scrap_qty DESC, scrap_rate DESC
                "#
            }
        };

        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map(params![start, end], |row| {
                Ok(ScrapDriver {
                    name: row.get(0)?,
                    scrap_qty: row.get(1)?,
                    total_qty: row.get(2)?,
                    scrap_rate: row.get(3)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(rows)
    }

    /// 产品汇总（按名称精确匹配）
    ///
    /// 产品不存在时返回 NotFound；统计窗口内完整包含的工序
    pub fn product_summary(
        &self,
        product_name: &str,
        start: &str,
        end: &str,
    ) -> RepositoryResult<ProductSummary> {
        let conn = self.get_conn()?;

        let product = conn.query_row(
            "SELECT id, name FROM products WHERE name = ?1",
            params![product_name],
            |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)),
        );
        let (product_id, product_name) = match product {
            Ok(v) => v,
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                return Err(RepositoryError::not_found("Product", product_name))
            }
            Err(e) => return Err(e.into()),
        };

        let (good_qty, scrap_qty): (i64, i64) = conn.query_row(
            r#"
            SELECT COALESCE(SUM(o.good_qty), 0)  AS good_qty,
                   COALESCE(SUM(o.scrap_qty), 0) AS scrap_qty
            FROM operations o
            JOIN work_orders w ON w.id = o.work_order_id
            WHERE w.product_id = ?1
              AND o.op_start >= ?2
              AND o.op_end   <= ?3
            "#,
            params![product_id, start, end],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let num_orders: i64 = conn.query_row(
            r#"
            SELECT COUNT(DISTINCT w.id)
            FROM work_orders w
            JOIN operations o ON o.work_order_id = w.id
            WHERE w.product_id = ?1
              AND o.op_start >= ?2
              AND o.op_end   <= ?3
            "#,
            params![product_id, start, end],
            |row| row.get(0),
        )?;

        Ok(ProductSummary {
            product_id,
            product_name,
            good_qty,
            scrap_qty,
            num_orders,
        })
    }
}
