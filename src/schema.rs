// ==========================================
// 制造跟踪数据平台 - 建库与演示数据
// ==========================================
// 职责: 应用 schema DDL、灌入演示数据
// 说明: 属于一次性初始化，不属于核心运行时契约
// 约束: operations 的 op_start/op_end 先后关系在写入时不做约束，
//       由下游时长运算负责夹取（已知取舍）
// ==========================================

use rusqlite::Connection;

use crate::repository::error::RepositoryResult;

/// 应用数据库 schema（幂等）
pub fn apply_schema(conn: &Connection) -> RepositoryResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS plants (
          id INTEGER PRIMARY KEY,
          name TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS products (
          id INTEGER PRIMARY KEY,
          name TEXT NOT NULL UNIQUE CHECK (length(name) > 0)
        );

        CREATE TABLE IF NOT EXISTS machines (
          id INTEGER PRIMARY KEY,
          name TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS work_orders (
          id INTEGER PRIMARY KEY,
          product_id INTEGER NOT NULL REFERENCES products(id),
          plant_id INTEGER NOT NULL REFERENCES plants(id),
          planned_qty INTEGER NOT NULL CHECK (planned_qty > 0),
          status TEXT NOT NULL CHECK (status IN
            ('planned','released','delayed','in_progress','completed','cancelled')),
          planned_start TEXT NOT NULL,
          planned_end TEXT NOT NULL,
          machine_id INTEGER REFERENCES machines(id),
          CHECK (planned_start < planned_end)
        );

        CREATE TABLE IF NOT EXISTS operations (
          id INTEGER PRIMARY KEY,
          work_order_id INTEGER NOT NULL REFERENCES work_orders(id),
          machine_id INTEGER NOT NULL REFERENCES machines(id),
          op_start TEXT NOT NULL,
          op_end TEXT NOT NULL,
          good_qty INTEGER NOT NULL DEFAULT 0 CHECK (good_qty >= 0),
          scrap_qty INTEGER NOT NULL DEFAULT 0 CHECK (scrap_qty >= 0),
          defect_code TEXT
        );

        CREATE TABLE IF NOT EXISTS downtime_events (
          machine_id INTEGER NOT NULL REFERENCES machines(id),
          dt_start TEXT NOT NULL,
          dt_end TEXT NOT NULL,
          CHECK (dt_start < dt_end)
        );

        CREATE INDEX IF NOT EXISTS idx_work_orders_status
          ON work_orders(status);
        CREATE INDEX IF NOT EXISTS idx_operations_work_order
          ON operations(work_order_id);
        CREATE INDEX IF NOT EXISTS idx_operations_machine_window
          ON operations(machine_id, op_start, op_end);
        CREATE INDEX IF NOT EXISTS idx_downtime_machine_window
          ON downtime_events(machine_id, dt_start, dt_end);
        "#,
    )?;
    Ok(())
}

/// 判断演示数据是否已灌入（以 products 表是否为空为准）
pub fn is_seeded(conn: &Connection) -> RepositoryResult<bool> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM products", [], |row| row.get(0))?;
    Ok(count > 0)
}

/// 灌入演示数据集
///
/// 数据覆盖: 三个产品、三台机台（其中一台无任何工序）、
/// 各状态工单、2025-11/2025-12 两个月的工序记录、停机事件
pub fn seed_demo_data(conn: &Connection) -> RepositoryResult<()> {
    conn.execute_batch(
        r#"
        INSERT INTO plants (id, name) VALUES (1, 'Plant 1');

        INSERT INTO products (id, name) VALUES
          (1, 'Widget A'),
          (2, 'Widget B'),
          (3, 'Widget C');

        INSERT INTO machines (id, name) VALUES
          (1, 'CNC-1'),
          (2, 'CNC-2'),
          (3, 'Press-1');

        INSERT INTO work_orders
          (id, product_id, plant_id, planned_qty, status, planned_start, planned_end, machine_id)
        VALUES
          (1, 1, 1, 100, 'completed',   '2025-12-07T06:00:00Z', '2025-12-07T18:00:00Z', 1),
          (2, 1, 1,  80, 'in_progress', '2025-12-08T06:00:00Z', '2025-12-09T18:00:00Z', 2),
          (3, 1, 1,  60, 'released',    '2025-12-09T06:00:00Z', '2025-12-10T18:00:00Z', 1),
          (4, 2, 1, 120, 'in_progress', '2025-12-08T00:00:00Z', '2025-12-09T23:00:00Z', 2),
          (5, 2, 1,  90, 'planned',     '2025-12-12T08:00:00Z', '2025-12-12T16:00:00Z', NULL),
          (6, 3, 1,  50, 'cancelled',   '2025-12-05T08:00:00Z', '2025-12-06T16:00:00Z', 3);

        INSERT INTO operations
          (id, work_order_id, machine_id, op_start, op_end, good_qty, scrap_qty, defect_code)
        VALUES
          (1, 1, 1, '2025-12-07T06:00:00Z', '2025-12-07T12:00:00Z', 70,  5, NULL),
          (2, 1, 1, '2025-12-07T12:00:00Z', '2025-12-07T18:00:00Z', 60,  8, 'D01'),
          (3, 2, 2, '2025-12-08T08:00:00Z', '2025-12-08T14:00:00Z', 40,  4, NULL),
          (4, 3, 1, '2025-12-09T06:00:00Z', '2025-12-09T12:00:00Z', 30,  3, NULL),
          (5, 4, 2, '2025-12-08T15:00:00Z', '2025-12-08T21:00:00Z', 90, 15, 'D02'),
          (6, 2, 2, '2025-11-28T08:00:00Z', '2025-11-28T12:00:00Z', 10,  1, NULL);

        INSERT INTO downtime_events (machine_id, dt_start, dt_end) VALUES
          (1, '2025-12-08T00:00:00Z', '2025-12-08T06:00:00Z'),
          (2, '2025-12-07T22:00:00Z', '2025-12-08T01:00:00Z');
        "#,
    )?;
    Ok(())
}
