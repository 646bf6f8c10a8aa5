// ==========================================
// 制造跟踪数据平台 - 演示入口
// ==========================================
// 职责: 建库灌数后依次演示全部报表查询与写入操作，打印结果
// 说明: 仅为展示层，不承载核心语义；写入失败捕获后打印，不中断演示
// ==========================================

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use serde::Serialize;

use mfg_tracking::repository::{ReportRepository, WorkOrderRepository};
use mfg_tracking::{db, logging, schema, ScrapDimension};

/// 默认数据库位置: 用户数据目录下 mfg-tracking/manufacturing.db
fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mfg-tracking")
        .join("manufacturing.db")
}

fn print_header(text: &str) {
    println!("\n{}", "=".repeat(80));
    println!("{}", text);
    println!("{}", "=".repeat(80));
}

fn print_rows<T: Serialize>(rows: &[T]) {
    if rows.is_empty() {
        println!("(无结果)");
        return;
    }
    for row in rows {
        match serde_json::to_string(row) {
            Ok(json) => println!("{}", json),
            Err(e) => println!("(序列化失败: {})", e),
        }
    }
}

fn main() -> anyhow::Result<()> {
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{} - 演示程序", mfg_tracking::APP_NAME);
    tracing::info!("系统版本: {}", mfg_tracking::VERSION);
    tracing::info!("==================================================");

    // 数据库路径: 第一个命令行参数，缺省为用户数据目录
    let db_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(default_db_path);
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("无法创建数据目录: {}", parent.display()))?;
    }
    let db_path_str = db_path.to_string_lossy().to_string();
    tracing::info!("使用数据库: {}", db_path_str);

    // 建库 + 灌入演示数据（仅首次）
    let conn = db::open_sqlite_connection(&db_path_str)
        .with_context(|| format!("无法打开数据库: {}", db_path_str))?;
    schema::apply_schema(&conn)?;
    if !schema::is_seeded(&conn)? {
        tracing::info!("空库，灌入演示数据");
        schema::seed_demo_data(&conn)?;
    }

    let conn = Arc::new(Mutex::new(conn));
    let reports = ReportRepository::from_connection(Arc::clone(&conn));
    let writer = WorkOrderRepository::from_connection(conn);

    // ---------------------------
    // 报表查询
    // ---------------------------

    print_header("[1] 按月产品产出 (2025-12)");
    print_rows(&reports.product_output_by_month("2025-12")?);

    print_header("[2] 在制工单 @ 2025-12-09T12:00:00Z");
    print_rows(&reports.list_wip("2025-12-09T12:00:00Z")?);

    print_header("[3] 机台利用率（简单口径）[2025-12-07 .. 2025-12-09]");
    print_rows(&reports.machine_utilization(
        "2025-12-07T00:00:00Z",
        "2025-12-09T23:59:59Z",
        false,
    )?);

    print_header("[4] 机台利用率（扣除停机）[2025-12-07 .. 2025-12-09]");
    print_rows(&reports.machine_utilization(
        "2025-12-07T00:00:00Z",
        "2025-12-09T23:59:59Z",
        true,
    )?);

    print_header("[5] 无产出工单");
    print_rows(&reports.work_orders_no_production()?);

    print_header("[6A] 废品驱动因素·按产品 [2025-12-07 .. 2025-12-09]");
    print_rows(&reports.top_scrap_by(
        ScrapDimension::Product,
        "2025-12-07T00:00:00Z",
        "2025-12-09T23:59:59Z",
    )?);

    print_header("[6B] 废品驱动因素·按机台 [2025-12-07 .. 2025-12-09]");
    print_rows(&reports.top_scrap_by(
        ScrapDimension::Machine,
        "2025-12-07T00:00:00Z",
        "2025-12-09T23:59:59Z",
    )?);

    print_header("[7] 产品汇总 'Widget A' [2025-12-07 .. 2025-12-10]");
    let summary =
        reports.product_summary("Widget A", "2025-12-07T00:00:00Z", "2025-12-10T23:59:59Z")?;
    println!("{}", serde_json::to_string(&summary)?);

    // ---------------------------
    // 写入操作（失败时打印错误，不中断演示）
    // ---------------------------

    print_header("[8] 创建工单 create_work_order(...)");
    match writer.create_work_order(
        1, // Widget A
        220,
        "2025-12-12T08:00:00Z",
        "2025-12-12T16:00:00Z",
        Some(1),
    ) {
        Ok(new_id) => {
            println!("新工单 id={}", new_id);

            print_header("[9] 追加工序记录 add_production_record(...)");
            match writer.add_production_record(
                new_id,
                1,
                "2025-12-12T08:00:00Z",
                "2025-12-12T12:00:00Z",
                110,
                4,
                None,
            ) {
                Ok(op_id) => println!("新工序记录 id={}", op_id),
                Err(e) => println!("追加工序记录失败: {}", e),
            }
        }
        Err(e) => println!("创建工单失败: {}", e),
    }

    tracing::info!("演示结束");
    Ok(())
}
