// ==========================================
// 工单写入集成测试
// ==========================================
// 测试目标: 验证校验先于写入、失败时不留行、
//           新 id 严格递增、写入后可回读
// ==========================================


use mfg_tracking::logging;
use mfg_tracking::repository::{
    ReportRepository, RepositoryError, WorkOrderRepository, DEFAULT_PLANT_ID,
};
use mfg_tracking::WorkOrderStatus;
use tempfile::NamedTempFile;

fn setup_writer_db() -> (NamedTempFile, String) {
    let (temp_file, db_path) = test_helpers::create_test_db().expect("Failed to create test db");
    let conn = test_helpers::open_test_connection(&db_path).expect("Failed to open db");
    test_helpers::insert_product(&conn, 1, "Alpha").unwrap();
    test_helpers::insert_machine(&conn, 1, "M-1").unwrap();
    (temp_file, db_path)
}

// ==========================================
// create_work_order
// ==========================================

#[test]
fn test_create_work_order_success_and_readback() {
    logging::init_test();
    let (_temp_file, db_path) = setup_writer_db();
    let repo = WorkOrderRepository::new(&db_path).expect("Failed to create repo");

    let id = repo
        .create_work_order(1, 220, "2025-12-12T08:00:00Z", "2025-12-12T16:00:00Z", Some(1))
        .expect("create failed");

    let order = repo
        .find_by_id(id)
        .expect("find failed")
        .expect("order not found after create");
    assert_eq!(order.status, WorkOrderStatus::Planned);
    assert_eq!(order.product_id, 1);
    assert_eq!(order.plant_id, DEFAULT_PLANT_ID);
    assert_eq!(order.planned_qty, 220);
    assert_eq!(order.machine_id, Some(1));

    // 新 id 严格递增
    let id2 = repo
        .create_work_order(1, 50, "2025-12-13T08:00:00Z", "2025-12-13T16:00:00Z", None)
        .expect("second create failed");
    assert!(id2 > id);
}

#[test]
fn test_create_work_order_without_machine() {
    let (_temp_file, db_path) = setup_writer_db();
    let repo = WorkOrderRepository::new(&db_path).expect("Failed to create repo");

    let id = repo
        .create_work_order(1, 10, "2025-12-12T08:00:00Z", "2025-12-12T16:00:00Z", None)
        .expect("create failed");
    let order = repo.find_by_id(id).unwrap().unwrap();
    assert_eq!(order.machine_id, None);
}

#[test]
fn test_create_work_order_rejects_non_positive_qty() {
    let (_temp_file, db_path) = setup_writer_db();
    let repo = WorkOrderRepository::new(&db_path).expect("Failed to create repo");

    for qty in [0, -5] {
        let result =
            repo.create_work_order(1, qty, "2025-12-12T08:00:00Z", "2025-12-12T16:00:00Z", None);
        assert!(matches!(result, Err(RepositoryError::Validation(_))));
    }
}

#[test]
fn test_create_work_order_rejects_inverted_window() {
    let (_temp_file, db_path) = setup_writer_db();
    let repo = WorkOrderRepository::new(&db_path).expect("Failed to create repo");

    // 起止相等
    let result =
        repo.create_work_order(1, 10, "2025-12-12T08:00:00Z", "2025-12-12T08:00:00Z", None);
    assert!(matches!(result, Err(RepositoryError::Validation(_))));

    // 起晚于止
    let result =
        repo.create_work_order(1, 10, "2025-12-12T16:00:00Z", "2025-12-12T08:00:00Z", None);
    assert!(matches!(result, Err(RepositoryError::Validation(_))));
}

#[test]
fn test_create_work_order_unknown_references() {
    let (_temp_file, db_path) = setup_writer_db();
    let repo = WorkOrderRepository::new(&db_path).expect("Failed to create repo");

    let result =
        repo.create_work_order(999, 10, "2025-12-12T08:00:00Z", "2025-12-12T16:00:00Z", None);
    match result {
        Err(RepositoryError::NotFound { entity, .. }) => assert_eq!(entity, "Product"),
        other => panic!("Expected NotFound, got {:?}", other.map(|_| ())),
    }

    let result =
        repo.create_work_order(1, 10, "2025-12-12T08:00:00Z", "2025-12-12T16:00:00Z", Some(999));
    match result {
        Err(RepositoryError::NotFound { entity, .. }) => assert_eq!(entity, "Machine"),
        other => panic!("Expected NotFound, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_create_work_order_failure_leaves_no_row() {
    let (_temp_file, db_path) = setup_writer_db();
    let repo = WorkOrderRepository::new(&db_path).expect("Failed to create repo");

    let _ = repo.create_work_order(999, 10, "2025-12-12T08:00:00Z", "2025-12-12T16:00:00Z", None);
    let _ = repo.create_work_order(1, 0, "2025-12-12T08:00:00Z", "2025-12-12T16:00:00Z", None);
    let _ = repo.create_work_order(1, 10, "2025-12-12T16:00:00Z", "2025-12-12T08:00:00Z", None);

    let conn = test_helpers::open_test_connection(&db_path).expect("Failed to open db");
    let count = test_helpers::count_rows(&conn, "work_orders").expect("count failed");
    assert_eq!(count, 0, "校验失败不得留下任何工单行");
}

#[test]
fn test_open_failure_maps_to_connection_error() {
    // 父目录不存在，打开必然失败
    let result = WorkOrderRepository::new("/nonexistent-dir/mfg-tracking/writer.db");
    match result {
        Err(RepositoryError::DatabaseConnectionError(_)) => {}
        other => panic!(
            "Expected DatabaseConnectionError, got {:?}",
            other.map(|_| ())
        ),
    }
}

// ==========================================
// add_production_record
// ==========================================

#[test]
fn test_add_production_record_success() {
    let (_temp_file, db_path) = setup_writer_db();
    let repo = WorkOrderRepository::new(&db_path).expect("Failed to create repo");

    let wo_id = repo
        .create_work_order(1, 100, "2025-12-12T08:00:00Z", "2025-12-12T16:00:00Z", Some(1))
        .expect("create failed");

    let op_id = repo
        .add_production_record(
            wo_id,
            1,
            "2025-12-12T08:00:00Z",
            "2025-12-12T12:00:00Z",
            110,
            4,
            Some("D01"),
        )
        .expect("add failed");
    assert!(op_id > 0);

    let op = repo
        .find_operation_by_id(op_id)
        .expect("find failed")
        .expect("operation not found after insert");
    assert_eq!(op.work_order_id, wo_id);
    assert_eq!(op.machine_id, 1);
    assert_eq!(op.good_qty, 110);
    assert_eq!(op.scrap_qty, 4);
    assert_eq!(op.defect_code.as_deref(), Some("D01"));
}

#[test]
fn test_add_production_record_unknown_references() {
    let (_temp_file, db_path) = setup_writer_db();
    let repo = WorkOrderRepository::new(&db_path).expect("Failed to create repo");

    let wo_id = repo
        .create_work_order(1, 100, "2025-12-12T08:00:00Z", "2025-12-12T16:00:00Z", None)
        .expect("create failed");

    let result = repo.add_production_record(
        999, 1, "2025-12-12T08:00:00Z", "2025-12-12T12:00:00Z", 10, 0, None,
    );
    match result {
        Err(RepositoryError::NotFound { entity, .. }) => assert_eq!(entity, "WorkOrder"),
        other => panic!("Expected NotFound, got {:?}", other.map(|_| ())),
    }

    let result = repo.add_production_record(
        wo_id, 999, "2025-12-12T08:00:00Z", "2025-12-12T12:00:00Z", 10, 0, None,
    );
    match result {
        Err(RepositoryError::NotFound { entity, .. }) => assert_eq!(entity, "Machine"),
        other => panic!("Expected NotFound, got {:?}", other.map(|_| ())),
    }

    let conn = test_helpers::open_test_connection(&db_path).expect("Failed to open db");
    let count = test_helpers::count_rows(&conn, "operations").expect("count failed");
    assert_eq!(count, 0, "校验失败不得留下任何工序行");
}

#[test]
fn test_add_production_record_accepts_inverted_interval() {
    // 写入时不校验 op_start/op_end 先后关系；
    // 下游时长运算对倒置区间按 0 计，聚合不受污染
    let (_temp_file, db_path) = setup_writer_db();
    let writer = WorkOrderRepository::new(&db_path).expect("Failed to create repo");

    let wo_id = writer
        .create_work_order(1, 100, "2026-01-01T00:00:00Z", "2026-01-02T00:00:00Z", Some(1))
        .expect("create failed");
    writer
        .add_production_record(
            wo_id,
            1,
            "2026-01-01T12:00:00Z",
            "2026-01-01T06:00:00Z",
            10,
            0,
            None,
        )
        .expect("inverted interval should be accepted at write time");

    let reports = ReportRepository::new(&db_path).expect("Failed to create repo");
    let rows = reports
        .machine_utilization("2026-01-01T00:00:00Z", "2026-01-02T00:00:00Z", false)
        .expect("utilization failed");
    assert_eq!(rows[0].runtime_hours, 0.0);
}
