// ==========================================
// 制造跟踪数据平台 - 时间与区间工具
// ==========================================
// 约定:
// - 所有时间戳为 UTC ISO-8601 字符串: YYYY-MM-DDTHH:MM:SSZ
// - 同一字符串既按字典序参与 SQL 范围过滤，又在此处解析为秒级时刻
//   参与时长运算，两种表示必须一致（固定宽度格式保证这一点）
// ==========================================

use chrono::NaiveDateTime;

use crate::repository::error::{RepositoryError, RepositoryResult};

/// 时间戳固定格式（UTC，秒级精度）
pub const INSTANT_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// 解析固定格式的 UTC 时间戳为 epoch 秒
///
/// 严格解析：任何偏离固定格式的输入返回 Format 错误
pub fn parse_instant(s: &str) -> RepositoryResult<i64> {
    let dt = NaiveDateTime::parse_from_str(s, INSTANT_FORMAT)
        .map_err(|_| RepositoryError::Format {
            value: s.to_string(),
        })?;
    Ok(dt.and_utc().timestamp())
}

/// 区间时长（小时），负区间夹到 0
///
/// 约束: 倒置的工序记录不得向聚合结果贡献负时长
pub fn duration_hours(start_epoch: i64, end_epoch: i64) -> f64 {
    let seconds = (end_epoch - start_epoch).max(0);
    seconds as f64 / 3600.0
}

/// 统计窗口的原始时长（小时），不做夹取
///
/// 窗口边界由调用方字面量给出，不属于用户数据，此处不修正
pub fn hours_between(start_epoch: i64, end_epoch: i64) -> f64 {
    (end_epoch - start_epoch) as f64 / 3600.0
}

/// 小时值统一保留 2 位小数
pub fn round_hours(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// 利用率统一保留 4 位小数
pub fn round_ratio(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_instant_valid() {
        let t = parse_instant("2025-12-07T00:00:00Z").expect("parse failed");
        // 2025-12-07 00:00:00 UTC
        assert_eq!(t, 1765065600);
    }

    #[test]
    fn test_parse_instant_rejects_bad_format() {
        // 缺少 Z 后缀
        assert!(parse_instant("2025-12-07T00:00:00").is_err());
        // 空格分隔符
        assert!(parse_instant("2025-12-07 00:00:00Z").is_err());
        // 纯日期
        assert!(parse_instant("2025-12-07").is_err());
        // 尾部多余字符
        assert!(parse_instant("2025-12-07T00:00:00Zxx").is_err());

        match parse_instant("not-a-timestamp") {
            Err(RepositoryError::Format { value }) => assert_eq!(value, "not-a-timestamp"),
            other => panic!("Expected Format error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_duration_hours_clamps_negative() {
        let s = parse_instant("2025-12-07T10:00:00Z").unwrap();
        let e = parse_instant("2025-12-07T16:30:00Z").unwrap();
        assert_eq!(duration_hours(s, e), 6.5);
        // 倒置区间贡献 0，而不是负值
        assert_eq!(duration_hours(e, s), 0.0);
    }

    #[test]
    fn test_hours_between_no_clamp() {
        let s = parse_instant("2025-12-07T00:00:00Z").unwrap();
        let e = parse_instant("2025-12-09T00:00:00Z").unwrap();
        assert_eq!(hours_between(s, e), 48.0);
        assert_eq!(hours_between(e, s), -48.0);
    }

    #[test]
    fn test_rounding() {
        assert_eq!(round_hours(6.4999), 6.5);
        assert_eq!(round_ratio(18.0 / 42.0), 0.4286);
        assert_eq!(round_ratio(18.0 / 48.0), 0.375);
    }
}
