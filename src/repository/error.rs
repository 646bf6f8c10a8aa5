// ==========================================
// 制造跟踪数据平台 - 仓储层错误类型
// ==========================================
// 错误分级:
// - Validation: 调用方参数违反前置条件，必须在任何写入之前抛出
// - NotFound:   引用的实体（按 id 或名称）不存在
// - Format:     时间戳字符串不符合固定格式
// - 数据库错误: 原样透传，不做二次解释
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 仓储层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== 数据质量错误 =====
    #[error("参数校验失败: {0}")]
    Validation(String),

    #[error("时间戳格式错误: '{value}' 不符合 YYYY-MM-DDTHH:MM:SSZ")]
    Format { value: String },

    // ===== 实体查找错误 =====
    #[error("记录未找到: {entity} with key={key}")]
    NotFound { entity: String, key: String },

    // ===== 数据库错误 =====
    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库锁获取失败: {0}")]
    LockError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    #[error("数据库查询失败: {0}")]
    DatabaseQueryError(String),

    #[error("唯一约束违反: {0}")]
    UniqueConstraintViolation(String),

    #[error("外键约束违反: {0}")]
    ForeignKeyViolation(String),

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RepositoryError {
    /// 构造 NotFound 错误的便捷方法
    pub fn not_found(entity: &str, key: impl ToString) -> Self {
        RepositoryError::NotFound {
            entity: entity.to_string(),
            key: key.to_string(),
        }
    }
}

// 实现 From<rusqlite::Error>
// 约束违反单独分类，其余数据库错误原样透传消息
impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(_, Some(msg)) => {
                if msg.contains("UNIQUE") {
                    RepositoryError::UniqueConstraintViolation(msg)
                } else if msg.contains("FOREIGN KEY") {
                    RepositoryError::ForeignKeyViolation(msg)
                } else {
                    RepositoryError::DatabaseQueryError(msg)
                }
            }
            rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
                entity: "Unknown".to_string(),
                key: "Unknown".to_string(),
            },
            _ => RepositoryError::DatabaseQueryError(err.to_string()),
        }
    }
}

/// Result 类型别名
pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = RepositoryError::not_found("Product", "Widget Z");
        let msg = err.to_string();
        assert!(msg.contains("Product"));
        assert!(msg.contains("Widget Z"));
    }

    #[test]
    fn test_rusqlite_error_conversion() {
        let err: RepositoryError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, RepositoryError::NotFound { .. }));
    }
}
