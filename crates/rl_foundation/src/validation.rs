// crates/rl_foundation/src/validation.rs

//! 运行时验证工具
//!
//! 非致命问题的汇总报告，供输入检查和拓扑检查共用。
//! 致命问题走各 crate 的错误类型，不进入报告。
//!
//! # 示例
//!
//! ```
//! use rl_foundation::validation::{ValidationReport, ValidationWarning};
//!
//! let mut report = ValidationReport::new();
//! report.add_warning(ValidationWarning::DataQuality {
//!     layer: "lakes",
//!     element_id: Some(42),
//!     message: "exorheic 值无法解析，按内流湖处理".into(),
//! });
//! assert!(report.has_warnings());
//! assert_eq!(report.warning_count(), 1);
//! ```

use std::fmt;

/// 验证报告
#[derive(Debug, Default, Clone)]
pub struct ValidationReport {
    /// 警告列表
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    /// 创建空的验证报告
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加警告
    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// 是否有警告
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// 警告数量
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// 合并另一个报告
    pub fn merge(&mut self, other: ValidationReport) {
        self.warnings.extend(other.warnings);
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "验证报告:")?;
        writeln!(f, "  警告: {} 个", self.warning_count())?;

        if self.has_warnings() {
            writeln!(f, "\n警告详情:")?;
            for (i, warn) in self.warnings.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, warn)?;
            }
        }

        Ok(())
    }
}

/// 验证警告类型
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationWarning {
    /// 数据质量问题，处理按默认值继续
    DataQuality {
        /// 图层名
        layer: &'static str,
        /// 可选的要素标识
        element_id: Option<i64>,
        /// 描述
        message: String,
    },
    /// 拓扑可疑但不致命
    Topology {
        /// 要素标识
        element_id: i64,
        /// 描述
        message: String,
    },
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DataQuality {
                layer,
                element_id: Some(id),
                message,
            } => write!(f, "图层{} 要素{}: {}", layer, id, message),
            Self::DataQuality {
                layer,
                element_id: None,
                message,
            } => write!(f, "图层{}: {}", layer, message),
            Self::Topology { element_id, message } => {
                write!(f, "要素{}: {}", element_id, message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_counts_and_merge() {
        let mut a = ValidationReport::new();
        a.add_warning(ValidationWarning::DataQuality {
            layer: "lakes",
            element_id: None,
            message: "未知湖泊 904".into(),
        });
        let mut b = ValidationReport::new();
        b.add_warning(ValidationWarning::Topology {
            element_id: 7,
            message: "近零长度连接段".into(),
        });

        a.merge(b);
        assert_eq!(a.warning_count(), 2);

        let text = a.to_string();
        assert!(text.contains("图层lakes: 未知湖泊 904"));
        assert!(text.contains("要素7"));
    }
}
