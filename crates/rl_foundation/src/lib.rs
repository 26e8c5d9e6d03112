// crates/rl_foundation/src/lib.rs

//! RiverLake Foundation Layer
//!
//! 基础层，提供整个项目共享的最小抽象。
//!
//! # 模块概览
//!
//! - [`error`]: 统一错误类型 `RlError`
//! - [`validation`]: 数据质量与拓扑警告报告
//! - [`units`]: 面积单位及换算
//!
//! # 示例
//!
//! ```
//! use rl_foundation::{AreaUnit, RlError, RlResult};
//!
//! fn to_km2(value: f64, unit: AreaUnit) -> RlResult<f64> {
//!     rl_foundation::ensure!(value >= 0.0, RlError::invalid_input("面积不能为负"));
//!     Ok(unit.convert(value, AreaUnit::SquareKilometre))
//! }
//!
//! assert_eq!(to_km2(1.0e6, AreaUnit::SquareMetre).unwrap(), 1.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod units;
pub mod validation;

// 重导出常用类型
pub use error::{RlError, RlResult};
pub use units::AreaUnit;
pub use validation::{ValidationReport, ValidationWarning};

/// 条件不满足时提前返回错误
///
/// ```
/// # use rl_foundation::{ensure, RlError, RlResult};
/// fn positive(v: f64) -> RlResult<()> {
///     ensure!(v > 0.0, RlError::invalid_input("必须为正"));
///     Ok(())
/// }
/// assert!(positive(-1.0).is_err());
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr) => {
        if !$cond {
            return Err($err.into());
        }
    };
}

/// Prelude 模块，包含常用类型
pub mod prelude {
    pub use crate::error::{RlError, RlResult};
    pub use crate::units::AreaUnit;
    pub use crate::validation::{ValidationReport, ValidationWarning};
    pub use crate::ensure;
}
