// crates/rl_foundation/src/units.rs

//! 面积单位
//!
//! 河段、子流域和湖泊图层的面积字段可能使用不同单位，
//! 摄入阶段统一换算到子流域图层的单位。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::RlError;

/// 面积单位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AreaUnit {
    /// 平方米
    #[serde(rename = "m2")]
    SquareMetre,
    /// 公顷
    #[serde(rename = "ha")]
    Hectare,
    /// 平方千米
    #[default]
    #[serde(rename = "km2")]
    SquareKilometre,
}

impl AreaUnit {
    /// 所有支持的单位
    pub const ALL: [AreaUnit; 3] = [Self::SquareMetre, Self::Hectare, Self::SquareKilometre];

    /// 一个单位对应的平方米数
    #[inline]
    pub const fn square_metres(self) -> f64 {
        match self {
            Self::SquareMetre => 1.0,
            Self::Hectare => 1.0e4,
            Self::SquareKilometre => 1.0e6,
        }
    }

    /// 从 `self` 换算到 `to` 的乘数
    #[inline]
    pub fn factor_to(self, to: AreaUnit) -> f64 {
        self.square_metres() / to.square_metres()
    }

    /// 将 `value` 从 `self` 换算到 `to`
    #[inline]
    pub fn convert(self, value: f64, to: AreaUnit) -> f64 {
        if self == to {
            value
        } else {
            value * self.factor_to(to)
        }
    }

    /// 单位符号
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::SquareMetre => "m2",
            Self::Hectare => "ha",
            Self::SquareKilometre => "km2",
        }
    }
}

impl fmt::Display for AreaUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for AreaUnit {
    type Err = RlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "m2" | "m²" | "sqm" => Ok(Self::SquareMetre),
            "ha" | "hectare" => Ok(Self::Hectare),
            "km2" | "km²" | "sqkm" => Ok(Self::SquareKilometre),
            other => Err(RlError::invalid_config(
                "area_unit",
                other,
                "支持的单位: m2, ha, km2",
            )),
        }
    }
}
