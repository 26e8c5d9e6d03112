// crates/rl_network/src/lib.rs

//! RiverLake 网络层
//!
//! 河段网络是以 `next` 指针隐式表示的单下游森林。本层把可解析湖泊
//! 嵌入该网络，并重算上游面积和直接上游。
//!
//! # 模块
//!
//! - `types`: 河段、子流域、湖泊与下游指针
//! - `graph`: 稠密槽位汇流图
//! - `accumulate`: Kahn 序上游面积累积（带环检测）
//! - `upstream`: 直接上游索引 `up1..upK`
//! - `resolvable`: 可解析湖泊过滤
//! - `shrink`: 湖泊覆盖后的面积/长度收缩
//! - `rewrite`: 湖泊节点插入与拓扑重写
//! - `checker`: 拓扑不变量检查
//! - `pipeline`: 过滤 → 重写 → 检查
//!
//! # 示例
//!
//! ```
//! use rl_network::prelude::*;
//!
//! let ids = [1, 2, 3];
//! let next = [Downstream::To(3), Downstream::To(3), Downstream::Terminal];
//! let up = accumulate(&ids, &next, &[Some(1.0), Some(2.0), Some(0.5)]).unwrap();
//! assert_eq!(up[2], 3.5);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod accumulate;
pub mod checker;
pub mod error;
pub mod graph;
pub mod pipeline;
pub mod resolvable;
pub mod rewrite;
pub mod shrink;
pub mod types;
pub mod upstream;

/// 预导入模块
pub mod prelude {
    pub use crate::accumulate::{accumulate, accumulate_uparea};
    pub use crate::checker::{check_topology, CheckOptions, TopologyReport};
    pub use crate::error::{NetworkError, NetworkResult};
    pub use crate::graph::DrainageGraph;
    pub use crate::pipeline::{burn_lakes, BurnOptions, BurnOutcome};
    pub use crate::resolvable::{filter_resolvable_lakes, FilterStats, ResolvableLakes};
    pub use crate::rewrite::{rewrite, RewriteOutcome};
    pub use crate::types::{
        Catchment, Downstream, Lake, LakeNode, ReachId, Segment, SegmentGeometry,
        TERMINAL_SENTINEL,
    };
    pub use crate::upstream::UpstreamIndex;
}

// 重导出常用类型
pub use error::{NetworkError, NetworkResult};
pub use pipeline::{burn_lakes, BurnOptions, BurnOutcome};
pub use types::{Catchment, Downstream, Lake, LakeNode, ReachId, Segment, SegmentGeometry};
