//! Dine Engine - wave-based order orchestration for dine-in tables
//!
//! # 模块结构
//!
//! ```text
//! dine-engine/
//! ├── wave          # 波次解析 (explicit > "Wave N" tag > category > 1)
//! ├── store         # 会话本地状态 (seats, shared items, bill)
//! ├── progress      # 波次聚合状态 / next fireable wave
//! ├── optimistic    # plan → apply → settle
//! ├── engine        # TableEngine (one per table)
//! ├── transitions   # submit / fire / advance / serve / void / waves
//! ├── seats         # add / remove / rename seats
//! ├── session       # ensure / refresh / close
//! ├── delay_watch   # 厨房延迟轮询任务
//! └── floor         # FloorEngine (table registry)
//! ```

pub mod config;
pub mod delay_watch;
pub mod engine;
pub mod error;
pub mod floor;
pub mod logger;
pub mod optimistic;
pub mod order_cache;
pub mod progress;
pub mod seats;
pub mod session;
pub mod store;
pub mod transitions;
pub mod wave;

#[cfg(test)]
mod tests;

pub use config::EngineConfig;
pub use engine::TableEngine;
pub use error::{Action, EngineError, EngineResult, Notice};
pub use floor::FloorEngine;
pub use progress::{MealProgress, WaveProgress};
pub use session::CloseOutcome;
pub use store::{ItemPlace, SessionStore};
pub use transitions::{AdvanceOutcome, FireOutcome, ItemChange, SubmitOutcome};
