//! Deadline scheduling on identical parallel machines.
//!
//! Every task must finish by its deadline and every machine processes its
//! queue contiguously. Among feasible assignments the crate prefers the one
//! whose machines start as late as possible: schedules are ranked by their
//! ascending-sorted start-time vectors, compared component-wise.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Task`, `Machine`, `MachineSchedule`,
//!   `Schedule`, `Assignment`, and the start-time comparator
//! - **`scheduler`**: Constructive builders (list heuristic, certified greedy
//!   construction, combinatorial refinement, heuristic repertoire) and the
//!   fallback chain over them; `ScheduleKpi`
//! - **`bnb`**: Exact branch-and-bound solver
//! - **`validation`**: Input integrity checks and schedule feasibility
//! - **`config`**: Tuning parameters shared by the builders
//! - **`error`**: Infeasibility reasons and precondition errors
//!
//! # Example
//!
//! ```
//! use u_deadline::models::{Machine, Task};
//! use u_deadline::{build_optimal_schedule, build_with_primary_then_heuristics};
//!
//! let tasks = vec![
//!     Task::new(1, "Mill", 30, 120),
//!     Task::new(2, "Drill", 20, 100),
//!     Task::new(3, "Deburr", 10, 120),
//! ];
//! let machines = Machine::numbered(2);
//!
//! let fast = build_with_primary_then_heuristics(&tasks, &machines, None);
//! let exact = build_optimal_schedule(&tasks, &machines);
//! assert!(fast.is_feasible());
//! assert_ne!(exact.compare(&fast), Ok(std::cmp::Ordering::Less));
//! ```
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"
//! - Brucker (2007), "Scheduling Algorithms"
//! - Blazewicz et al. (2019), "Handbook on Scheduling"

pub mod bnb;
pub mod config;
pub mod error;
pub mod models;
pub mod scheduler;
pub mod validation;

pub use bnb::build_optimal_schedule;
pub use config::SchedulerConfig;
pub use error::{Construction, Infeasible};
pub use scheduler::{
    build_schedule, build_with_primary_then_heuristics, combinatorial_construct,
    heuristic_strategy_1, heuristic_strategy_2, heuristic_strategy_3, primary_construct,
    Scheduler,
};
