//! End-to-end scenarios through the public entry points.

use u_deadline::bnb::BranchAndBound;
use u_deadline::models::{Assignment, Machine, Task, Violation, IDLE};
use u_deadline::scheduler::ScheduleKpi;
use u_deadline::validation::{check_feasibility, is_feasible_within, validate_input};
use u_deadline::{
    build_optimal_schedule, build_schedule, build_with_primary_then_heuristics,
    combinatorial_construct, heuristic_strategy_1, heuristic_strategy_2, heuristic_strategy_3,
    primary_construct, Scheduler, SchedulerConfig,
};

const T: i64 = 1_000;

#[test]
fn test_single_task_single_machine() {
    let tasks = vec![Task::new(1, "Only", 10, T)];
    let machines = Machine::numbered(1);

    for schedule in [
        build_optimal_schedule(&tasks, &machines),
        build_with_primary_then_heuristics(&tasks, &machines, None),
        primary_construct(&tasks, &machines).unwrap(),
    ] {
        assert!(schedule.optimal);
        assert_eq!(schedule.start_times(), vec![T - 10]);
    }
    assert_eq!(build_schedule(&tasks, &machines).start_times(), vec![T - 10]);
}

#[test]
fn test_compatible_pair_shares_one_machine() {
    let tasks = vec![Task::new(1, "First", 5, T), Task::new(2, "Second", 5, T + 100)];
    let machines = Machine::numbered(1);

    for schedule in [
        build_optimal_schedule(&tasks, &machines),
        build_with_primary_then_heuristics(&tasks, &machines, None),
    ] {
        let lane = &schedule.machines[0];
        let ids: Vec<u32> = lane.tasks.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(lane.busy_time(), 10);
        assert_eq!(lane.start_time, T - 5);
        assert!(schedule.is_feasible());
    }
}

#[test]
fn test_overload_fails_explicit_check() {
    let deadline = 150;
    let tasks: Vec<Task> = (1..=3).map(|id| Task::unnamed(id, 100, deadline)).collect();
    let machines = Machine::numbered(2);

    let exact = build_optimal_schedule(&tasks, &machines);
    assert_eq!(exact.task_count(), 3);
    assert_eq!(exact.start_times(), vec![-50, 50]);

    // Without a horizon the recurrence keeps every deadline.
    assert!(check_feasibility(&exact, None).is_empty());
    // From the epoch on, one machine would have to start in the past.
    let violations = check_feasibility(&exact, Some(0));
    assert!(!is_feasible_within(&exact, Some(0)));

    // Exactly one task runs before the epoch, heading the doubled-up machine.
    let early: Vec<Assignment> = exact
        .assignments()
        .into_iter()
        .filter(|row| row.start < 0)
        .collect();
    assert_eq!(early.len(), 1);
    let head = &early[0];
    assert!((1..=3).contains(&head.task_id));
    assert_eq!((head.start, head.end), (-50, 50));
    let lane = &exact.machines[exact.machine_of(head.task_id).unwrap()];
    assert_eq!(lane.machine.id, head.machine_id);
    assert_eq!(lane.tasks.len(), 2);
    assert_eq!(lane.tasks[0].id, head.task_id);
    assert_eq!(violations, vec![Violation::start_before_horizon(head.machine_id, 50)]);

    let kpi = ScheduleKpi::calculate(&exact);
    assert!(!kpi.meets_thresholds(0, i64::MAX));
}

#[test]
fn test_degenerate_inputs() {
    let machines = Machine::numbered(3);
    let none: Vec<Task> = Vec::new();

    let exact = build_optimal_schedule(&none, &machines);
    assert!(exact.optimal);
    assert_eq!(exact.start_times(), vec![IDLE; 3]);
    let chained = build_with_primary_then_heuristics(&none, &machines, None);
    assert!(chained.optimal);
    assert_eq!(chained.engaged_count(), 0);
    for schedule in [
        build_schedule(&none, &machines),
        heuristic_strategy_1(&none, &machines, Some(10)),
        heuristic_strategy_2(&none, &machines),
        heuristic_strategy_3(&none, &machines),
    ] {
        assert_eq!(schedule.start_times(), vec![IDLE; 3]);
    }

    let tasks = vec![Task::unnamed(1, 10, 100)];
    assert!(build_optimal_schedule(&tasks, &[]).is_empty());
    assert!(build_schedule(&tasks, &[]).is_empty());
    assert!(build_with_primary_then_heuristics(&tasks, &[], None).is_empty());
}

#[test]
fn test_constructors_report_infeasibility_as_values() {
    // A tight pair plus two tasks that fit on either machine.
    let tasks = vec![
        Task::unnamed(1, 10, 10),
        Task::unnamed(2, 10, 10),
        Task::unnamed(3, 5, 15),
        Task::unnamed(4, 8, 30),
    ];
    let machines = Machine::numbered(2);

    assert!(combinatorial_construct(&tasks, 0.5, &machines).is_err());
    let resolved = combinatorial_construct(&tasks, 3.0, &machines).unwrap();
    assert!(resolved.is_feasible());
    assert_eq!(resolved.task_count(), 4);

    let chained = Scheduler::new().build(&tasks, &machines);
    let exact = build_optimal_schedule(&tasks, &machines);
    assert_eq!(exact.compare(&chained), Ok(std::cmp::Ordering::Equal));
}

#[test]
fn test_scheduler_uses_configuration() {
    let config = SchedulerConfig::new()
        .with_adjustment_border(5)
        .with_combination_border(1.0);
    assert!(config.validate().is_ok());
    let scheduler = Scheduler::with_config(config.clone());
    assert_eq!(scheduler.config(), &config);

    let tasks = vec![
        Task::unnamed(1, 30, 100),
        Task::unnamed(2, 25, 90),
        Task::unnamed(3, 10, 40),
        Task::unnamed(4, 15, 95),
    ];
    let machines = Machine::numbered(2);
    let s = scheduler.build(&tasks, &machines);
    assert!(s.is_feasible());
    assert_eq!(s.task_count(), 4);
    assert!(validate_input(&tasks, &machines).is_ok());
}

#[test]
fn test_bnb_stats() {
    let tasks: Vec<Task> = (1..=5).map(|id| Task::unnamed(id, 10 + id as i64, 60)).collect();
    let machines = Machine::numbered(2);
    let (schedule, stats) = BranchAndBound::new(&tasks, &machines).solve_with_stats();
    assert!(schedule.optimal);
    assert!(stats.records >= 1);
    assert!(stats.nodes_created >= tasks.len());
    assert!(stats.nodes_expanded >= tasks.len() - 1);
    assert!(stats.peak_queue <= tasks.len() * (2 * machines.len() - 1));
}

#[test]
fn test_timeline_serializes() {
    let tasks = vec![Task::new(1, "Cut", 10, 100), Task::new(2, "Weld", 20, 100)];
    let machines = vec![Machine::new(7, "Press")];
    let schedule = build_optimal_schedule(&tasks, &machines);

    let rows = schedule.assignments();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].machine_id, 7);
    assert_eq!(rows.last().map(|r| r.end), Some(100));

    let json = serde_json::to_string(&rows).unwrap();
    let back: Vec<Assignment> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, rows);

    let value = serde_json::to_value(&schedule).unwrap();
    assert_eq!(value["optimal"], serde_json::Value::Bool(true));
    assert_eq!(value["machines"][0]["machine"]["name"], "Press");

    let kpi = ScheduleKpi::calculate(&schedule);
    let text = serde_json::to_string(&kpi).unwrap();
    assert_eq!(serde_json::from_str::<ScheduleKpi>(&text).unwrap(), kpi);
}
