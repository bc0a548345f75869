//! Integration tests for scheduler turn semantics and statistics

mod common;
use common::scheduler;
use pledge::{Error, Future, Resolution, SchedulerStats, Value};
use std::cell::Cell;
use std::rc::Rc;

mod turns {
    use super::*;

    #[test]
    fn test_each_then_stage_costs_one_turn() {
        let scheduler = scheduler();
        let finished = Future::fulfilled(&scheduler, vec![Value::from(0)])
            .then(None, None)
            .then(None, None);

        assert_eq!(scheduler.run_turn().unwrap(), 1);
        assert!(finished.is_pending());
        assert_eq!(scheduler.run_turn().unwrap(), 1);
        assert!(finished.is_fulfilled());
        assert_eq!(scheduler.run_turn().unwrap(), 0);
    }

    #[test]
    fn test_run_to_completion_reports_work_done() {
        let scheduler = scheduler();
        Future::fulfilled(&scheduler, vec![])
            .then(None, None)
            .then(None, None)
            .then(None, None);

        let result = scheduler.run_to_completion().unwrap();
        assert_eq!(result.microtasks_processed, 3);
        assert_eq!(result.turns, 3);
    }

    #[test]
    fn test_parallel_chains_share_turns() {
        let scheduler = scheduler();
        let a = Future::fulfilled(&scheduler, vec![Value::from(1)]).then(None, None);
        let b = Future::fulfilled(&scheduler, vec![Value::from(2)]).then(None, None);

        let result = scheduler.run_to_completion().unwrap();
        assert_eq!(result.turns, 1);
        assert_eq!(result.microtasks_processed, 2);
        assert_eq!(a.value(), Some(Value::Number(1.0)));
        assert_eq!(b.value(), Some(Value::Number(2.0)));
    }

    #[test]
    fn test_turn_limit_catches_runaway_chain() {
        let scheduler = scheduler();
        scheduler.set_turn_limit(5);

        fn spin(future: Future) {
            let next = future.map(|_| Ok(Resolution::Value(Value::Undefined)));
            next.clone().on_fulfill(move |_| spin(next));
        }
        spin(Future::fulfilled(&scheduler, vec![]));

        let err = scheduler.run_to_completion().unwrap_err();
        assert!(matches!(err, Error::TurnLimitExceeded { turns: 5, .. }));
    }
}

mod stats {
    use super::*;

    #[test]
    fn test_stats_cover_futures_and_microtasks() {
        let scheduler = scheduler();
        Future::fulfilled(&scheduler, vec![Value::from(1)]).then(None, None);
        scheduler.run_to_completion().unwrap();

        let stats = scheduler.stats();
        // fulfilled() + the derived then-future
        assert_eq!(stats.futures_created, 2);
        assert_eq!(stats.futures_settled, 2);
        assert_eq!(stats.total_microtasks, 1);
        assert_eq!(stats.total_turns, 1);
    }

    #[test]
    fn test_stats_serialize_round_trip() {
        let scheduler = scheduler();
        Future::fulfilled(&scheduler, vec![]).then(None, None);
        scheduler.run_to_completion().unwrap();

        let json = serde_json::to_string(&scheduler.stats()).unwrap();
        let restored: SchedulerStats = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.total_microtasks, scheduler.stats().total_microtasks);
        assert_eq!(restored.futures_created, scheduler.stats().futures_created);
    }

    #[test]
    fn test_unhandled_rejections_counted() {
        let scheduler = scheduler();
        Future::rejected(&scheduler, Value::from("a")).end(None);
        Future::rejected(&scheduler, Value::from("b")).end(None);

        scheduler.run_to_completion().unwrap();
        assert_eq!(scheduler.stats().unhandled_rejections, 2);
        assert_eq!(
            scheduler.drain_unhandled_rejections(),
            vec![Value::from("a"), Value::from("b")]
        );
    }
}

mod budget {
    use super::*;

    #[test]
    fn test_budget_defers_excess_tasks_to_next_turn() {
        let scheduler = scheduler();
        scheduler.set_microtask_budget(1);

        let hits = Rc::new(Cell::new(0));
        for _ in 0..3 {
            let hits = hits.clone();
            scheduler.enqueue(Box::new(move || hits.set(hits.get() + 1)));
        }

        assert_eq!(scheduler.run_turn().unwrap(), 1);
        assert_eq!(hits.get(), 1);

        let result = scheduler.run_to_completion().unwrap();
        assert_eq!(result.turns, 2);
        assert_eq!(hits.get(), 3);
    }

    #[test]
    fn test_budget_is_queryable() {
        let scheduler = scheduler();
        assert_eq!(scheduler.microtask_budget(), 10_000);
        scheduler.set_microtask_budget(7);
        assert_eq!(scheduler.microtask_budget(), 7);
    }
}
