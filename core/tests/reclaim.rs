//! Reclamation scenarios against a fake process table.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use portreclaim_core::{
    Error, KillMode, PollPolicy, PortInspector, PortNumber, PortReclaimer, ProcessTerminator,
    ReclaimConfig, ReclaimOutcome, Result, TerminationReport, VictimSet,
};

/// Mock process table for testing.
#[derive(Clone, Default)]
struct MockTable {
    listeners: Arc<RwLock<HashMap<u16, Vec<u32>>>>,
    signalled: Arc<RwLock<Vec<u32>>>,
    // PIDs that exit on their own right before the signal arrives.
    racing: Arc<RwLock<Vec<u32>>>,
    modes: Arc<RwLock<Vec<KillMode>>>,
}

impl MockTable {
    fn with_listener(port: u16, pids: &[u32]) -> Self {
        let table = Self::default();
        table.listeners.write().insert(port, pids.to_vec());
        table
    }

    fn signalled(&self) -> Vec<u32> {
        self.signalled.read().clone()
    }

    fn modes(&self) -> Vec<KillMode> {
        self.modes.read().clone()
    }
}

impl PortInspector for MockTable {
    async fn pids_on_port(&self, port: PortNumber) -> Result<Vec<u32>> {
        Ok(self
            .listeners
            .read()
            .get(&port.get())
            .cloned()
            .unwrap_or_default())
    }
}

impl ProcessTerminator for MockTable {
    async fn terminate(&self, victims: &VictimSet, mode: KillMode) -> Result<TerminationReport> {
        self.modes.write().push(mode);
        let mut report = TerminationReport::default();
        let racing = self.racing.read().clone();

        for pid in victims {
            self.listeners
                .write()
                .values_mut()
                .for_each(|pids| pids.retain(|&p| p != pid));

            if racing.contains(&pid) {
                report.already_exited.push(pid);
            } else {
                self.signalled.write().push(pid);
                report.terminated.push(pid);
            }
        }
        Ok(report)
    }
}

fn reclaimer(table: &MockTable) -> PortReclaimer<MockTable, MockTable> {
    // PID 1 is never a holder in these tables.
    PortReclaimer::new(table.clone(), table.clone())
        .with_own_pid(1)
        .with_policy(PollPolicy {
            interval: Duration::from_millis(10),
            timeout: Duration::from_secs(1),
        })
}

fn port(p: u32) -> PortNumber {
    PortNumber::new(p).unwrap()
}

#[tokio::test]
async fn unbound_port_returns_immediately_without_kill() {
    let table = MockTable::default();
    let reclaimer = reclaimer(&table);

    assert!(!reclaimer.is_port_in_use(port(9009)).await.unwrap());
    let outcome = reclaimer.ensure_free(port(9009)).await.unwrap();

    assert_eq!(outcome, ReclaimOutcome::AlreadyFree { port: port(9009) });
    assert!(!outcome.killed_anything());
    assert!(table.signalled().is_empty());
}

#[tokio::test]
async fn bound_port_is_freed_by_killing_holder() {
    let table = MockTable::with_listener(9009, &[1234]);
    let reclaimer = reclaimer(&table);

    let outcome = reclaimer.ensure_free(port(9009)).await.unwrap();

    assert!(outcome.killed_anything());
    assert_eq!(table.signalled(), vec![1234]);
    assert!(!reclaimer.is_port_in_use(port(9009)).await.unwrap());
}

#[tokio::test]
async fn every_holder_is_killed() {
    for holders in [vec![10], vec![10, 11], vec![300, 200, 100]] {
        let table = MockTable::with_listener(8080, &holders);
        let reclaimer = reclaimer(&table);

        reclaimer.ensure_free(port(8080)).await.unwrap();

        let mut expected = holders.clone();
        expected.sort_unstable();
        assert_eq!(table.signalled(), expected);
        assert!(!reclaimer.is_port_in_use(port(8080)).await.unwrap());
    }
}

#[tokio::test]
async fn other_ports_are_left_alone() {
    let table = MockTable::with_listener(9009, &[1234]);
    table.listeners.write().insert(5432, vec![900]);
    let reclaimer = reclaimer(&table);

    reclaimer.ensure_free(port(9009)).await.unwrap();

    assert!(reclaimer.is_port_in_use(port(5432)).await.unwrap());
    assert_eq!(table.signalled(), vec![1234]);
}

#[tokio::test]
async fn kill_on_empty_port_is_a_no_op() {
    let table = MockTable::default();
    let reclaimer = reclaimer(&table);

    assert_eq!(reclaimer.kill_process_on_port(port(9009)).await.unwrap(), None);
    assert!(table.signalled().is_empty());
}

#[tokio::test]
async fn holder_exiting_during_kill_counts_as_success() {
    let table = MockTable::with_listener(9009, &[1234]);
    table.racing.write().push(1234);
    let reclaimer = reclaimer(&table);

    match reclaimer.ensure_free(port(9009)).await.unwrap() {
        ReclaimOutcome::Reclaimed { report, .. } => {
            let report = report.unwrap();
            assert_eq!(report.already_exited, vec![1234]);
            assert!(report.is_clean());
        }
        other => panic!("unexpected outcome {:?}", other),
    }
}

#[tokio::test]
async fn configured_kill_mode_is_used() {
    let table = MockTable::with_listener(9009, &[1234]);
    let config = ReclaimConfig {
        graceful: true,
        grace_period_ms: 250,
        ..Default::default()
    };
    let reclaimer = PortReclaimer::new(table.clone(), table.clone())
        .with_own_pid(1)
        .with_config(&config);

    reclaimer.ensure_free(port(9009)).await.unwrap();

    assert_eq!(
        table.modes(),
        vec![KillMode::Graceful {
            grace: Duration::from_millis(250)
        }]
    );
}

#[tokio::test]
async fn port_shared_with_self_is_reported_not_awaited() {
    let table = MockTable::with_listener(9009, &[1, 1234]);
    let reclaimer = reclaimer(&table);

    assert!(matches!(
        reclaimer.ensure_free(port(9009)).await,
        Err(Error::HeldByCurrentProcess(9009))
    ));
    assert_eq!(table.signalled(), vec![1234]);
    assert_eq!(table.modes(), vec![KillMode::Force]);
}
