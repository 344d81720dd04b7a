//! Bootstrap and teardown through the public orchestrator API.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use hatchery::application::{
    BackoffPolicy, ClusterRequest, NodeRequest, Orchestrator, OrchestratorSettings, ProbePolicy,
    ReadinessGate, SettleTimings,
};
use hatchery::domain::error::DomainError;
use hatchery::domain::{
    Address, DriverEndpoints, DriverHandle, DriverMode, Role, TerminationOutcome,
};
use hatchery::error::{ConfigError, Error, LaunchError, ReadinessError};
use hatchery::port::outbound::driver::DriverConnector;
use hatchery::port::outbound::process::{LaunchSpec, ProcessHandle, ProcessLauncher};
use hatchery::testkit::driver::RecordingConnector;
use hatchery::testkit::probe::ScriptedProbe;
use hatchery::testkit::process::{worker_program, FakeBehavior, FakeLauncher, Signal};
use hatchery::testkit::settings::{
    instant_settings, orchestrator, orchestrator_with, settled_orchestrator,
};
use parking_lot::Mutex;

fn quick_probe(max_attempts: u32) -> ProbePolicy {
    ProbePolicy {
        max_attempts,
        backoff: BackoffPolicy {
            first: Duration::from_millis(1),
            max: Duration::from_millis(5),
            factor: 2.0,
            jitter: false,
        },
    }
}

/// What happened, and how long after the clock started.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Event {
    Launch(Role),
    Connect,
}

#[derive(Debug, Clone)]
struct Timeline {
    start: Instant,
    events: Arc<Mutex<Vec<(Event, Duration)>>>,
}

impl Timeline {
    fn new() -> Self {
        Self {
            start: Instant::now(),
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn record(&self, event: Event) {
        self.events.lock().push((event, self.start.elapsed()));
    }

    fn events(&self) -> Vec<(Event, Duration)> {
        self.events.lock().clone()
    }
}

#[derive(Debug, Clone)]
struct TimedLauncher {
    inner: FakeLauncher,
    timeline: Timeline,
}

impl ProcessLauncher for TimedLauncher {
    fn launch(&self, spec: &LaunchSpec) -> Result<Box<dyn ProcessHandle>, LaunchError> {
        self.timeline.record(Event::Launch(spec.role));
        self.inner.launch(spec)
    }
}

#[derive(Debug, Clone)]
struct TimedConnector {
    inner: RecordingConnector,
    timeline: Timeline,
}

#[async_trait]
impl DriverConnector for TimedConnector {
    async fn connect(
        &self,
        endpoints: &DriverEndpoints,
        mode: DriverMode,
    ) -> hatchery::error::Result<DriverHandle> {
        self.timeline.record(Event::Connect);
        self.inner.connect(endpoints, mode).await
    }

    async fn disconnect(&self, driver: Option<&DriverHandle>) -> hatchery::error::Result<()> {
        self.inner.disconnect(driver).await
    }

    fn name(&self) -> &'static str {
        "timed"
    }
}

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

fn with_workers(num_objstores: usize, workers_per_objstore: usize) -> ClusterRequest {
    ClusterRequest {
        num_objstores,
        workers_per_objstore,
        worker_program: Some(worker_program()),
        ..ClusterRequest::default()
    }
}

#[tokio::test]
async fn workers_without_program_launch_nothing() {
    let launcher = FakeLauncher::new();
    let connector = RecordingConnector::new();
    let mut orch = orchestrator(&launcher, &connector);

    let request = ClusterRequest {
        workers_per_objstore: 2,
        worker_program: None,
        ..ClusterRequest::default()
    };
    let result = orch.start_cluster(&request).await;

    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::InvalidValue {
            field: "worker_program",
            ..
        }))
    ));
    assert!(launcher.launches().is_empty());
    assert!(orch.processes().is_empty());
    assert!(connector.connects().is_empty());
}

#[tokio::test]
async fn three_stores_without_workers() {
    let launcher = FakeLauncher::new();
    let connector = RecordingConnector::new();
    let mut orch = orchestrator(&launcher, &connector);

    let handle = orch.start_cluster(&with_workers(3, 0)).await.unwrap();

    assert_eq!(orch.processes().count(Role::Scheduler), 1);
    assert_eq!(orch.processes().count(Role::ObjectStore), 3);
    assert_eq!(orch.processes().count(Role::Worker), 0);
    assert_eq!(handle.topology.objstore_addresses.len(), 3);
    assert!(handle.drivers.is_none());
}

#[tokio::test]
async fn launch_order_follows_stages() {
    let launcher = FakeLauncher::new();
    let connector = RecordingConnector::new();
    let mut orch = orchestrator(&launcher, &connector);

    orch.start_cluster(&with_workers(2, 2)).await.unwrap();

    let roles: Vec<Role> = launcher.launches().iter().map(|s| s.role).collect();
    assert_eq!(
        roles,
        vec![
            Role::Scheduler,
            Role::ObjectStore,
            Role::Worker,
            Role::Worker,
            Role::ObjectStore,
            Role::Worker,
            Role::Worker,
        ]
    );
}

#[tokio::test]
async fn addresses_come_from_per_role_counters() {
    let launcher = FakeLauncher::new();
    let connector = RecordingConnector::new();
    let mut orch = orchestrator(&launcher, &connector);

    let handle = orch.start_cluster(&with_workers(2, 1)).await.unwrap();

    assert_eq!(
        handle.topology.scheduler_address,
        Address::new("127.0.0.1", 10001)
    );
    assert_eq!(
        handle.topology.objstore_addresses,
        vec![
            Address::new("127.0.0.1", 20001),
            Address::new("127.0.0.1", 20002)
        ]
    );
    // Two workers, then the implicit driver's worker address.
    let workers: Vec<u16> = orch.worker_addresses().iter().map(Address::port).collect();
    assert_eq!(workers, vec![40001, 40002, 40003]);
}

#[tokio::test]
async fn launch_arguments_wire_processes_together() {
    let launcher = FakeLauncher::new();
    let connector = RecordingConnector::new();
    let settings = OrchestratorSettings {
        worker_interpreter: Some("python".to_string()),
        ..instant_settings()
    };
    let mut orch = orchestrator_with(&launcher, &connector, settings);

    orch.start_cluster(&with_workers(1, 1)).await.unwrap();

    let launches = launcher.launches();
    assert_eq!(launches[0].args, vec!["127.0.0.1:10001"]);
    assert_eq!(launches[1].args, vec!["127.0.0.1:10001", "127.0.0.1:20001"]);
    assert_eq!(launches[2].program, PathBuf::from("python"));
    assert_eq!(
        launches[2].args,
        vec![
            "worker.py",
            "--scheduler-address=127.0.0.1:10001",
            "--objstore-address=127.0.0.1:20001",
            "--worker-address=127.0.0.1:40001",
        ]
    );
}

#[tokio::test]
async fn explicit_drivers_bind_to_distinct_stores() {
    let launcher = FakeLauncher::new();
    let connector = RecordingConnector::new();
    let mut orch = orchestrator(&launcher, &connector);

    let request = ClusterRequest {
        num_objstores: 2,
        return_drivers: true,
        ..ClusterRequest::default()
    };
    let handle = orch.start_cluster(&request).await.unwrap();

    let drivers = handle.drivers.expect("explicit drivers");
    assert_eq!(drivers.len(), 2);
    let stores: HashSet<&Address> = drivers.iter().map(|d| &d.endpoints().objstore).collect();
    assert_eq!(stores.len(), 2);
    for (driver, objstore) in drivers.iter().zip(&handle.topology.objstore_addresses) {
        assert_eq!(&driver.endpoints().objstore, objstore);
    }
    assert_eq!(orch.drivers().len(), 2);
    assert!(connector
        .connects()
        .iter()
        .all(|(_, mode)| *mode == DriverMode::Explicit));
}

#[tokio::test]
async fn implicit_driver_attaches_to_first_store() {
    let launcher = FakeLauncher::new();
    let connector = RecordingConnector::new();
    let mut orch = orchestrator(&launcher, &connector);

    let handle = orch.start_cluster(&with_workers(2, 0)).await.unwrap();

    let connects = connector.connects();
    assert_eq!(connects.len(), 1);
    let (endpoints, mode) = &connects[0];
    assert_eq!(*mode, DriverMode::Implicit);
    assert_eq!(endpoints.objstore, handle.topology.objstore_addresses[0]);
    assert!(orch.drivers().is_empty());
}

#[tokio::test]
async fn joining_existing_scheduler_launches_none() {
    let launcher = FakeLauncher::new();
    let connector = RecordingConnector::new();
    let mut orch = orchestrator(&launcher, &connector);

    let scheduler = Address::new("10.0.0.5", 10001);
    let request = ClusterRequest {
        scheduler_address: Some(scheduler.clone()),
        ..ClusterRequest::default()
    };
    let handle = orch.start_cluster(&request).await.unwrap();

    assert_eq!(handle.topology.scheduler_address, scheduler);
    assert_eq!(orch.processes().count(Role::Scheduler), 0);
    assert_eq!(launcher.launched(Role::ObjectStore)[0].args[0], "10.0.0.5:10001");
}

#[tokio::test]
async fn cleanup_empties_both_registries() {
    let launcher = FakeLauncher::new()
        .with_behavior(Role::Worker, FakeBehavior::Unkillable)
        .with_behavior(Role::ObjectStore, FakeBehavior::IgnoresKill);
    let connector = RecordingConnector::new();
    let mut orch = orchestrator(&launcher, &connector);

    let request = ClusterRequest {
        return_drivers: true,
        ..with_workers(2, 1)
    };
    orch.start_cluster(&request).await.unwrap();
    let report = orch.cleanup().await;

    assert!(orch.processes().is_empty());
    assert!(orch.drivers().is_empty());
    assert_eq!(report.processes.len(), 5);
    assert_eq!(report.unresponsive(), 2);
    assert_eq!(report.drivers_disconnected, 2);
    assert!(!report.is_clean());
}

#[tokio::test]
async fn already_exited_processes_are_not_signalled() {
    let launcher = FakeLauncher::new().with_behavior(Role::ObjectStore, FakeBehavior::Exited);
    let connector = RecordingConnector::new();
    let mut orch = orchestrator(&launcher, &connector);

    orch.start_cluster(&with_workers(1, 0)).await.unwrap();
    let report = orch.cleanup().await;

    let store = report
        .processes
        .iter()
        .find(|p| p.role == Role::ObjectStore)
        .unwrap();
    assert_eq!(store.outcome, TerminationOutcome::AlreadyExited);
    assert!(launcher.signals_for(store.pid.unwrap()).is_empty());
    assert_eq!(launcher.signals_for(1000), vec![Signal::Kill]);
}

#[tokio::test]
async fn implicit_driver_is_disconnected_on_cleanup() {
    let launcher = FakeLauncher::new();
    let connector = RecordingConnector::new();
    let mut orch = orchestrator(&launcher, &connector);

    orch.start_cluster(&ClusterRequest::default()).await.unwrap();
    let report = orch.cleanup().await;

    assert!(report.implicit_disconnect);
    assert_eq!(connector.disconnects(), vec![None]);
    assert_eq!(launcher.alive(), 0);
}

#[tokio::test]
async fn failed_launch_keeps_earlier_stages_by_default() {
    let launcher = FakeLauncher::new().failing_role(Role::Worker);
    let connector = RecordingConnector::new();
    let mut orch = orchestrator(&launcher, &connector);

    let result = orch.start_cluster(&with_workers(1, 1)).await;

    assert!(matches!(
        result,
        Err(Error::Launch(LaunchError::Spawn {
            role: Role::Worker,
            ..
        }))
    ));
    assert_eq!(orch.processes().len(), 2);
    assert_eq!(launcher.alive(), 2);

    orch.cleanup().await;
    assert_eq!(launcher.alive(), 0);
}

#[tokio::test]
async fn failed_launch_rolls_back_when_enabled() {
    let launcher = FakeLauncher::new().failing_after(2);
    let connector = RecordingConnector::new();
    let settings = OrchestratorSettings {
        rollback_on_failure: true,
        ..instant_settings()
    };
    let mut orch = orchestrator_with(&launcher, &connector, settings);

    let result = orch.start_cluster(&with_workers(2, 0)).await;

    assert!(result.is_err());
    assert!(orch.processes().is_empty());
    assert_eq!(launcher.alive(), 0);
}

#[tokio::test]
async fn driver_connect_failure_is_reported() {
    let launcher = FakeLauncher::new();
    let connector = RecordingConnector::new().failing_connect_after(1);
    let mut orch = orchestrator(&launcher, &connector);

    let request = ClusterRequest {
        num_objstores: 2,
        return_drivers: true,
        ..ClusterRequest::default()
    };
    let result = orch.start_cluster(&request).await;

    assert!(matches!(result, Err(Error::Connection(_))));
    assert_eq!(orch.drivers().len(), 1);
    orch.cleanup().await;
    assert!(orch.drivers().is_empty());
}

#[tokio::test]
async fn independent_orchestrators_do_not_share_ports() {
    let connector = RecordingConnector::new();
    let first_launcher = FakeLauncher::new();
    let second_launcher = FakeLauncher::new();
    let mut first = orchestrator(&first_launcher, &connector);
    let mut second = orchestrator(&second_launcher, &connector);

    let a = first.start_cluster(&ClusterRequest::default()).await.unwrap();
    let b = second.start_cluster(&ClusterRequest::default()).await.unwrap();

    assert_eq!(a.topology.scheduler_address, b.topology.scheduler_address);
    assert_eq!(first.processes().len(), 2);
    assert_eq!(second.processes().len(), 2);
}

#[tokio::test]
async fn start_node_extends_running_cluster() {
    let launcher = FakeLauncher::new();
    let connector = RecordingConnector::new();
    let mut orch = orchestrator(&launcher, &connector);

    let scheduler = orch.start_scheduler().unwrap();
    let node = orch
        .start_node(&NodeRequest {
            scheduler_address: scheduler.clone(),
            host: "127.0.0.1".to_string(),
            num_workers: 2,
            worker_program: Some(worker_program()),
            attach_driver: true,
        })
        .await
        .unwrap();

    assert_eq!(node.objstore_address, Address::new("127.0.0.1", 20001));
    assert_eq!(node.worker_addresses.len(), 2);
    assert_eq!(orch.processes().len(), 4);
    let (endpoints, mode) = &connector.connects()[0];
    assert_eq!(*mode, DriverMode::Implicit);
    assert_eq!(endpoints.scheduler, scheduler);
    assert_eq!(endpoints.objstore, node.objstore_address);
}

#[tokio::test]
async fn probe_gate_waits_for_each_process() {
    let launcher = FakeLauncher::new();
    let connector = RecordingConnector::new();
    let scheduler = Address::new("127.0.0.1", 10001);
    let probe = ScriptedProbe::new().ready_after(scheduler.clone(), 2);
    let policy = quick_probe(5);
    let gate = ReadinessGate::probing(SettleTimings::ZERO, Arc::new(probe.clone()), policy);
    let mut orch = Orchestrator::builder()
        .settings(instant_settings())
        .launcher(Arc::new(launcher.clone()))
        .connector(Arc::new(connector.clone()))
        .readiness(gate)
        .build()
        .unwrap();

    orch.start_cluster(&ClusterRequest::default()).await.unwrap();

    assert_eq!(probe.attempts(&scheduler), 3);
    assert_eq!(probe.attempts(&Address::new("127.0.0.1", 20001)), 1);
}

#[tokio::test]
async fn probe_gate_gives_up_with_not_ready() {
    let launcher = FakeLauncher::new();
    let connector = RecordingConnector::new();
    let objstore = Address::new("127.0.0.1", 20001);
    let probe = ScriptedProbe::new().never_ready(objstore.clone());
    let policy = quick_probe(3);
    let gate = ReadinessGate::probing(SettleTimings::ZERO, Arc::new(probe.clone()), policy);
    let mut orch = Orchestrator::builder()
        .settings(instant_settings())
        .launcher(Arc::new(launcher.clone()))
        .connector(Arc::new(connector.clone()))
        .readiness(gate)
        .build()
        .unwrap();

    let result = orch.start_cluster(&ClusterRequest::default()).await;

    match result {
        Err(Error::Readiness(ReadinessError::NotReadyYet {
            role,
            address,
            attempts,
        })) => {
            assert_eq!(role, Role::ObjectStore);
            assert_eq!(address, objstore);
            assert_eq!(attempts, 3);
        }
        other => panic!("expected NotReadyYet, got {other:?}"),
    }
    assert_eq!(probe.attempts(&objstore), 3);
    assert!(connector.connects().is_empty());
}

fn stage_timings() -> SettleTimings {
    SettleTimings {
        scheduler: ms(20),
        object_store: ms(30),
        workers: ms(40),
        drivers: ms(50),
    }
}

/// Gap between consecutive recorded events, and between the last event and
/// `finished`.
fn gaps(events: &[(Event, Duration)], finished: Duration) -> Vec<Duration> {
    let mut times: Vec<Duration> = events.iter().map(|(_, at)| *at).collect();
    times.push(finished);
    times.windows(2).map(|pair| pair[1] - pair[0]).collect()
}

#[tokio::test]
async fn settle_intervals_separate_stages() {
    let timeline = Timeline::new();
    let launcher = TimedLauncher {
        inner: FakeLauncher::new(),
        timeline: timeline.clone(),
    };
    let connector = TimedConnector {
        inner: RecordingConnector::new(),
        timeline: timeline.clone(),
    };
    let mut orch =
        settled_orchestrator(&launcher, &connector, instant_settings(), stage_timings());

    orch.start_cluster(&with_workers(2, 1)).await.unwrap();
    let finished = timeline.start.elapsed();

    let events = timeline.events();
    let order: Vec<Event> = events.iter().map(|(event, _)| event.clone()).collect();
    assert_eq!(
        order,
        vec![
            Event::Launch(Role::Scheduler),
            Event::Launch(Role::ObjectStore),
            Event::Launch(Role::Worker),
            Event::Launch(Role::ObjectStore),
            Event::Launch(Role::Worker),
            Event::Connect,
        ]
    );

    // scheduler | store | workers | store | workers, then connect, then the
    // driver settle before start_cluster returns.
    let minimum = [ms(20), ms(30), ms(40), ms(30), ms(40), ms(50)];
    for (gap, min) in gaps(&events, finished).iter().zip(minimum) {
        assert!(*gap >= min, "gap {gap:?} shorter than {min:?}: {events:?}");
    }
    assert!(finished >= ms(210), "finished after {finished:?}");
}

#[tokio::test]
async fn joining_scheduler_skips_its_settle() {
    let timeline = Timeline::new();
    let launcher = TimedLauncher {
        inner: FakeLauncher::new(),
        timeline: timeline.clone(),
    };
    let connector = TimedConnector {
        inner: RecordingConnector::new(),
        timeline: timeline.clone(),
    };
    let mut orch =
        settled_orchestrator(&launcher, &connector, instant_settings(), stage_timings());

    let request = ClusterRequest {
        scheduler_address: Some(Address::new("10.0.0.5", 10001)),
        ..ClusterRequest::default()
    };
    orch.start_cluster(&request).await.unwrap();
    let finished = timeline.start.elapsed();

    let events = timeline.events();
    assert_eq!(events.len(), 2, "{events:?}");
    assert_eq!(events[0].0, Event::Launch(Role::ObjectStore));
    assert_eq!(events[1].0, Event::Connect);

    // Object-store and workers settles precede the connect; the driver
    // settle follows it.
    let gaps = gaps(&events, finished);
    assert!(gaps[0] >= ms(70), "{gaps:?}");
    assert!(gaps[1] >= ms(50), "{gaps:?}");
}

#[tokio::test]
async fn object_store_count_beyond_port_range_fails_cleanly() {
    let launcher = FakeLauncher::new();
    let connector = RecordingConnector::new();
    let mut orch = orchestrator(&launcher, &connector);

    let request = ClusterRequest {
        num_objstores: usize::MAX / 4,
        return_drivers: true,
        ..ClusterRequest::default()
    };
    let result = orch.start_cluster(&request).await;

    assert!(matches!(
        result,
        Err(Error::Launch(LaunchError::Ports(DomainError::PortsExhausted {
            role: Role::ObjectStore
        })))
    ));
    let stores = usize::from(u16::MAX - Role::ObjectStore.base_port());
    assert_eq!(orch.processes().count(Role::Scheduler), 1);
    assert_eq!(orch.processes().count(Role::ObjectStore), stores);
    assert!(connector.connects().is_empty());
}

#[test]
fn builder_requires_launcher() {
    let result = Orchestrator::builder()
        .connector(Arc::new(RecordingConnector::new()))
        .build();
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::MissingField { field: "launcher" }))
    ));
}
