//! Cluster bootstrap and teardown.
//!
//! [`Orchestrator`] owns every piece of per-cluster state: port counters,
//! the process registry, the driver registry, and the addresses handed out
//! so far. Independent orchestrators never share state, so several clusters
//! can be driven side by side (in tests, for example).
//!
//! # Bootstrap order
//!
//! ```text
//! scheduler ─settle─► objstore[0] ─settle─► workers[0..n] ─settle─►
//!                     objstore[1] ─settle─► workers[0..n] ─settle─► ...
//!                     drivers ─settle─► done
//! ```
//!
//! A stage never starts before the previous stage's wait has finished.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, warn};

use super::drivers::DriverRegistry;
use super::readiness::{ReadinessGate, SettleTimings, Stage};
use super::registry::{ProcessRecord, ProcessRegistry};
use super::shutdown::{ShutdownCoordinator, ShutdownPolicy, ShutdownReport};
use crate::domain::{
    Address, ClusterTopology, DriverEndpoints, DriverHandle, DriverMode, PortAllocator, Role,
};
use crate::error::{ConfigError, Error, LaunchError, Result};
use crate::port::outbound::driver::DriverConnector;
use crate::port::outbound::process::{LaunchSpec, ProcessLauncher};

/// Parameters for [`Orchestrator::start_cluster`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterRequest {
    /// Existing scheduler to join. When `None` a scheduler is launched.
    pub scheduler_address: Option<Address>,
    pub num_objstores: usize,
    pub workers_per_objstore: usize,
    /// Program each worker runs. Required when `workers_per_objstore > 0`.
    pub worker_program: Option<PathBuf>,
    /// Return one explicit driver per object store instead of attaching the
    /// implicit driver.
    pub return_drivers: bool,
}

impl Default for ClusterRequest {
    fn default() -> Self {
        Self {
            scheduler_address: None,
            num_objstores: 1,
            workers_per_objstore: 0,
            worker_program: None,
            return_drivers: false,
        }
    }
}

impl ClusterRequest {
    /// Check the request before anything is launched.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for workers without a program,
    /// workers without an object store, or an implicit driver without an
    /// object store to attach to.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.workers_per_objstore > 0 && self.worker_program.is_none() {
            return Err(ConfigError::InvalidValue {
                field: "worker_program",
                reason: format!(
                    "required to start {} workers per object store",
                    self.workers_per_objstore
                ),
            });
        }
        if self.workers_per_objstore > 0 && self.num_objstores < 1 {
            return Err(ConfigError::InvalidValue {
                field: "num_objstores",
                reason: format!(
                    "{} workers per object store requested but num_objstores is {}",
                    self.workers_per_objstore, self.num_objstores
                ),
            });
        }
        if !self.return_drivers && self.num_objstores < 1 {
            return Err(ConfigError::InvalidValue {
                field: "num_objstores",
                reason: "the implicit driver needs at least one object store".to_string(),
            });
        }
        Ok(())
    }
}

/// Parameters for [`Orchestrator::start_node`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRequest {
    /// Scheduler of the cluster being extended.
    pub scheduler_address: Address,
    /// Host (without port) the new object store and workers bind on.
    pub host: String,
    pub num_workers: usize,
    pub worker_program: Option<PathBuf>,
    /// Attach the implicit driver to the new object store.
    pub attach_driver: bool,
}

impl NodeRequest {
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for workers without a program or
    /// an empty host.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.num_workers > 0 && self.worker_program.is_none() {
            return Err(ConfigError::InvalidValue {
                field: "worker_program",
                reason: format!("required to start {} workers", self.num_workers),
            });
        }
        if self.host.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "host" });
        }
        Ok(())
    }
}

/// Result of a successful [`Orchestrator::start_cluster`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterHandle {
    pub topology: ClusterTopology,
    /// Explicit drivers, one per object store, when requested.
    pub drivers: Option<Vec<DriverHandle>>,
}

/// Result of a successful [`Orchestrator::start_node`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeHandle {
    pub objstore_address: Address,
    pub worker_addresses: Vec<Address>,
}

/// Static settings an orchestrator runs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorSettings {
    /// Host used for every address this orchestrator allocates itself.
    pub host: String,
    pub scheduler_binary: PathBuf,
    pub objstore_binary: PathBuf,
    /// Interpreter used to run worker programs, e.g. `python`.
    pub worker_interpreter: Option<String>,
    /// Tear down already launched processes when a bootstrap call fails.
    pub rollback_on_failure: bool,
    pub shutdown: ShutdownPolicy,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            scheduler_binary: PathBuf::from("scheduler"),
            objstore_binary: PathBuf::from("objstore"),
            worker_interpreter: None,
            rollback_on_failure: false,
            shutdown: ShutdownPolicy::default(),
        }
    }
}

/// Builder for [`Orchestrator`].
#[derive(Default)]
pub struct OrchestratorBuilder {
    settings: OrchestratorSettings,
    launcher: Option<Arc<dyn ProcessLauncher>>,
    connector: Option<Arc<dyn DriverConnector>>,
    readiness: Option<ReadinessGate>,
}

impl OrchestratorBuilder {
    #[must_use]
    pub fn settings(mut self, settings: OrchestratorSettings) -> Self {
        self.settings = settings;
        self
    }

    #[must_use]
    pub fn launcher(mut self, launcher: Arc<dyn ProcessLauncher>) -> Self {
        self.launcher = Some(launcher);
        self
    }

    #[must_use]
    pub fn connector(mut self, connector: Arc<dyn DriverConnector>) -> Self {
        self.connector = Some(connector);
        self
    }

    /// Defaults to fixed settle intervals.
    #[must_use]
    pub fn readiness(mut self, readiness: ReadinessGate) -> Self {
        self.readiness = Some(readiness);
        self
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] if no launcher or connector was set.
    pub fn build(self) -> Result<Orchestrator> {
        let launcher = self
            .launcher
            .ok_or(ConfigError::MissingField { field: "launcher" })?;
        let connector = self
            .connector
            .ok_or(ConfigError::MissingField { field: "connector" })?;
        let readiness = self
            .readiness
            .unwrap_or_else(|| ReadinessGate::settle(SettleTimings::default()));
        let shutdown = ShutdownCoordinator::new(self.settings.shutdown);

        Ok(Orchestrator {
            settings: self.settings,
            ports: PortAllocator::new(),
            processes: ProcessRegistry::new(),
            drivers: DriverRegistry::new(),
            objstore_addresses: Vec::new(),
            worker_addresses: Vec::new(),
            launcher,
            connector,
            readiness,
            shutdown,
        })
    }
}

/// Launches, tracks, and tears down one cluster.
pub struct Orchestrator {
    settings: OrchestratorSettings,
    ports: PortAllocator,
    processes: ProcessRegistry,
    drivers: DriverRegistry,
    objstore_addresses: Vec<Address>,
    worker_addresses: Vec<Address>,
    launcher: Arc<dyn ProcessLauncher>,
    connector: Arc<dyn DriverConnector>,
    readiness: ReadinessGate,
    shutdown: ShutdownCoordinator,
}

impl Orchestrator {
    #[must_use]
    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::default()
    }

    #[must_use]
    pub const fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    #[must_use]
    pub const fn processes(&self) -> &ProcessRegistry {
        &self.processes
    }

    #[must_use]
    pub const fn drivers(&self) -> &DriverRegistry {
        &self.drivers
    }

    #[must_use]
    pub const fn ports(&self) -> &PortAllocator {
        &self.ports
    }

    /// Every object-store address allocated by this orchestrator, in order.
    #[must_use]
    pub fn objstore_addresses(&self) -> &[Address] {
        &self.objstore_addresses
    }

    /// Every worker address allocated by this orchestrator, including those
    /// used for driver connections.
    #[must_use]
    pub fn worker_addresses(&self) -> &[Address] {
        &self.worker_addresses
    }

    /// Start a scheduler, object stores, workers, and drivers.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if the request is invalid; nothing is launched.
    /// - [`Error::Launch`] if a process could not be spawned.
    /// - [`Error::Readiness`] if probing is enabled and a process never
    ///   became reachable.
    /// - [`Error::Connection`] if a driver could not connect.
    ///
    /// Processes launched before a failure stay registered unless
    /// `rollback_on_failure` is set; call [`cleanup`](Self::cleanup) to
    /// stop them.
    pub async fn start_cluster(&mut self, request: &ClusterRequest) -> Result<ClusterHandle> {
        request.validate()?;

        match self.bootstrap(request).await {
            Ok(handle) => Ok(handle),
            Err(e) => {
                self.after_failure(&e).await;
                Err(e)
            }
        }
    }

    async fn bootstrap(&mut self, request: &ClusterRequest) -> Result<ClusterHandle> {
        let host = self.settings.host.clone();

        let scheduler_address = match &request.scheduler_address {
            Some(address) => address.clone(),
            None => {
                let address = self.start_scheduler()?;
                self.readiness
                    .wait(Stage::Scheduler, std::slice::from_ref(&address))
                    .await?;
                address
            }
        };

        let mut objstore_addresses = Vec::new();
        for _ in 0..request.num_objstores {
            let objstore = self
                .start_node_processes(
                    &scheduler_address,
                    &host,
                    request.workers_per_objstore,
                    request.worker_program.as_deref(),
                )
                .await?
                .objstore_address;
            objstore_addresses.push(objstore);
        }

        let drivers = if request.return_drivers {
            Some(
                self.attach_explicit_drivers(&scheduler_address, &objstore_addresses, &host)
                    .await?,
            )
        } else {
            // Validation guarantees at least one object store here.
            self.attach_implicit_driver(&scheduler_address, &objstore_addresses[0], &host)
                .await?;
            None
        };

        let topology = ClusterTopology {
            scheduler_address,
            objstore_addresses,
            workers_per_store: request.workers_per_objstore,
        };
        info!(
            scheduler = %topology.scheduler_address,
            objstores = topology.objstore_addresses.len(),
            workers = topology.worker_count(),
            drivers = drivers.as_ref().map_or(0, Vec::len),
            "Cluster started"
        );

        Ok(ClusterHandle { topology, drivers })
    }

    /// Add an object store and its workers to a cluster whose scheduler is
    /// already running, optionally attaching the implicit driver to it.
    ///
    /// # Errors
    ///
    /// Same as [`start_cluster`](Self::start_cluster).
    pub async fn start_node(&mut self, request: &NodeRequest) -> Result<NodeHandle> {
        request.validate()?;

        let result = async {
            let node = self
                .start_node_processes(
                    &request.scheduler_address,
                    &request.host,
                    request.num_workers,
                    request.worker_program.as_deref(),
                )
                .await?;
            if request.attach_driver {
                self.attach_implicit_driver(
                    &request.scheduler_address,
                    &node.objstore_address,
                    &request.host,
                )
                .await?;
            }
            Ok(node)
        }
        .await;

        if let Err(e) = &result {
            self.after_failure(e).await;
        }
        result
    }

    /// One object store plus its workers, with the stage waits in between.
    async fn start_node_processes(
        &mut self,
        scheduler: &Address,
        host: &str,
        num_workers: usize,
        worker_program: Option<&Path>,
    ) -> Result<NodeHandle> {
        let objstore_address = self.start_object_store(scheduler, host)?;
        self.readiness
            .wait(Stage::ObjectStore, std::slice::from_ref(&objstore_address))
            .await?;

        let mut worker_addresses = Vec::new();
        if let Some(program) = worker_program {
            for _ in 0..num_workers {
                let worker = self.start_worker(program, scheduler, &objstore_address, host)?;
                worker_addresses.push(worker);
            }
        }
        self.readiness.wait(Stage::Workers, &worker_addresses).await?;

        Ok(NodeHandle {
            objstore_address,
            worker_addresses,
        })
    }

    /// Launch a scheduler on the orchestrator's host.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Launch`] if the port range is used up or the spawn fails.
    pub fn start_scheduler(&mut self) -> Result<Address> {
        let host = self.settings.host.clone();
        let address = self.allocate(Role::Scheduler, &host)?;
        let spec = LaunchSpec::scheduler(&self.settings.scheduler_binary, &address);
        self.launch(&spec)?;
        Ok(address)
    }

    /// Launch an object store bound to `scheduler`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Launch`] if the port range is used up or the spawn fails.
    pub fn start_object_store(&mut self, scheduler: &Address, host: &str) -> Result<Address> {
        let address = self.allocate(Role::ObjectStore, host)?;
        self.objstore_addresses.push(address.clone());
        let spec = LaunchSpec::object_store(&self.settings.objstore_binary, scheduler, &address);
        self.launch(&spec)?;
        Ok(address)
    }

    /// Launch a worker bound to `scheduler` and `objstore`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Launch`] if the port range is used up or the spawn fails.
    pub fn start_worker(
        &mut self,
        program: &Path,
        scheduler: &Address,
        objstore: &Address,
        host: &str,
    ) -> Result<Address> {
        let address = self.allocate(Role::Worker, host)?;
        let spec = LaunchSpec::worker(
            program,
            self.settings.worker_interpreter.as_deref(),
            scheduler,
            objstore,
            &address,
        );
        self.launch(&spec)?;
        Ok(address)
    }

    fn allocate(&mut self, role: Role, host: &str) -> Result<Address> {
        let address = self
            .ports
            .allocate_address(role, host)
            .map_err(LaunchError::from)?;
        if role == Role::Worker {
            self.worker_addresses.push(address.clone());
        }
        Ok(address)
    }

    /// Spawn a process and register it. Nothing is registered on failure.
    fn launch(&mut self, spec: &LaunchSpec) -> Result<()> {
        let handle = self.launcher.launch(spec).map_err(|e| {
            error!(role = %spec.role, address = %spec.address, error = %e, "Launch failed");
            e
        })?;

        let record = ProcessRecord::new(handle, spec.address.clone(), spec.role);
        info!(
            role = %spec.role,
            address = %spec.address,
            pid = ?record.pid(),
            "Launched process"
        );
        self.processes.register(record);
        Ok(())
    }

    async fn attach_implicit_driver(
        &mut self,
        scheduler: &Address,
        objstore: &Address,
        host: &str,
    ) -> Result<()> {
        let endpoints = DriverEndpoints {
            scheduler: scheduler.clone(),
            objstore: objstore.clone(),
            worker: self.allocate(Role::Worker, host)?,
        };
        self.connector
            .connect(&endpoints, DriverMode::Implicit)
            .await?;
        self.readiness.wait(Stage::Drivers, &[]).await?;
        Ok(())
    }

    async fn attach_explicit_drivers(
        &mut self,
        scheduler: &Address,
        objstores: &[Address],
        host: &str,
    ) -> Result<Vec<DriverHandle>> {
        let mut handles = Vec::with_capacity(objstores.len());
        for objstore in objstores {
            let endpoints = DriverEndpoints {
                scheduler: scheduler.clone(),
                objstore: objstore.clone(),
                worker: self.allocate(Role::Worker, host)?,
            };
            let handle = self
                .connector
                .connect(&endpoints, DriverMode::Explicit)
                .await?;
            self.drivers.register(handle.clone());
            handles.push(handle);
        }
        self.readiness.wait(Stage::Drivers, &[]).await?;
        Ok(handles)
    }

    async fn after_failure(&mut self, error: &Error) {
        if self.settings.rollback_on_failure {
            warn!(error = %error, "Bootstrap failed, rolling back launched processes");
            self.cleanup().await;
        } else if !self.processes.is_empty() {
            warn!(
                error = %error,
                running = self.processes.len(),
                "Bootstrap failed; launched processes left running until cleanup"
            );
        }
    }

    /// Stop every launched process and disconnect every driver.
    ///
    /// Never fails. Both registries are empty afterwards, even when some
    /// processes could not be confirmed stopped.
    pub async fn cleanup(&mut self) -> ShutdownReport {
        self.shutdown
            .shutdown(&mut self.processes, &mut self.drivers, self.connector.as_ref())
            .await
    }
}
