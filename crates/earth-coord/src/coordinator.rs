//! Wires the two roles together and runs them in the configured topology.

use crate::consumer::{Consumer, Presenter};
use crate::control::{RoleControl, RoleHandle};
use crate::producer::Producer;
use crate::shared::Shared;
use earth_core::{Error, Initiative, Result, Role, RunConfig, RunId, Threading};
use earth_sim::Stepper;
use std::sync::Arc;
use std::thread::{self, Scope, ScopedJoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info, info_span, warn};

/// How a role's loop behaves in a given topology
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlPath {
    /// Polls the channel on its own and idles when there is nothing to do
    Opportunistic,
    /// Paces the run and calls its partner directly
    DrivesInline,
    /// Paces the run through the request/completed handshake
    DrivesHandshake,
    /// Waits for its partner's requests
    RespondsToRequests,
    /// Has no loop of its own; called by its partner or by the caller
    Invoked,
}

/// Control path of both roles, fixed when the coordinator is built
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Plan {
    pub simulation: ControlPath,
    pub presentation: ControlPath,
    pub threading: Threading,
}

impl Plan {
    pub fn new(initiative: Initiative, threading: Threading) -> Self {
        let (simulation, presentation) = match initiative {
            Initiative::MasterControl => (
                Self::polling(threading.simulation),
                Self::polling(threading.presentation),
            ),
            Initiative::SimulationDrives => {
                Self::driven_by(threading.presentation)
            }
            Initiative::PresentationDrives => {
                let (presentation, simulation) = Self::driven_by(threading.simulation);
                (simulation, presentation)
            }
        };
        Self {
            simulation,
            presentation,
            threading,
        }
    }

    pub fn for_config(config: &RunConfig) -> Self {
        Self::new(config.initiative, config.threading)
    }

    fn polling(threaded: bool) -> ControlPath {
        if threaded {
            ControlPath::Opportunistic
        } else {
            ControlPath::Invoked
        }
    }

    /// (driver, follower) paths, given whether the follower has its own thread
    fn driven_by(follower_threaded: bool) -> (ControlPath, ControlPath) {
        if follower_threaded {
            (ControlPath::DrivesHandshake, ControlPath::RespondsToRequests)
        } else {
            (ControlPath::DrivesInline, ControlPath::Invoked)
        }
    }
}

/// Cloneable control surface for both roles
#[derive(Debug, Clone)]
pub struct Controls {
    pub simulation: RoleHandle,
    pub presentation: RoleHandle,
}

impl Controls {
    pub fn pause_all(&self) {
        self.simulation.pause();
        self.presentation.pause();
    }

    pub fn resume_all(&self) {
        self.simulation.resume();
        self.presentation.resume();
    }

    pub fn cancel_all(&self) {
        self.simulation.cancel();
        self.presentation.cancel();
    }
}

/// What a finished run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub run_id: RunId,
    pub steps_produced: u64,
    pub states_presented: u64,
    pub elapsed: Duration,
}

/// Owns one simulation run: the stepper, the presenter and the channel
/// between them.
pub struct Coordinator {
    run_id: RunId,
    plan: Plan,
    shared: Arc<Shared>,
    producer: Producer,
    consumer: Consumer,
    controls: Controls,
    finished: bool,
}

impl Coordinator {
    pub fn new(
        config: RunConfig,
        stepper: Stepper,
        presenter: impl Presenter + 'static,
    ) -> Result<Self> {
        if config.buffer_capacity == 0 {
            return Err(Error::InvalidBufferCapacity(config.buffer_capacity));
        }
        if config.idle_poll.is_zero() {
            return Err(Error::Validation(
                "Idle poll interval must be at least 1 ms".to_string(),
            ));
        }

        let run_id = RunId::new();
        let plan = Plan::for_config(&config);
        let shared = Arc::new(Shared::new(config));
        let simulation = Arc::new(RoleControl::new(Role::Simulation));
        let presentation = Arc::new(RoleControl::new(Role::Presentation));

        let controls = Controls {
            simulation: RoleHandle::new(Arc::clone(&simulation), Arc::clone(&shared)),
            presentation: RoleHandle::new(Arc::clone(&presentation), Arc::clone(&shared)),
        };
        let producer = Producer::new(stepper, simulation, Arc::clone(&shared));
        let consumer = Consumer::new(Box::new(presenter), presentation, Arc::clone(&shared));

        info!(
            run_id = %run_id,
            initiative = ?shared.config.initiative,
            simulation = ?plan.simulation,
            presentation = ?plan.presentation,
            buffer_capacity = shared.config.buffer_capacity,
            "Created coordinator"
        );

        Ok(Self {
            run_id,
            plan,
            shared,
            producer,
            consumer,
            controls,
            finished: false,
        })
    }

    /// Build the stepper from the config as well
    pub fn from_config(config: RunConfig, presenter: impl Presenter + 'static) -> Result<Self> {
        let stepper = Stepper::from_config(&config)?;
        Self::new(config, stepper, presenter)
    }

    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    pub fn plan(&self) -> Plan {
        self.plan
    }

    pub fn config(&self) -> &RunConfig {
        &self.shared.config
    }

    pub fn controls(&self) -> Controls {
        self.controls.clone()
    }

    /// Direct access for callers that drive the roles themselves
    pub fn producer_mut(&mut self) -> &mut Producer {
        &mut self.producer
    }

    pub fn consumer_mut(&mut self) -> &mut Consumer {
        &mut self.consumer
    }

    /// Start both roles and block until the run ends.
    ///
    /// The run ends when the step limit is reached and every state has
    /// been presented, or when either role is cancelled.
    pub fn run(&mut self) -> Result<RunSummary> {
        if self.finished {
            return Err(Error::InvalidState(format!(
                "Run {} has already finished",
                self.run_id
            )));
        }
        self.finished = true;

        let span = info_span!(
            "run",
            run_id = %self.run_id,
            initiative = ?self.shared.config.initiative,
            threaded_simulation = self.plan.threading.simulation,
            threaded_presentation = self.plan.threading.presentation
        );
        let _enter = span.enter();

        self.controls.simulation.start();
        self.controls.presentation.start();
        info!(event = "run_started", "Starting run");

        let started = Instant::now();
        let plan = self.plan;
        let shared = &*self.shared;
        let producer = &mut self.producer;
        let consumer = &mut self.consumer;

        let outcome =
            thread::scope(move |scope| execute(scope, plan, shared, producer, consumer));

        self.producer.control().finish();
        self.consumer.control().finish();
        self.shared.finish();

        let summary = RunSummary {
            run_id: self.run_id,
            steps_produced: self.producer.produced(),
            states_presented: self.consumer.presented(),
            elapsed: started.elapsed(),
        };
        match &outcome {
            Ok(()) => info!(
                steps_produced = summary.steps_produced,
                states_presented = summary.states_presented,
                elapsed_ms = summary.elapsed.as_millis() as u64,
                "Run finished"
            ),
            Err(e) => warn!(error = %e, "Run aborted"),
        }
        outcome.map(|()| summary)
    }
}

fn execute<'scope>(
    scope: &'scope Scope<'scope, '_>,
    plan: Plan,
    shared: &'scope Shared,
    producer: &'scope mut Producer,
    consumer: &'scope mut Consumer,
) -> Result<()> {
    let threading = plan.threading;
    match (plan.simulation, plan.presentation) {
        (ControlPath::DrivesInline, ControlPath::Invoked) => {
            if threading.simulation {
                let handle = spawn_role(scope, Role::Simulation, shared, move || {
                    producer.drive_inline(consumer)
                })?;
                join_roles(shared, vec![handle])
            } else {
                producer.drive_inline(consumer);
                Ok(())
            }
        }
        (ControlPath::Invoked, ControlPath::DrivesInline) => {
            if threading.presentation {
                let handle = spawn_role(scope, Role::Presentation, shared, move || {
                    consumer.drive_inline(producer)
                })?;
                join_roles(shared, vec![handle])
            } else {
                consumer.drive_inline(producer);
                Ok(())
            }
        }
        (ControlPath::DrivesHandshake, ControlPath::RespondsToRequests) => {
            let mut handles = vec![spawn_role(scope, Role::Presentation, shared, move || {
                consumer.respond_to_requests()
            })?];
            if threading.simulation {
                handles.push(spawn_role(scope, Role::Simulation, shared, move || {
                    producer.drive_with_handshake()
                })?);
            } else {
                producer.drive_with_handshake();
            }
            join_roles(shared, handles)
        }
        (ControlPath::RespondsToRequests, ControlPath::DrivesHandshake) => {
            let mut handles = vec![spawn_role(scope, Role::Simulation, shared, move || {
                producer.respond_to_requests()
            })?];
            if threading.presentation {
                handles.push(spawn_role(scope, Role::Presentation, shared, move || {
                    consumer.drive_with_handshake()
                })?);
            } else {
                consumer.drive_with_handshake();
            }
            join_roles(shared, handles)
        }
        (simulation, presentation) if is_polling(simulation) && is_polling(presentation) => {
            let mut handles = Vec::new();
            let inline_producer = if simulation == ControlPath::Opportunistic {
                handles.push(spawn_role(scope, Role::Simulation, shared, move || {
                    producer.run_opportunistic()
                })?);
                None
            } else {
                Some(producer)
            };
            let inline_consumer = if presentation == ControlPath::Opportunistic {
                handles.push(spawn_role(scope, Role::Presentation, shared, move || {
                    consumer.run_opportunistic()
                })?);
                None
            } else {
                Some(consumer)
            };
            run_master(shared, inline_producer, inline_consumer);
            join_roles(shared, handles)
        }
        (simulation, presentation) => Err(Error::InvalidState(format!(
            "No run loop for simulation {simulation:?} with presentation {presentation:?}"
        ))),
    }
}

fn is_polling(path: ControlPath) -> bool {
    matches!(path, ControlPath::Opportunistic | ControlPath::Invoked)
}

/// Caller-thread loop for roles that have no loop of their own
fn run_master(shared: &Shared, mut producer: Option<&mut Producer>, mut consumer: Option<&mut Consumer>) {
    if producer.is_none() && consumer.is_none() {
        return;
    }
    debug!(
        simulation = producer.is_some(),
        presentation = consumer.is_some(),
        "Master loop driving inline roles"
    );

    loop {
        let mut live = false;
        let mut progressed = false;

        if let Some(producer) = producer.as_deref_mut() {
            if producer.is_live() {
                live = true;
                progressed |= producer.produce_once().made_progress();
            }
        }
        if let Some(consumer) = consumer.as_deref_mut() {
            if !consumer.is_done() {
                live = true;
                progressed |= consumer.drain() > 0;
            }
        }

        if !live {
            break;
        }
        if !progressed {
            shared.idle();
        }
    }

    if let Some(producer) = producer {
        producer.control().finish();
    }
    if let Some(consumer) = consumer {
        consumer.control().finish();
    }
}

fn spawn_role<'scope, F>(
    scope: &'scope Scope<'scope, '_>,
    role: Role,
    shared: &Shared,
    body: F,
) -> Result<ScopedJoinHandle<'scope, ()>>
where
    F: FnOnce() + Send + 'scope,
{
    let span = tracing::Span::current();
    thread::Builder::new()
        .name(role.name().to_string())
        .spawn_scoped(scope, move || {
            let _enter = span.enter();
            body()
        })
        .map_err(|e| {
            warn!(role = %role, error = %e, "Failed to spawn role thread");
            shared.shutdown();
            Error::Io(e)
        })
}

fn join_roles(shared: &Shared, handles: Vec<ScopedJoinHandle<'_, ()>>) -> Result<()> {
    let mut outcome = Ok(());
    for handle in handles {
        let name = handle.thread().name().unwrap_or("role").to_string();
        if handle.join().is_err() {
            warn!(role = %name, "Role thread panicked");
            shared.shutdown();
            if outcome.is_ok() {
                outcome = Err(Error::InvalidState(format!("{name} thread panicked")));
            }
        }
    }
    outcome
}
