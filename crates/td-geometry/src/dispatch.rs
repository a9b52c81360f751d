//! Issuing a request plan to a geometry kernel.
//!
//! Every unit other than the assembly is an independent job; the assembly
//! runs once they have all finished. A shared cancel token is checked before
//! each request, and cancelled work is discarded.

use crate::error::KernelError;
use crate::request::{GeometryRequest, GeometryRequestPlan, UnitKey};
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use td_core::RequestId;
use tracing::{debug, info, warn};

/// Shared cancellation flag; clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Solid-modeling backend. Handles are opaque to the planner.
pub trait GeometryKernel: Sync {
    type Handle: Clone + Send + Sync;

    /// `inputs` holds the handles of `request.op.inputs()`, in that order.
    fn execute(
        &self,
        request: &GeometryRequest,
        inputs: &[Self::Handle],
    ) -> Result<Self::Handle, KernelError>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum UnitOutcome<H> {
    Completed { handles: Vec<(RequestId, H)> },
    Failed { request: RequestId, error: KernelError },
    Cancelled,
}

impl<H> UnitOutcome<H> {
    pub fn is_completed(&self) -> bool {
        matches!(self, UnitOutcome::Completed { .. })
    }
}

/// Outcome of every unit, in plan order.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchReport<H> {
    pub units: Vec<(UnitKey, UnitOutcome<H>)>,
}

impl<H> DispatchReport<H> {
    pub fn outcome(&self, unit: UnitKey) -> Option<&UnitOutcome<H>> {
        self.units
            .iter()
            .find(|(key, _)| *key == unit)
            .map(|(_, outcome)| outcome)
    }

    pub fn is_complete(&self) -> bool {
        self.units.iter().all(|(_, outcome)| outcome.is_completed())
    }

    pub fn handle(&self, id: RequestId) -> Option<&H> {
        self.units.iter().find_map(|(_, outcome)| match outcome {
            UnitOutcome::Completed { handles } => handles
                .iter()
                .find(|(request, _)| *request == id)
                .map(|(_, handle)| handle),
            _ => None,
        })
    }
}

fn run_unit<K: GeometryKernel>(
    kernel: &K,
    requests: &[&GeometryRequest],
    upstream: &HashMap<RequestId, K::Handle>,
    cancel: &CancelToken,
) -> UnitOutcome<K::Handle> {
    let mut handles: Vec<(RequestId, K::Handle)> = Vec::with_capacity(requests.len());
    for request in requests {
        if cancel.is_cancelled() {
            return UnitOutcome::Cancelled;
        }
        let inputs: Option<Vec<K::Handle>> = request
            .op
            .inputs()
            .iter()
            .map(|id| {
                handles
                    .iter()
                    .find(|(done, _)| done == id)
                    .map(|(_, h)| h.clone())
                    .or_else(|| upstream.get(id).cloned())
            })
            .collect();
        let Some(inputs) = inputs else {
            return UnitOutcome::Failed {
                request: request.id,
                error: KernelError::new(format!(
                    "inputs of request {} are unavailable",
                    request.id
                )),
            };
        };
        match kernel.execute(request, &inputs) {
            Ok(handle) => handles.push((request.id, handle)),
            Err(error) => {
                return UnitOutcome::Failed {
                    request: request.id,
                    error,
                };
            }
        }
    }
    UnitOutcome::Completed { handles }
}

/// Runs every unit of `plan` against `kernel`.
pub fn dispatch<K: GeometryKernel>(
    plan: &GeometryRequestPlan,
    kernel: &K,
    cancel: &CancelToken,
) -> DispatchReport<K::Handle> {
    let units = plan.units();
    let (assembly, independent): (Vec<_>, Vec<_>) = units
        .into_iter()
        .partition(|(key, _)| *key == UnitKey::Assembly);

    let none = HashMap::new();
    let mut outcomes: Vec<(UnitKey, UnitOutcome<K::Handle>)> = independent
        .par_iter()
        .map(|(key, requests)| {
            let outcome = run_unit(kernel, requests, &none, cancel);
            debug!(unit = %key, completed = outcome.is_completed(), "geometry unit finished");
            (*key, outcome)
        })
        .collect();

    let finished: HashMap<RequestId, K::Handle> = outcomes
        .iter()
        .filter_map(|(_, outcome)| match outcome {
            UnitOutcome::Completed { handles } => Some(handles.iter().cloned()),
            _ => None,
        })
        .flatten()
        .collect();
    for (key, requests) in &assembly {
        let outcome = run_unit(kernel, requests, &finished, cancel);
        debug!(unit = %key, completed = outcome.is_completed(), "geometry unit finished");
        outcomes.push((*key, outcome));
    }

    let report = DispatchReport { units: outcomes };
    if cancel.is_cancelled() {
        warn!("geometry dispatch cancelled");
    }
    info!(
        units = report.units.len(),
        complete = report.is_complete(),
        "geometry dispatch finished"
    );
    report
}
