//! Dialplan composition.
//!
//! Every enabled module is asked for its fragments concurrently; the answers are merged into
//! one sequence ordered by priority (ascending), ties broken by registration order. Fragment
//! text is passed through untouched.

mod error;

pub use error::{DialplanContributionFailure, DialplanContributionFailureExt};

use pbx_domain::dialplan::{DialplanContributions, DialplanFragment, DialplanRequest};
use pbx_domain::ModuleError;
use pbx_domain::registry::ModuleHandle;
use serde::Serialize;
use std::any::Any;
use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinError;
use tokio::time::error::Elapsed;
use tracing::{debug, warn};

/// Default upper bound for one module's `dialplan_contributions` call.
pub const DEFAULT_DIALPLAN_TIMEOUT: Duration = Duration::from_millis(500);

/// A composed dialplan for one request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dialplan {
    pub request: DialplanRequest,
    /// Fragments in evaluation order.
    pub fragments: Vec<DialplanFragment>,
    #[serde(skip)]
    pub failures: Vec<DialplanContributionFailure>,
}

impl Dialplan {
    /// Fragment text in evaluation order.
    #[must_use]
    pub fn xml(&self) -> Vec<&str> {
        self.fragments.iter().map(|f| f.xml.as_str()).collect()
    }

    #[must_use]
    pub fn into_xml(self) -> Vec<String> {
        self.fragments.into_iter().map(|f| f.xml).collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

/// Queries modules for fragments and orders the result.
#[derive(Debug, Clone, Copy)]
pub struct DialplanComposer {
    timeout: Duration,
}

impl Default for DialplanComposer {
    fn default() -> Self {
        Self::new(DEFAULT_DIALPLAN_TIMEOUT)
    }
}

type Collected = Result<DialplanContributions, DialplanContributionFailure>;
type Joined = Result<Result<Result<DialplanContributions, ModuleError>, Elapsed>, JoinError>;

impl DialplanComposer {
    #[must_use]
    pub const fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Composes the dialplan for `request` from `modules`.
    ///
    /// Each module's enabled flag is read exactly once, up front; a module disabled after that
    /// still finishes contributing to this composition.
    pub async fn compose(&self, modules: &[ModuleHandle], request: DialplanRequest) -> Dialplan {
        let enabled: Vec<&ModuleHandle> = modules.iter().filter(|m| m.is_enabled()).collect();
        let shared = Arc::new(request);

        let tasks: Vec<_> = enabled
            .iter()
            .map(|handle| {
                let handle = (*handle).clone();
                let request = Arc::clone(&shared);
                let timeout = self.timeout;
                tokio::spawn(async move {
                    tokio::time::timeout(timeout, handle.module().dialplan_contributions(&request)).await
                })
            })
            .collect();

        let mut collected = Vec::new();
        let mut failures = Vec::new();

        // All tasks are already running; awaiting in order only fixes how results are read.
        for (handle, task) in enabled.iter().zip(tasks) {
            match self.collect(handle, &shared, task.await) {
                Ok(contributions) => {
                    collected.extend(contributions.into_iter().map(|(priority, xml)| {
                        (priority, handle.order(), handle.name().to_owned(), xml)
                    }));
                },
                Err(failure) => {
                    warn!(
                        module = handle.name(),
                        tenant = %shared.tenant_domain,
                        destination = %shared.destination,
                        kind = failure.kind(),
                        error = %failure,
                        "Dialplan contribution dropped"
                    );
                    failures.push(failure);
                },
            }
        }

        collected.sort_by_key(|(priority, order, ..)| (*priority, *order));

        let fragments: Vec<DialplanFragment> = collected
            .into_iter()
            .map(|(priority, _, module_name, xml)| DialplanFragment { priority, module_name, xml })
            .collect();

        debug!(
            request = %shared,
            modules = enabled.len(),
            fragments = fragments.len(),
            failed = failures.len(),
            "Dialplan composed"
        );

        let request = Arc::try_unwrap(shared).unwrap_or_else(|arc| (*arc).clone());
        Dialplan { request, fragments, failures }
    }

    fn collect(
        &self,
        handle: &ModuleHandle,
        request: &DialplanRequest,
        joined: Joined,
    ) -> Collected {
        let module = handle.name().to_owned();
        let request = request.clone();
        match joined {
            Ok(Ok(Ok(contributions))) => Ok(contributions),
            Ok(Ok(Err(source))) => {
                Err(DialplanContributionFailure::Failed { module, request, source, context: None })
            },
            Ok(Err(_elapsed)) => Err(DialplanContributionFailure::TimedOut {
                module,
                request,
                timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
                context: None,
            }),
            Err(join) => Err(DialplanContributionFailure::Panicked {
                module,
                request,
                message: if join.is_panic() {
                    panic_message(join.into_panic())
                } else {
                    Cow::Borrowed("contribution task was cancelled")
                },
                context: None,
            }),
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> Cow<'static, str> {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        Cow::Borrowed(*message)
    } else if let Ok(message) = payload.downcast::<String>() {
        Cow::Owned(*message)
    } else {
        Cow::Borrowed("non-string panic payload")
    }
}
