//! Deployment/API version probing plan.

use std::fmt;

/// Deployment names tried in order when none is pinned.
pub const CANDIDATE_DEPLOYMENTS: [&str; 7] = [
    "gpt-4o",
    "gpt-4o-mini",
    "gpt-4",
    "gpt-4-turbo",
    "gpt-35-turbo",
    "gpt-4.1",
    "gpt-4.1-mini",
];

/// API versions tried for each deployment.
pub const CANDIDATE_API_VERSIONS: [&str; 4] = [
    "2024-08-01-preview",
    "2024-06-01",
    "2024-02-15-preview",
    "2023-12-01-preview",
];

/// One deployment/API version pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTarget {
    pub deployment: String,
    pub api_version: String,
}

impl ProbeTarget {
    pub fn new(deployment: impl Into<String>, api_version: impl Into<String>) -> Self {
        Self {
            deployment: deployment.into(),
            api_version: api_version.into(),
        }
    }
}

impl fmt::Display for ProbeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.deployment, self.api_version)
    }
}

/// Ordered sequence of targets to try.
///
/// A pinned pair yields exactly that pair. Otherwise every candidate
/// deployment is paired with every candidate API version, deployments
/// varying slowest.
#[derive(Debug, Clone)]
pub struct ProbePlan {
    targets: Vec<ProbeTarget>,
}

impl ProbePlan {
    /// Plan for an optional pinned `(deployment, api_version)` pair.
    pub fn new(fixed: Option<(String, String)>) -> Self {
        match fixed {
            Some((deployment, api_version)) => Self::fixed(deployment, api_version),
            None => Self::candidates(),
        }
    }

    pub fn fixed(deployment: impl Into<String>, api_version: impl Into<String>) -> Self {
        Self {
            targets: vec![ProbeTarget::new(deployment, api_version)],
        }
    }

    pub fn candidates() -> Self {
        let targets = CANDIDATE_DEPLOYMENTS
            .iter()
            .flat_map(|deployment| {
                CANDIDATE_API_VERSIONS
                    .iter()
                    .map(move |version| ProbeTarget::new(*deployment, *version))
            })
            .collect();
        Self { targets }
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

impl IntoIterator for ProbePlan {
    type Item = ProbeTarget;
    type IntoIter = std::vec::IntoIter<ProbeTarget>;

    fn into_iter(self) -> Self::IntoIter {
        self.targets.into_iter()
    }
}

/// How a single probe ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Success,
    /// Failed, the next target is tried.
    Retryable(String),
    /// Failed, probing stops.
    Fatal(String),
}

/// Record of one probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeAttempt {
    pub target: ProbeTarget,
    pub outcome: ProbeOutcome,
}
