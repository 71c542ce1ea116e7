//! Execution status, component kind and lifecycle event kind.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ParseError;

/// Status of a component execution.
///
/// Advances `Accepted → Started → Finished → Stopped`; `Failed` can be
/// reached from `Accepted`, `Started`, and from `Finished` when teardown
/// fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Accepted,
    Started,
    Finished,
    Stopped,
    Failed,
}

impl ExecutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Started => "started",
            Self::Finished => "finished",
            Self::Stopped => "stopped",
            Self::Failed => "failed",
        }
    }

    /// No further transition is possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Stopped | Self::Failed)
    }

    /// The workload may still be making progress.
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Accepted | Self::Started)
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExecutionStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "accepted" => Ok(Self::Accepted),
            "started" => Ok(Self::Started),
            "finished" => Ok(Self::Finished),
            "stopped" => Ok(Self::Stopped),
            "failed" => Ok(Self::Failed),
            other => Err(ParseError::new("execution status", other)),
        }
    }
}

/// Backend a component is written for. Only Kubernetes is runnable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ComponentKind {
    #[default]
    Kubernetes,
    Mesos,
    Swarm,
}

impl ComponentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Kubernetes => "Kubernetes",
            Self::Mesos => "Mesos",
            Self::Swarm => "Swarm",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComponentKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Kubernetes" | "kubernetes" => Ok(Self::Kubernetes),
            "Mesos" | "mesos" => Ok(Self::Mesos),
            "Swarm" | "swarm" => Ok(Self::Swarm),
            other => Err(ParseError::new("component kind", other)),
        }
    }
}

/// Lifecycle event reported by a running workload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    ComponentStart,
    ComponentResult,
    ComponentStop,
}

impl EventType {
    pub const ALL: [EventType; 3] = [
        EventType::ComponentStart,
        EventType::ComponentResult,
        EventType::ComponentStop,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ComponentStart => "component_start",
            Self::ComponentResult => "component_result",
            Self::ComponentStop => "component_stop",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ParseError::new("event type", s))
    }
}
