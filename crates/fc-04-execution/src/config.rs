//! Configuration for the execution driver.

use thiserror::Error;

/// Configuration errors, reported by [`CoreConfig::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("validation_workers must be greater than zero")]
    ZeroWorkers,

    #[error("max_message_age_secs must be greater than zero")]
    ZeroDriftWindow,

    #[error("max_validation_attempts must be greater than zero")]
    ZeroRetryBudget,

    #[error("node_name must not be empty")]
    EmptyNodeName,

    #[error("minutes_per_block must be greater than zero")]
    ZeroMinutesPerBlock,
}

/// Message validation settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationConfig {
    /// Signed liveness messages older than this are rejected.
    pub max_message_age_secs: u64,
    /// Validation attempts before a pending message is dropped.
    pub max_validation_attempts: u32,
    /// Size of the validation worker pool.
    pub validation_workers: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_message_age_secs: 60,
            max_validation_attempts: 5,
            validation_workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
        }
    }
}

/// Election settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElectionConfig {
    /// Name stamped on locally built election messages.
    pub node_name: String,
    pub minutes_per_block: u32,
}

impl Default for ElectionConfig {
    fn default() -> Self {
        Self {
            node_name: "fnode0".to_string(),
            minutes_per_block: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionConfig {
    /// Lower bound on the number of lanes, whatever the roster size.
    pub initial_lanes: usize,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self { initial_lanes: 1 }
    }
}

/// Complete driver configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoreConfig {
    pub validation: ValidationConfig,
    pub election: ElectionConfig,
    pub execution: ExecutionConfig,
}

impl CoreConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.validation.validation_workers == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        if self.validation.max_message_age_secs == 0 {
            return Err(ConfigError::ZeroDriftWindow);
        }
        if self.validation.max_validation_attempts == 0 {
            return Err(ConfigError::ZeroRetryBudget);
        }
        if self.election.node_name.trim().is_empty() {
            return Err(ConfigError::EmptyNodeName);
        }
        if self.election.minutes_per_block == 0 {
            return Err(ConfigError::ZeroMinutesPerBlock);
        }
        Ok(())
    }

    /// Lane count for a roster of `federated` servers.
    pub fn lane_count(&self, federated: usize) -> usize {
        federated.max(self.execution.initial_lanes).max(1)
    }
}
