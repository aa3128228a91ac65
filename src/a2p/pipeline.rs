//! Stage executor — runs dependent provider calls one at a time.
//!
//! Each call is awaited before the next one is built, so a stage can use the
//! SIDs earlier stages returned. The first failure stops the pipeline and is
//! reported with the stage that produced it. Nothing is retried here: every
//! stage is a remote mutation and gets exactly one attempt.

use std::future::Future;

use tracing::{debug, error};

use super::state::{Sid, Stage, WorkflowState};
use crate::error::{OnboardingError, ProviderError};

/// Drives one pipeline over a [`WorkflowState`] it borrows exclusively.
pub struct StageRunner<'s> {
    state: &'s mut WorkflowState,
    completed: Vec<Stage>,
}

impl<'s> StageRunner<'s> {
    pub fn new(state: &'s mut WorkflowState) -> Self {
        Self {
            state,
            completed: Vec::new(),
        }
    }

    /// Run one stage and return whatever the provider produced.
    pub async fn call<T, Fut>(&mut self, stage: Stage, call: Fut) -> Result<T, OnboardingError>
    where
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        debug!(stage = %stage, number = stage.number(), "Stage started");
        match call.await {
            Ok(value) => {
                self.completed.push(stage);
                debug!(stage = %stage, "Stage finished");
                Ok(value)
            }
            Err(source) => {
                error!(stage = %stage, number = stage.number(), error = %source, "Stage failed");
                Err(stage_error(stage, source))
            }
        }
    }

    /// Run a stage that creates a resource and record its SID.
    pub async fn create<Fut>(
        &mut self,
        stage: Stage,
        sid: Sid,
        call: Fut,
    ) -> Result<String, OnboardingError>
    where
        Fut: Future<Output = Result<String, ProviderError>>,
    {
        let value = self.call(stage, call).await?;
        self.record(stage, sid, value.clone())?;
        Ok(value)
    }

    pub fn record(&mut self, stage: Stage, sid: Sid, value: String) -> Result<(), OnboardingError> {
        self.state.record(stage, sid, value)
    }

    pub fn state_mut(&mut self) -> &mut WorkflowState {
        self.state
    }

    /// Stages that finished successfully, in order.
    pub fn completed(&self) -> &[Stage] {
        &self.completed
    }
}

fn stage_error(stage: Stage, source: ProviderError) -> OnboardingError {
    match source {
        ProviderError::PhoneNumberNotFound { phone_number } => {
            OnboardingError::PhoneNumberNotFound { phone_number }
        }
        source => OnboardingError::Stage { stage, source },
    }
}
