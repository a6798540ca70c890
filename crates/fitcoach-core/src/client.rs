//! Client-side plan lifecycle: form submission into the plan store.
//!
//! Validates the form locally (an invalid form never reaches the network),
//! requests a plan through a [`PlanApi`], and replaces the active plan in
//! the [`PlanStore`]. A failed request leaves the previous plan in place.

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{Plan, UserProfile};
use crate::plan::prompt::{FormError, FormInput};
use crate::store::{PlanStorage, PlanStore, StoreError};

/// A failed call to the plan service, with its user-facing message.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct RequestError(pub String);

/// The plan-generation endpoint as seen by the client.
#[async_trait]
pub trait PlanApi: Send + Sync {
    async fn request_plan(&self, form: &FormInput) -> Result<Plan, RequestError>;
}

/// Errors from [`submit_form`].
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("please fill all fields: {0}")]
    Invalid(#[from] FormError),

    #[error("plan request failed: {0}")]
    Request(#[from] RequestError),

    #[error("failed to save plan: {0}")]
    Store(#[from] StoreError),
}

/// Submit `form` and store the resulting plan.
///
/// Exactly one request is issued for a valid form and none for an invalid
/// one. The stored plan's `name` is the submitted name, as typed.
pub async fn submit_form<S: PlanStorage>(
    api: &dyn PlanApi,
    store: &mut PlanStore<S>,
    form: &FormInput,
) -> Result<(), SubmitError> {
    UserProfile::from_form(form)?;

    let mut plan = api.request_plan(form).await?;
    plan.name = Some(form.name.clone());

    store.set(plan)?;
    Ok(())
}
