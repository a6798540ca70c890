//! Plan generation: form validation, prompt construction, response decoding.

pub mod decode;
pub mod generate;
pub mod prompt;

pub use decode::{PlanDecodeError, decode_plan, strip_code_fences, validate_plan};
pub use generate::{
    COACH_SYSTEM_PROMPT, EMPTY_COACH_REPLY, GenerateError, PLAN_MODEL, PLAN_TEMPERATURE,
    coach_reply, generate_plan, plan_completion_request,
};
pub use prompt::{FormError, FormInput, build_plan_prompt};
