//! Classification of a single verification attempt
//!
//! Pure: given what the backend said and how many transport retries have
//! already happened, decide the controller's next move.

use super::error::VerificationError;
use crate::error::{ApiError, ApiResult};
use crate::payments::types::{VerificationData, VerifyResponse};

/// Automatic retries allowed after a transport failure
pub const MAX_TRANSPORT_RETRIES: u32 = 1;

/// Embedded status honoured on the first attempt despite `success: false`
pub const COMPLETED_STATUS: &str = "completed";

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Confirm {
        data: VerificationData,
        reconciled: bool,
    },
    Decline(VerificationError),
    RetryLater(ApiError),
    GiveUp(VerificationError),
}

pub fn next_step(outcome: ApiResult<VerifyResponse>, retry_count: u32) -> Step {
    match outcome {
        Ok(response) if response.success => Step::Confirm {
            data: response.data.unwrap_or_default(),
            reconciled: false,
        },
        Ok(response) => {
            let completed = response
                .data
                .as_ref()
                .and_then(|data| data.status.as_deref())
                == Some(COMPLETED_STATUS);

            if completed && retry_count == 0 {
                Step::Confirm {
                    data: response.data.unwrap_or_default(),
                    reconciled: true,
                }
            } else {
                Step::Decline(VerificationError::declined(response.message))
            }
        }
        Err(ApiError::Unauthorized) => Step::GiveUp(
            VerificationError::unauthenticated().with_context("backend rejected credential"),
        ),
        Err(ApiError::Rejected { message }) => {
            Step::Decline(VerificationError::declined(Some(message)))
        }
        Err(e) if retry_count < MAX_TRANSPORT_RETRIES => Step::RetryLater(e),
        Err(e) => Step::GiveUp(VerificationError::transport().with_context(e.to_string())),
    }
}
