mod environment;
mod error;
mod extractors;

pub use environment::Environment;
pub use error::{
    AppError, ErrorRecord, ErrorResponse, Normalized, DUPLICATE_KEY_CODE, DUPLICATE_KEY_MESSAGE,
    RESOURCE_NOT_FOUND_MESSAGE, SERVER_ERROR_MESSAGE, VALIDATION_FAILED_MESSAGE,
};
pub use extractors::{ResourceId, ValidatedJson};
