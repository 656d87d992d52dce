mod normalize;
mod panic;

pub use normalize::normalize_error_response;
pub use panic::handle_panic;
