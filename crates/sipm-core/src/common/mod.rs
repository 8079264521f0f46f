pub mod constants;

pub use constants::{
    FACTORIAL_TABLE_LEN, SQRT_TWO_PI, SUPPORTED_MEAN_LIMIT, TRUNCATION_ORDER,
    TRUNCATION_TAIL_TOLERANCE,
};
