pub mod batch;
pub mod normalize;

pub use self::batch::{column_mean, column_norm_sq, frobenius_sq};
pub use self::normalize::{
    contrast_normalize, contrast_normalize_columns, unit_normalize, unit_normalize_columns,
    CONTRAST_EPS,
};
