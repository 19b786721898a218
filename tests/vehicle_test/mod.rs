mod math_test;
mod motor_test;
mod pipeline_test;
#[cfg(feature = "serde")]
mod serde_test;
