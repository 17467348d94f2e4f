//! Time series features used for order identification.
//!
//! # Example
//!
//! ```
//! use sarima_forecast::features::compute_acf;
//!
//! let series = vec![1.0, 3.0, 2.0, 4.0, 3.0, 5.0, 4.0, 6.0];
//! let acf = compute_acf(&series, 3).unwrap();
//! assert_eq!(acf[0].value, 1.0);
//! assert!(acf.iter().all(|e| e.value.abs() <= 1.0));
//! ```

pub mod autocorrelation;

pub use autocorrelation::{compute_acf, compute_pacf, CorrelogramEntry};
