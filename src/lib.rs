//! # entrenar-qat: quantization-aware linear layers
//!
//! Linear layers that simulate 4-bit or 8-bit integer inference during
//! full-precision training:
//!
//! - `autograd`: tape-based autograd over flat `f32` tensors
//! - `quant`: descriptors, fake quantization with STE, calibration, tensor quantizers
//! - `nn`: `Linear` and `QuantLinear`
//! - `config`: declarative YAML quantization specs
//!
//! # Example
//!
//! ```
//! use entrenar_qat::nn::{PreActivation, QuantLinear, QuantLinearConfig};
//! use entrenar_qat::quant::{load_calib_amax, ptq_mode, qat_mode, QuantProfile};
//! use entrenar_qat::Tensor;
//!
//! let config = QuantLinearConfig::new(4, 2)
//!     .with_profile(QuantProfile::Int8)
//!     .with_pre_activation(PreActivation::Relu);
//! let mut layer = QuantLinear::new(config, 0)?;
//!
//! let x = Tensor::from_shape_vec(&[2, 4], vec![0.1, 0.5, 1.0, 2.0, 0.0, 0.3, 0.7, 1.5], false)?;
//!
//! ptq_mode(&mut layer);
//! layer.forward(&x)?;
//! load_calib_amax(&mut layer)?;
//! qat_mode(&mut layer);
//!
//! let y = layer.forward(&x)?;
//! assert_eq!(y.shape(), &[2, 2]);
//! # Ok::<(), entrenar_qat::QuantError>(())
//! ```

pub mod autograd;
pub mod cli;
pub mod config;
pub mod error;
pub mod nn;
pub mod quant;

pub use autograd::Tensor;
pub use error::{QuantError, Result};
