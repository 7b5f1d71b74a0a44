//! Stateful tensor quantizer
//!
//! A [`TensorQuantizer`] binds one [`QuantDescriptor`](super::QuantDescriptor)
//! to runtime state: the current amax, an optional learned clip range, a
//! calibrator, and the mode flags switched by PTQ / QAT helpers in [`mode`].

mod mode;
mod quantizer;


pub use mode::{
    disable_quant, enable_quant, load_calib_amax, ptq_mode, qat_mode, set_mode, QuantMode,
    QuantModule,
};
pub use quantizer::{LearnedRange, QuantRole, TensorQuantizer};
