//! Tensor with gradient tracking
//!
//! Data is stored flat (row-major) in an `Array1<f32>`; the logical shape is
//! carried alongside. Clones share the gradient cell, so a tensor captured by a
//! backward op accumulates into the same gradient the caller reads.

use super::BackwardOp;
use crate::error::{QuantError, Result};
use ndarray::Array1;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Shared gradient storage
pub type GradCell = Rc<RefCell<Option<Array1<f32>>>>;

/// Differentiable tensor
#[derive(Clone)]
pub struct Tensor {
    data: Array1<f32>,
    shape: Vec<usize>,
    grad: GradCell,
    backward_op: Option<Rc<dyn BackwardOp>>,
    requires_grad: bool,
}

impl Tensor {
    /// Create a 1-D tensor from an ndarray
    pub fn new(data: Array1<f32>, requires_grad: bool) -> Self {
        let shape = vec![data.len()];
        Self {
            data,
            shape,
            grad: Rc::new(RefCell::new(None)),
            backward_op: None,
            requires_grad,
        }
    }

    /// Create a 1-D tensor from a vector
    pub fn from_vec(data: Vec<f32>, requires_grad: bool) -> Self {
        Self::new(Array1::from(data), requires_grad)
    }

    /// Create a tensor with an explicit shape
    ///
    /// Fails when the product of `shape` does not match `data.len()`.
    pub fn from_shape_vec(shape: &[usize], data: Vec<f32>, requires_grad: bool) -> Result<Self> {
        let expected: usize = shape.iter().product();
        if expected != data.len() {
            return Err(QuantError::ShapeMismatch {
                expected: format!("{shape:?} ({expected} elements)"),
                actual: format!("{} elements", data.len()),
            });
        }
        let mut tensor = Self::from_vec(data, requires_grad);
        tensor.shape = shape.to_vec();
        Ok(tensor)
    }

    /// Single-element tensor
    pub fn scalar(value: f32, requires_grad: bool) -> Self {
        Self::from_vec(vec![value], requires_grad)
    }

    /// View the same data under a different shape
    ///
    /// The returned tensor shares the gradient cell and backward op, so
    /// gradients flow through the reshape unchanged.
    pub fn reshape(&self, shape: &[usize]) -> Result<Self> {
        let expected: usize = shape.iter().product();
        if expected != self.len() {
            return Err(QuantError::ShapeMismatch {
                expected: format!("{shape:?} ({expected} elements)"),
                actual: format!("{:?} ({} elements)", self.shape, self.len()),
            });
        }
        let mut tensor = self.clone();
        tensor.shape = shape.to_vec();
        Ok(tensor)
    }

    /// Copy of the data with no graph attached
    pub fn detach(&self) -> Self {
        let mut tensor = Self::new(self.data.clone(), false);
        tensor.shape = self.shape.clone();
        tensor
    }

    /// Flat data
    pub fn data(&self) -> &Array1<f32> {
        &self.data
    }

    /// Mutable flat data
    pub fn data_mut(&mut self) -> &mut Array1<f32> {
        &mut self.data
    }

    /// Logical shape
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Size of the last dimension (0 for an empty shape)
    pub fn last_dim(&self) -> usize {
        self.shape.last().copied().unwrap_or(0)
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the tensor has no elements
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn requires_grad(&self) -> bool {
        self.requires_grad
    }

    /// Current gradient, if any
    pub fn grad(&self) -> Option<Array1<f32>> {
        self.grad.borrow().clone()
    }

    /// Overwrite the gradient
    pub fn set_grad(&self, grad: Array1<f32>) {
        *self.grad.borrow_mut() = Some(grad);
    }

    /// Add to the gradient (initializing it if empty)
    pub fn accumulate_grad(&self, grad: Array1<f32>) {
        let mut cell = self.grad.borrow_mut();
        match cell.as_mut() {
            Some(existing) => *existing += &grad,
            None => *cell = Some(grad),
        }
    }

    /// Clear the gradient
    pub fn zero_grad(&self) {
        *self.grad.borrow_mut() = None;
    }

    /// Handle to the shared gradient cell
    pub fn grad_cell(&self) -> GradCell {
        Rc::clone(&self.grad)
    }

    pub fn set_backward_op(&mut self, op: Rc<dyn BackwardOp>) {
        self.backward_op = Some(op);
    }

    pub fn backward_op(&self) -> Option<Rc<dyn BackwardOp>> {
        self.backward_op.clone()
    }

    /// Whether this tensor was created directly rather than by an op
    pub fn is_leaf(&self) -> bool {
        self.backward_op.is_none()
    }

    /// Result tensor of an op: takes the shape of `like`
    pub(crate) fn shaped_like(data: Array1<f32>, like: &Tensor, requires_grad: bool) -> Self {
        let mut tensor = Self::new(data, requires_grad);
        tensor.shape = like.shape.clone();
        tensor
    }

    pub(crate) fn with_shape_unchecked(mut self, shape: Vec<usize>) -> Self {
        debug_assert_eq!(shape.iter().product::<usize>(), self.len());
        self.shape = shape;
        self
    }
}

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor")
            .field("shape", &self.shape)
            .field("data", &self.data)
            .field("requires_grad", &self.requires_grad)
            .field("has_grad", &self.grad.borrow().is_some())
            .field("is_leaf", &self.is_leaf())
            .finish()
    }
}
