/// Current transform with scoped save/restore
use crate::matrix::{Axis, Mat4};
use std::ops::{Deref, DerefMut};

/// A current matrix plus a stack of saved snapshots
#[derive(Debug, Clone, Default)]
pub struct TransformStack {
    current: Mat4,
    history: Vec<Mat4>,
}

impl TransformStack {
    pub fn new(current: Mat4) -> Self {
        Self {
            current,
            history: Vec::new(),
        }
    }

    pub fn current(&self) -> &Mat4 {
        &self.current
    }

    pub fn set(&mut self, matrix: Mat4) {
        self.current = matrix;
    }

    /// Number of saved snapshots
    pub fn depth(&self) -> usize {
        self.history.len()
    }

    pub fn push(&mut self) {
        self.history.push(self.current);
    }

    /// Restore the most recent snapshot.
    ///
    /// # Panics
    ///
    /// Panics when nothing has been pushed.
    pub fn pop(&mut self) {
        let Some(saved) = self.history.pop() else {
            panic!("pop on an empty transform stack");
        };
        self.current = saved;
    }

    /// Save the current matrix until the returned guard is dropped
    pub fn scope(&mut self) -> TransformScope<'_> {
        self.push();
        TransformScope { stack: self }
    }

    pub fn multiply_by(&mut self, other: &Mat4) -> &mut Self {
        self.current = Mat4::multiply(&self.current, other);
        self
    }

    pub fn translate(&mut self, tx: f64, ty: f64, tz: f64) -> &mut Self {
        self.current = self.current.translate(tx, ty, tz);
        self
    }

    pub fn scale(&mut self, sx: f64, sy: f64, sz: f64) -> &mut Self {
        self.current = self.current.scale(sx, sy, sz);
        self
    }

    pub fn rotate(&mut self, axis: Axis, degrees: f64) -> &mut Self {
        self.current = self.current.rotate(axis, degrees, false);
        self
    }

    pub fn pre_rotate(&mut self, axis: Axis, degrees: f64) -> &mut Self {
        self.current = self.current.pre_rotate(axis, degrees);
        self
    }
}

/// Guard that restores its stack's matrix on drop
#[derive(Debug)]
pub struct TransformScope<'a> {
    stack: &'a mut TransformStack,
}

impl Deref for TransformScope<'_> {
    type Target = TransformStack;

    fn deref(&self) -> &TransformStack {
        self.stack
    }
}

impl DerefMut for TransformScope<'_> {
    fn deref_mut(&mut self) -> &mut TransformStack {
        self.stack
    }
}

impl Drop for TransformScope<'_> {
    fn drop(&mut self) {
        self.stack.pop();
    }
}
