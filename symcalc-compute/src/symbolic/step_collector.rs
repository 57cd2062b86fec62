/// Receives the steps an algorithm reports as it works, such as the rules applied by the
/// [`Simplifier`](super::simplify::Simplifier).
///
/// Use `()` to discard the steps, or a `Vec` to record them in order.
pub trait StepCollector<S> {
    /// Records a step.
    fn push(&mut self, step: S);
}

impl<S> StepCollector<S> for () {
    #[inline]
    fn push(&mut self, _: S) {}
}

impl<S> StepCollector<S> for Vec<S> {
    #[inline]
    fn push(&mut self, step: S) {
        Vec::push(self, step);
    }
}
