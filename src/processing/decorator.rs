/// The callable a [`ProcessingHost`](super::ProcessingHost) runs.
pub type ProcessorTask = Box<dyn Fn() + Send + Sync>;

/// Wraps every processing task, e.g. to install tracing spans, tenant
/// context or timing around the group.
///
/// Decorators are applied in registration order, each wrapping the result
/// of the previous one, so the last registered decorator runs outermost.
pub trait ProcessorDecorator: Send + Sync {
    fn decorate(&self, task: ProcessorTask) -> ProcessorTask;
}

impl<F> ProcessorDecorator for F
where
    F: Fn(ProcessorTask) -> ProcessorTask + Send + Sync,
{
    fn decorate(&self, task: ProcessorTask) -> ProcessorTask {
        self(task)
    }
}
