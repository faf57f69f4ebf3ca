use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::error;

use super::item_processor::panic_message;
use super::{ProcessingAction, ProcessorDecorator, ProcessorTask};

/// Schedulable wrapper around a [`ProcessingAction`].
///
/// Decorators are folded into a single task at construction. Running the
/// host never panics: errors and panics from the action are logged and the
/// action is reset.
pub struct ProcessingHost {
    action: Arc<dyn ProcessingAction>,
    task: ProcessorTask,
}

impl ProcessingHost {
    pub fn new(action: Arc<dyn ProcessingAction>, decorators: &[Arc<dyn ProcessorDecorator>]) -> Self {
        let inner = Arc::clone(&action);
        let task: ProcessorTask = Box::new(move || {
            if let Err(err) = inner.run() {
                error!(error = %err, "outbox processing failed; resetting items");
                inner.reset();
            }
        });
        let task = decorators
            .iter()
            .fold(task, |task, decorator| decorator.decorate(task));

        ProcessingHost { action, task }
    }

    pub fn run(&self) {
        if let Err(panic) = panic::catch_unwind(AssertUnwindSafe(|| (self.task)())) {
            error!(
                panic = %panic_message(panic.as_ref()),
                "outbox processing panicked; resetting items"
            );
            self.action.reset();
        }
    }

    pub fn reset(&self) {
        self.action.reset();
    }
}
