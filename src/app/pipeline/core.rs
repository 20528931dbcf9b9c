//! Small ordered-task runner used to express the startup/shutdown and
//! per-request pipelines as a flat list of named steps against a shared
//! context, instead of hand-nesting `match`/`?` chains.

use async_trait::async_trait;
use std::fmt::Debug;

/// A step that runs to completion synchronously before the pipeline
/// advances. Used for cheap, non-blocking-on-IO work (config parsing,
/// in-memory wiring).
pub trait BlockingTask<C, E> {
    fn run(&self, ctx: &C) -> Result<(), E>;
}

/// A step that may await IO. Used for anything touching the network,
/// a cache, or a store.
#[async_trait]
pub trait AsyncTask<C, E> {
    async fn run(&self, ctx: &C) -> Result<(), E>;
}

enum Step<C, E> {
    Blocking(Box<dyn BlockingTask<C, E> + Send + Sync>),
    Async(Box<dyn AsyncTask<C, E> + Send + Sync>),
}

/// An ordered sequence of tasks run against a shared context. Execution
/// stops at the first error.
pub struct Pipeline<C, E> {
    steps: Vec<Step<C, E>>,
}

impl<C: Sync, E: Debug> Pipeline<C, E> {
    pub async fn run(&self, ctx: &C) -> Result<(), E> {
        for step in &self.steps {
            match step {
                Step::Blocking(task) => task.run(ctx)?,
                Step::Async(task) => task.run(ctx).await?,
            }
        }

        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[derive(Default)]
pub struct PipelineBuilder<C, E> {
    steps: Vec<Step<C, E>>,
}

impl<C, E> PipelineBuilder<C, E> {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn with_blocking(mut self, task: Box<dyn BlockingTask<C, E> + Send + Sync>) -> Self {
        self.steps.push(Step::Blocking(task));
        self
    }

    pub fn with_async(mut self, task: Box<dyn AsyncTask<C, E> + Send + Sync>) -> Self {
        self.steps.push(Step::Async(task));
        self
    }

    pub fn add_async(&mut self, task: Box<dyn AsyncTask<C, E> + Send + Sync>) -> &mut Self {
        self.steps.push(Step::Async(task));
        self
    }

    /// Builds the pipeline. Returns `None` if no steps were ever added,
    /// mirroring call sites that treat an empty pipeline as "not configured".
    pub fn build(self) -> Option<Pipeline<C, E>> {
        if self.steps.is_empty() {
            None
        } else {
            Some(Pipeline { steps: self.steps })
        }
    }
}
