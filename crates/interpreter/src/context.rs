//! Execution contexts: a dispatch table, the builder that fills it, and the
//! policy for when that happens.

use kindle_bytecode::{BytecodeArray, Value};
use tracing::debug;

use crate::builder::{BuildOutcome, TableBuilder};
use crate::dispatch::DispatchStats;
use crate::emitter::{DirectEmitter, HandlerEmitter};
use crate::error::{BuildError, RuntimeError};
use crate::frame::Frame;
use crate::table::DispatchTable;

/// When a context builds its dispatch table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildPolicy {
    /// At context creation.
    #[default]
    Eager,
    /// On the first execution.
    Lazy,
}

/// Context configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextConfig {
    pub build_policy: BuildPolicy,
    /// Run the verifier over bytecode before executing it.
    pub verify_bytecode: bool,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            build_policy: BuildPolicy::Eager,
            verify_bytecode: cfg!(debug_assertions),
        }
    }
}

impl ContextConfig {
    pub fn lazy(mut self) -> Self {
        self.build_policy = BuildPolicy::Lazy;
        self
    }

    pub fn verify(mut self, enabled: bool) -> Self {
        self.verify_bytecode = enabled;
        self
    }
}

/// The result of running one frame to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub value: Value,
    pub stats: DispatchStats,
}

/// Owns a dispatch table and executes bytecode against it.
pub struct ExecutionContext<E = DirectEmitter> {
    config: ContextConfig,
    table: DispatchTable,
    builder: TableBuilder<E>,
}

impl ExecutionContext<DirectEmitter> {
    /// A context with the default emitter.
    pub fn new(config: ContextConfig) -> Result<Self, BuildError> {
        Self::with_builder(config, TableBuilder::new())
    }
}

impl<E: HandlerEmitter> ExecutionContext<E> {
    /// A context that builds its table with `builder`. With an eager policy a
    /// build failure is returned here.
    pub fn with_builder(config: ContextConfig, builder: TableBuilder<E>) -> Result<Self, BuildError> {
        let context = Self {
            config,
            table: DispatchTable::new(),
            builder,
        };
        if config.build_policy == BuildPolicy::Eager {
            context.ensure_built()?;
        }
        Ok(context)
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    pub fn table(&self) -> &DispatchTable {
        &self.table
    }

    pub fn builder(&self) -> &TableBuilder<E> {
        &self.builder
    }

    /// Build the table if that has not happened yet.
    pub fn ensure_built(&self) -> Result<BuildOutcome, BuildError> {
        self.builder.ensure_built(&self.table)
    }

    /// Run `bytecode` from offset 0 until it returns.
    pub fn execute(&self, bytecode: &BytecodeArray) -> Result<Completion, RuntimeError> {
        self.ensure_built()?;

        if self.config.verify_bytecode {
            kindle_verifier::verify(bytecode).map_err(RuntimeError::Rejected)?;
        }
        if bytecode.is_empty() {
            return Err(RuntimeError::EmptyBytecode);
        }

        let mut frame = Frame::new(&self.table, bytecode);
        let value = frame.run();
        let stats = frame.stats();
        debug!(%value, continues = stats.continues, "frame completed");
        Ok(Completion { value, stats })
    }
}
