//! In-process exception model.
//!
//! Native exceptions are the live objects a snapshot is taken from. They
//! are shared through `Arc`, their cause is set at most once and their
//! suppressed list only grows, so a graph of them may contain cycles
//! through either edge. Identity is the `Arc` allocation.

use crate::error::{CoreError, CoreResult};
use crate::frame::Frame;
use std::any::Any;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

/// A live exception that can be snapshotted.
pub trait NativeException: Any + Send + Sync + fmt::Debug {
    /// Fully qualified name of the exact runtime type
    fn type_name(&self) -> &str;

    /// Shared message, stack and edge state
    fn state(&self) -> &ThrowableState;

    /// Access for downcasting to the concrete type
    fn as_any(&self) -> &dyn Any;

    /// Message, absent when the exception was created without one
    fn message(&self) -> Option<&str> {
        self.state().message()
    }

    /// Captured stack, outermost call first
    fn stack_trace(&self) -> &[Frame] {
        self.state().stack_trace()
    }

    /// Cause, if one was initialized
    fn cause(&self) -> Option<Arc<dyn NativeException>> {
        self.state().cause()
    }

    /// Copy of the suppressed list in insertion order
    fn suppressed(&self) -> Vec<Arc<dyn NativeException>> {
        self.state().suppressed()
    }

    /// Set the cause.
    ///
    /// # Errors
    ///
    /// Returns error if a cause was already set
    fn init_cause(&self, cause: Arc<dyn NativeException>) -> CoreResult<()> {
        self.state()
            .cause
            .set(cause)
            .map_err(|_| CoreError::CauseAlreadyInitialized {
                class_name: self.type_name().to_string(),
            })
    }

    /// Append to the suppressed list
    fn add_suppressed(&self, suppressed: Arc<dyn NativeException>) {
        self.state()
            .suppressed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(suppressed);
    }
}

/// State common to every native exception.
pub struct ThrowableState {
    message: Option<String>,
    stack_trace: Vec<Frame>,
    cause: OnceLock<Arc<dyn NativeException>>,
    suppressed: Mutex<Vec<Arc<dyn NativeException>>>,
}

impl ThrowableState {
    /// Create state with an optional message and no stack
    #[must_use]
    pub fn new(message: Option<String>) -> Self {
        Self {
            message,
            stack_trace: Vec::new(),
            cause: OnceLock::new(),
            suppressed: Mutex::new(Vec::new()),
        }
    }

    /// Message, if any
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Captured stack
    #[must_use]
    pub fn stack_trace(&self) -> &[Frame] {
        &self.stack_trace
    }

    /// Cause, if set
    #[must_use]
    pub fn cause(&self) -> Option<Arc<dyn NativeException>> {
        self.cause.get().cloned()
    }

    /// Copy of the suppressed list
    #[must_use]
    pub fn suppressed(&self) -> Vec<Arc<dyn NativeException>> {
        self.suppressed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_stack_trace(&mut self, frames: Vec<Frame>) {
        self.stack_trace = frames;
    }
}

// Edges are printed by type name only: the graph may be cyclic.
impl fmt::Debug for ThrowableState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suppressed = self
            .suppressed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|s| s.type_name().to_string())
            .collect::<Vec<_>>();
        f.debug_struct("ThrowableState")
            .field("message", &self.message)
            .field("frames", &self.stack_trace.len())
            .field("cause", &self.cause.get().map(|c| c.type_name().to_string()))
            .field("suppressed", &suppressed)
            .finish()
    }
}

/// Exception of an arbitrary, caller-named type.
#[derive(Debug)]
pub struct Throwable {
    class_name: String,
    state: ThrowableState,
}

impl Throwable {
    /// Create an exception of the given type without a message
    #[must_use]
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            state: ThrowableState::new(None),
        }
    }

    /// Set the message
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.state.message = Some(message.into());
        self
    }

    /// Set the captured stack
    #[must_use]
    pub fn with_stack_trace(mut self, frames: Vec<Frame>) -> Self {
        self.state.set_stack_trace(frames);
        self
    }

    /// Share for linking into a graph
    #[must_use]
    pub fn into_shared(self) -> Arc<dyn NativeException> {
        Arc::new(self)
    }
}

impl NativeException for Throwable {
    fn type_name(&self) -> &str {
        &self.class_name
    }

    fn state(&self) -> &ThrowableState {
        &self.state
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Transaction failure carrying an integer error code.
#[derive(Debug)]
pub struct TransactionError {
    error_code: i32,
    state: ThrowableState,
}

impl TransactionError {
    /// Runtime type name
    pub const TYPE_NAME: &'static str = "causegraph.TransactionError";

    /// Create a transaction error
    #[must_use]
    pub fn new(error_code: i32, message: Option<String>) -> Self {
        Self {
            error_code,
            state: ThrowableState::new(message),
        }
    }

    /// Set the captured stack
    #[must_use]
    pub fn with_stack_trace(mut self, frames: Vec<Frame>) -> Self {
        self.state.set_stack_trace(frames);
        self
    }

    /// Error code
    #[must_use]
    pub fn error_code(&self) -> i32 {
        self.error_code
    }

    /// Share for linking into a graph
    #[must_use]
    pub fn into_shared(self) -> Arc<dyn NativeException> {
        Arc::new(self)
    }
}

impl NativeException for TransactionError {
    fn type_name(&self) -> &str {
        Self::TYPE_NAME
    }

    fn state(&self) -> &ThrowableState {
        &self.state
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Vendor SQL failure with driver specific state.
#[derive(Debug)]
pub struct SqlError {
    sql_state: String,
    vendor_code: i32,
    state: ThrowableState,
}

impl SqlError {
    /// Runtime type name
    pub const TYPE_NAME: &'static str = "causegraph.SqlError";

    /// Create a SQL error
    #[must_use]
    pub fn new(message: Option<String>, sql_state: impl Into<String>, vendor_code: i32) -> Self {
        Self {
            sql_state: sql_state.into(),
            vendor_code,
            state: ThrowableState::new(message),
        }
    }

    /// Five character SQL state
    #[must_use]
    pub fn sql_state(&self) -> &str {
        &self.sql_state
    }

    /// Driver specific code
    #[must_use]
    pub fn vendor_code(&self) -> i32 {
        self.vendor_code
    }

    /// Share for linking into a graph
    #[must_use]
    pub fn into_shared(self) -> Arc<dyn NativeException> {
        Arc::new(self)
    }
}

impl NativeException for SqlError {
    fn type_name(&self) -> &str {
        Self::TYPE_NAME
    }

    fn state(&self) -> &ThrowableState {
        &self.state
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
