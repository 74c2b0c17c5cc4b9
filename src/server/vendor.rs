//! Vendor service model.
//!
//! The vendor SDK is an opaque table of named, possibly asynchronous
//! functions that appears inside the embedded context at some point after
//! its script starts loading. This module describes that table
//! ([`VendorService`]) and how its presence is probed ([`VendorLocator`]).
//!
//! Nothing here caches function references: names and functions are read
//! fresh on every lookup, since the vendor owns the table and may mutate it.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use parking_lot::RwLock;
use serde_json::Value;

// ============================================================================
// Types
// ============================================================================

/// Future returned by a vendor function.
pub type VendorFuture = BoxFuture<'static, Result<Value, VendorError>>;

/// A callable vendor function taking positional arguments.
pub type VendorFunction = Arc<dyn Fn(Vec<Value>) -> VendorFuture + Send + Sync>;

/// Wraps an async closure as a [`VendorFunction`].
///
/// # Example
///
/// ```ignore
/// let get_cards = vendor_fn(|_args| async { Ok(json!({"cards": []})) });
/// ```
pub fn vendor_fn<F, Fut>(f: F) -> VendorFunction
where
    F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, VendorError>> + Send + 'static,
{
    Arc::new(move |args| f(args).boxed())
}

// ============================================================================
// VendorError
// ============================================================================

/// Failure raised by a vendor function.
#[derive(Debug, Clone, PartialEq)]
pub enum VendorError {
    /// An error object with a message.
    Message(String),
    /// Some other thrown value, reported by its string form.
    Thrown(Value),
}

impl VendorError {
    /// Creates an error with a message.
    #[inline]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    /// Creates an error from an arbitrary thrown value.
    #[inline]
    pub fn thrown(value: Value) -> Self {
        Self::Thrown(value)
    }

    /// Text sent back to the host: the message, or the string form of the
    /// thrown value when there is no message.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Message(message) if !message.is_empty() => message.clone(),
            Self::Message(_) => "Error".to_string(),
            Self::Thrown(Value::String(text)) => text.clone(),
            Self::Thrown(value) => value.to_string(),
        }
    }
}

impl fmt::Display for VendorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

impl std::error::Error for VendorError {}

// ============================================================================
// VendorService
// ============================================================================

/// The vendor SDK's runtime object.
pub trait VendorService: Send + Sync {
    /// Names of the currently exposed functions, in declaration order.
    fn method_names(&self) -> Vec<String>;

    /// Looks up a callable function by name.
    fn function(&self, name: &str) -> Option<VendorFunction>;
}

/// Mutable in-process vendor service.
///
/// Functions keep their registration order, which is the order reported by
/// [`VendorService::method_names`].
#[derive(Default)]
pub struct FunctionTable {
    functions: RwLock<Vec<(String, VendorFunction)>>,
}

impl FunctionTable {
    /// Creates an empty table.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a function, builder style.
    #[must_use]
    pub fn with_function(self, name: impl Into<String>, function: VendorFunction) -> Self {
        self.register(name, function);
        self
    }

    /// Adds or replaces a function.
    pub fn register(&self, name: impl Into<String>, function: VendorFunction) {
        let name = name.into();
        let mut functions = self.functions.write();
        match functions.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = function,
            None => functions.push((name, function)),
        }
    }

    /// Removes a function. Returns `true` if it existed.
    pub fn unregister(&self, name: &str) -> bool {
        let mut functions = self.functions.write();
        let before = functions.len();
        functions.retain(|(existing, _)| existing != name);
        functions.len() != before
    }
}

impl VendorService for FunctionTable {
    fn method_names(&self) -> Vec<String> {
        self.functions
            .read()
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    fn function(&self, name: &str) -> Option<VendorFunction> {
        self.functions
            .read()
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, function)| Arc::clone(function))
    }
}

impl fmt::Debug for FunctionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionTable")
            .field("methods", &self.method_names())
            .finish()
    }
}

// ============================================================================
// VendorLocator
// ============================================================================

/// Probes for the vendor service's presence.
pub trait VendorLocator: Send + Sync {
    /// Returns the service if it is currently available.
    fn locate(&self) -> Option<Arc<dyn VendorService>>;
}

/// Slot that the vendor script fills once it has loaded.
///
/// Clones share the same slot.
#[derive(Clone, Default)]
pub struct VendorSlot {
    service: Arc<RwLock<Option<Arc<dyn VendorService>>>>,
}

impl VendorSlot {
    /// Creates an empty slot.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a slot that already holds `service`.
    #[must_use]
    pub fn installed(service: Arc<dyn VendorService>) -> Self {
        let slot = Self::new();
        slot.install(service);
        slot
    }

    /// Makes `service` visible to locators.
    pub fn install(&self, service: Arc<dyn VendorService>) {
        *self.service.write() = Some(service);
    }

    /// Removes the service.
    pub fn clear(&self) {
        *self.service.write() = None;
    }

    /// Returns `true` if a service is installed.
    #[inline]
    #[must_use]
    pub fn is_installed(&self) -> bool {
        self.service.read().is_some()
    }
}

impl VendorLocator for VendorSlot {
    fn locate(&self) -> Option<Arc<dyn VendorService>> {
        self.service.read().clone()
    }
}

impl fmt::Debug for VendorSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VendorSlot")
            .field("installed", &self.is_installed())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
