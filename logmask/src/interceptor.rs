//! Logging around intercepted calls.
//!
//! The host's interception layer hands each call to a [`LogInterceptor`]
//! together with the call's arguments and a closure that runs the original
//! operation. The interceptor decides whether to log, logs the masked
//! arguments, runs the operation, logs the masked result and returns the
//! real, untouched result.
//!
//! Masking work never fails the call. Only the operation's own error reaches
//! the caller, and it does so unchanged.

use std::{borrow::Cow, fmt, sync::Arc};

use slog::{debug, info, trace, Logger};

use crate::{
    config::LogConfig,
    markers::{LogTarget, MarkerRegistry},
    masking::{FormatRegistry, Masker},
    policy::{decide, Decision, EffectiveMaskConfig},
    tree::LogValue,
};

/// Identity of an intercepted operation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Operation {
    owner: Cow<'static, str>,
    name: Cow<'static, str>,
}

impl Operation {
    /// `owner` is the fully-qualified path of the owning type.
    pub fn new(owner: impl Into<Cow<'static, str>>, name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// The operation `name` of `T`.
    pub fn of<T: LogTarget>(name: impl Into<Cow<'static, str>>) -> Self {
        Self::new(T::owner(), name)
    }

    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Last `::` segment of the owner path.
    #[must_use]
    pub fn simple_owner(&self) -> &str {
        self.owner.rsplit("::").next().unwrap_or(&self.owner)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.simple_owner(), self.name)
    }
}

/// Arguments of a decorated function, passed as one tuple.
///
/// Each element is logged as its own indexed argument.
pub trait CallArgs {
    fn log_values(&self) -> Vec<&dyn LogValue>;
}

impl CallArgs for () {
    fn log_values(&self) -> Vec<&dyn LogValue> {
        Vec::new()
    }
}

macro_rules! impl_call_args {
    ($($ty:ident $var:ident),+) => {
        impl<$($ty: LogValue),+> CallArgs for ($($ty,)+) {
            fn log_values(&self) -> Vec<&dyn LogValue> {
                let ($($var,)+) = self;
                let values: Vec<&dyn LogValue> = vec![$($var),+];
                values
            }
        }
    };
}

impl_call_args!(A a);
impl_call_args!(A a, B b);
impl_call_args!(A a, B b, C c);
impl_call_args!(A a, B b, C c, D d);
impl_call_args!(A a, B b, C c, D d, E e);
impl_call_args!(A a, B b, C c, D d, E e, F f);

/// Masks and logs calls to configured operations.
///
/// Shares its format and marker registries read-only, so one interceptor can
/// serve calls on any number of threads.
#[derive(Clone)]
pub struct LogInterceptor {
    config: LogConfig,
    formats: Arc<FormatRegistry>,
    markers: Arc<MarkerRegistry>,
    logger: Logger,
}

impl LogInterceptor {
    /// Creates an interceptor using the built-in formats.
    ///
    /// This crate's own scope is added to `config.exclude`.
    pub fn new(mut config: LogConfig, markers: Arc<MarkerRegistry>, logger: Logger) -> Self {
        config.exclude_own_scope();
        Self {
            config,
            formats: Arc::new(FormatRegistry::builtin()),
            markers,
            logger,
        }
    }

    /// Replaces the format registry.
    #[must_use]
    pub fn with_formats(mut self, formats: Arc<FormatRegistry>) -> Self {
        self.formats = formats;
        self
    }

    #[must_use]
    pub fn config(&self) -> &LogConfig {
        &self.config
    }

    #[must_use]
    pub fn formats(&self) -> &FormatRegistry {
        &self.formats
    }

    /// Wraps `operation` around `proceed`.
    ///
    /// Skipped calls go straight to `proceed` without converting anything.
    /// An `Err` from `proceed` is returned unchanged and no result is logged.
    pub fn intercept<R, E, F>(
        &self,
        operation: &Operation,
        args: &[&dyn LogValue],
        proceed: F,
    ) -> Result<R, E>
    where
        R: LogValue,
        F: FnOnce() -> Result<R, E>,
    {
        let Decision::Log(mask) = self.decision(operation) else {
            return proceed();
        };
        self.log_request(operation, &mask, args);
        let result = proceed()?;
        self.log_response(operation, &mask, &result);
        Ok(result)
    }

    /// Binds `function` to `operation`; see [`Decorated::call`].
    pub fn decorate<F>(&self, operation: Operation, function: F) -> Decorated<'_, F> {
        Decorated {
            interceptor: self,
            operation,
            function,
        }
    }

    /// Decides whether `operation` is logged, for hosts that drive the
    /// request and response steps themselves.
    #[must_use]
    pub fn decision(&self, operation: &Operation) -> Decision {
        if !self.config.applies_to(operation.owner()) {
            trace!(self.logger, "{} is outside the configured scopes", operation);
            return Decision::Skip;
        }
        let markers = self.markers.lookup(operation.owner(), operation.name());
        let decision = decide(self.config.mode, markers);
        if decision == Decision::Skip {
            debug!(
                self.logger,
                "[SKIPPED] {}.{} logging disabled",
                operation.simple_owner(),
                operation.name();
                "owner" => operation.owner(),
                "operation" => operation.name()
            );
        }
        decision
    }

    /// Logs each argument, masked with the request rules.
    pub fn log_request(
        &self,
        operation: &Operation,
        mask: &EffectiveMaskConfig,
        args: &[&dyn LogValue],
    ) {
        let masker = self.masker();
        for (index, arg) in args.iter().enumerate() {
            let masked = masker.mask(*arg, &mask.request, &mask.formats);
            info!(
                self.logger,
                "[REQ] {}.{} arg[{}] = {}",
                operation.simple_owner(),
                operation.name(),
                index,
                masked;
                "owner" => operation.owner(),
                "operation" => operation.name(),
                "index" => index,
                "payload" => &masked
            );
        }
    }

    /// Logs the result, masked with the response rules.
    pub fn log_response(&self, operation: &Operation, mask: &EffectiveMaskConfig, result: &dyn LogValue) {
        let masked = self.masker().mask(result, &mask.response, &mask.formats);
        info!(
            self.logger,
            "[RES] {}.{} Result: {}",
            operation.simple_owner(),
            operation.name(),
            masked;
            "owner" => operation.owner(),
            "operation" => operation.name(),
            "payload" => &masked
        );
    }

    fn masker(&self) -> Masker<'_> {
        Masker::new(
            &self.formats,
            &self.logger,
            self.config.max_depth,
            self.config.on_failure,
        )
    }
}

impl fmt::Debug for LogInterceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogInterceptor")
            .field("config", &self.config)
            .field("formats", &self.formats)
            .field("markers", &self.markers)
            .finish_non_exhaustive()
    }
}

/// A function bound to an operation and an interceptor.
pub struct Decorated<'i, F> {
    interceptor: &'i LogInterceptor,
    operation: Operation,
    function: F,
}

impl<F> Decorated<'_, F> {
    #[must_use]
    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    /// Calls the function with `args`, logging around it like
    /// [`LogInterceptor::intercept`].
    pub fn call<A, R, E>(&self, args: A) -> Result<R, E>
    where
        A: CallArgs,
        R: LogValue,
        F: Fn(A) -> Result<R, E>,
    {
        let Decision::Log(mask) = self.interceptor.decision(&self.operation) else {
            return (self.function)(args);
        };
        self.interceptor
            .log_request(&self.operation, &mask, &args.log_values());
        let result = (self.function)(args)?;
        self.interceptor
            .log_response(&self.operation, &mask, &result);
        Ok(result)
    }
}
