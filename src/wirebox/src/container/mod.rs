mod provider_map;

use std::any;
use std::sync::Arc;

use snafu::prelude::*;

use crate::annotation::{self, AnnotationError, Recorder};
use crate::key::AsKey;
use crate::provider::{ArgumentError, Arguments, ConstructorProvider, Managed, Provider};
use crate::util::any::AsAny;

use provider_map::ProviderMap;

/// The identifier→provider registry and its resolution engine.
///
/// Registration mutates the registry; resolution never does, so a failed
/// [`get`] leaves the container exactly as it was. Each container owns its
/// registry, while constructor annotations live in a shared [`Recorder`]
/// (the process-wide store unless one is injected), so one annotated type
/// can be resolved by any number of independent containers.
///
/// [`get`]: Container::get
pub struct Container {
    providers: ProviderMap,
    annotations: Arc<dyn Recorder>,
}

impl Container {
    /// An empty container consulting the process-wide annotation store.
    pub fn new() -> Self {
        Self::with_recorder(annotation::global())
    }

    /// An empty container consulting `annotations` instead of the
    /// process-wide store, for callers that want isolated wiring metadata.
    pub fn with_recorder(annotations: Arc<dyn Recorder>) -> Self {
        Self {
            providers: ProviderMap::new(),
            annotations,
        }
    }

    /// Registers `provider` under its implicit identifier and returns the
    /// container for chained registration.
    ///
    /// # Errors
    ///
    /// Fails with [`ContainerError::InvalidRegistration`] for factory
    /// providers, which have no inferable name, and with
    /// [`ContainerError::AnnotationConflict`] when recording the target's
    /// declared annotations fails.
    pub fn register_provider(&mut self, provider: Provider) -> Result<&mut Self, ContainerError> {
        let identifier = provider.resolve_name()?.into_owned();
        self.insert(identifier, provider)
    }

    /// Registers `provider` under an explicit key, which may be a string or
    /// anything else resolving to an identifier.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Container::register_provider`], except that a
    /// factory registered under a string key is fine.
    pub fn register_provider_as<K>(
        &mut self,
        provider: Provider,
        key: K,
    ) -> Result<&mut Self, ContainerError>
    where
        K: AsKey,
    {
        let identifier = key.resolve_name()?.into_owned();
        self.insert(identifier, provider)
    }

    fn insert(
        &mut self,
        identifier: String,
        provider: Provider,
    ) -> Result<&mut Self, ContainerError> {
        if let Provider::Constructor(constructor) = &provider {
            constructor
                .mark(self.annotations.as_ref())
                .map_err(|source| ContainerError::AnnotationConflict {
                    identifier: identifier.clone(),
                    source,
                })?;
        }
        self.providers.insert(identifier, provider);
        Ok(self)
    }

    /// Resolves `key` to an instance of `T`, recursively resolving the
    /// annotated dependencies of constructor providers along the way.
    ///
    /// # Errors
    ///
    /// Returns the error raised wherever resolution first got stuck; errors
    /// from nested dependencies propagate unwrapped.
    pub fn get<T, K>(&self, key: K) -> Result<T, ContainerError>
    where
        T: Managed,
        K: AsKey,
    {
        let identifier = key.resolve_name()?.into_owned();
        let object = self.resolve(&identifier)?;
        match object.downcast::<T>() {
            Ok(object) => Ok(*object),
            Err(object) => Err(ContainerError::TypeMismatch {
                identifier,
                expected: any::type_name::<T>(),
                actual: (*object).type_name(),
            }),
        }
    }

    /// The type-erased variant of [`Container::get`].
    ///
    /// # Errors
    ///
    /// Same conditions as [`Container::get`], minus the downcast.
    pub fn dyn_get(&self, key: &dyn AsKey) -> Result<Box<dyn Managed>, ContainerError> {
        let identifier = key.resolve_name()?;
        self.resolve(identifier.as_ref())
    }

    fn resolve(&self, identifier: &str) -> Result<Box<dyn Managed>, ContainerError> {
        let Some(provider) = self.providers.get(identifier) else {
            return Err(ContainerError::NotRegistered {
                identifier: identifier.to_owned(),
            });
        };
        match provider {
            Provider::Constructor(constructor) => self.construct(identifier, constructor),
            Provider::Factory(factory) => Ok(factory.produce()),
        }
    }

    fn construct(
        &self,
        identifier: &str,
        constructor: &ConstructorProvider,
    ) -> Result<Box<dyn Managed>, ContainerError> {
        let mut annotations = self.annotations.dyn_annotations_of(&constructor.target());
        annotations.sort_by_key(|annotation| annotation.parameter_index);

        let mut values = Vec::with_capacity(annotations.len());
        for (position, annotation) in annotations.iter().enumerate() {
            // An index disagreeing with its sorted position means the
            // sequence has a gap or a duplicate; invoking the constructor
            // positionally would bind arguments to the wrong parameters.
            if annotation.parameter_index != position {
                return Err(ContainerError::AnnotationGap {
                    identifier: identifier.to_owned(),
                    index: position,
                });
            }
            values.push(self.resolve(&annotation.identifier)?);
        }

        constructor
            .construct(Arguments::new(values))
            .map_err(|source| ContainerError::InvalidProvider {
                identifier: identifier.to_owned(),
                source,
            })
    }
}

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum ContainerError {
    #[snafu(display("no provider is registered under the identifier `{identifier}`"))]
    #[non_exhaustive]
    NotRegistered { identifier: String },
    #[snafu(display(
        "a factory provider has no inferable name and requires an explicit string identifier"
    ))]
    InvalidRegistration,
    #[snafu(display(
        "the constructor registered under `{identifier}` does not accept its resolved arguments"
    ))]
    #[non_exhaustive]
    InvalidProvider {
        identifier: String,
        source: ArgumentError,
    },
    #[snafu(display(
        "the constructor registered under `{identifier}` has no annotation for parameter {index}"
    ))]
    #[non_exhaustive]
    AnnotationGap { identifier: String, index: usize },
    #[snafu(display("recording constructor annotations for `{identifier}` failed"))]
    #[non_exhaustive]
    AnnotationConflict {
        identifier: String,
        source: AnnotationError,
    },
    #[snafu(display("the object resolved under `{identifier}` is a `{actual}`, not a `{expected}`"))]
    #[non_exhaustive]
    TypeMismatch {
        identifier: String,
        expected: &'static str,
        actual: &'static str,
    },
}
