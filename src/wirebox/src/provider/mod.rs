mod arguments;
mod injectable;

use std::fmt::{Debug, Formatter, Result as FmtResult};

use crate::annotation::{AnnotationError, ClassId, Recorder, TypedRecorder};
use crate::util::any::AsAny;

pub use arguments::{ArgumentError, Arguments};
pub use injectable::Injectable;

/// Any object a provider can produce and a container can hand out.
pub trait Managed: AsAny + Send + Sync + 'static {}

impl<T> Managed for T where T: AsAny + Send + Sync + 'static {}

impl dyn Managed {
    /// Recovers the concrete type of a type-erased object, handing the
    /// object back unchanged when the type differs.
    pub fn downcast<T: Managed>(self: Box<Self>) -> Result<Box<T>, Box<dyn Managed>> {
        if (*self).as_any().is::<T>() {
            let object = self
                .into_any()
                .downcast::<T>()
                .unwrap_or_else(|_| unreachable!("`self` should be a `T`"));
            Ok(object)
        } else {
            Err(self)
        }
    }
}

/// A registered means of producing instances of one type: either a
/// constructor wired through recorded annotations, or a zero-argument
/// factory.
///
/// The two kinds are discriminated by an explicit variant tag rather than by
/// inspecting a callable's shape, so a registered value is always exactly one
/// of them.
pub enum Provider {
    Constructor(ConstructorProvider),
    Factory(FactoryProvider),
}

impl Provider {
    /// A constructor-type provider for `T`, implicitly named after `T`'s
    /// declared type name.
    pub fn constructor<T: Injectable>() -> Self {
        Self::Constructor(ConstructorProvider::new::<T>())
    }

    /// A factory-type provider. Factories carry no inferable name and must
    /// be registered under an explicit identifier.
    pub fn factory<T, F>(factory: F) -> Self
    where
        T: Managed,
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self::Factory(FactoryProvider::new(factory))
    }
}

impl Debug for Provider {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Constructor(provider) => f
                .debug_struct("Provider::Constructor")
                .field("name", &provider.name())
                .finish_non_exhaustive(),
            Self::Factory(_) => f.debug_struct("Provider::Factory").finish_non_exhaustive(),
        }
    }
}

/// The constructor-type [`Provider`] variant. Instantiation consults a
/// [`Recorder`] for the target's annotations and supplies the resolved
/// dependencies positionally.
pub struct ConstructorProvider {
    target: ClassId,
    name: &'static str,
    mark: fn(&dyn Recorder) -> Result<(), AnnotationError>,
    construct: fn(Arguments) -> Result<Box<dyn Managed>, ArgumentError>,
}

impl ConstructorProvider {
    fn new<T: Injectable>() -> Self {
        Self {
            target: ClassId::of::<T>(),
            name: T::NAME,
            mark: |recorder| recorder.mark_injectable::<T>(),
            construct: |arguments| {
                T::construct(arguments).map(|object| Box::new(object) as Box<dyn Managed>)
            },
        }
    }

    /// The implicit identifier: the target's declared type name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The identity under which the target's annotations are recorded.
    pub fn target(&self) -> ClassId {
        self.target
    }

    pub(crate) fn mark(&self, recorder: &dyn Recorder) -> Result<(), AnnotationError> {
        (self.mark)(recorder)
    }

    pub(crate) fn construct(
        &self,
        arguments: Arguments,
    ) -> Result<Box<dyn Managed>, ArgumentError> {
        (self.construct)(arguments)
    }
}

/// The factory-type [`Provider`] variant: a zero-argument callable invoked
/// once per request.
pub struct FactoryProvider {
    produce: Box<dyn Fn() -> Box<dyn Managed> + Send + Sync>,
}

impl FactoryProvider {
    fn new<T, F>(factory: F) -> Self
    where
        T: Managed,
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self {
            produce: Box::new(move || Box::new(factory()) as Box<dyn Managed>),
        }
    }

    pub(crate) fn produce(&self) -> Box<dyn Managed> {
        (self.produce)()
    }
}
