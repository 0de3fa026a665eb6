use std::borrow::Cow;

use crate::container::ContainerError;
use crate::provider::{Injectable, Provider};

/// A value that designates a registry identifier: a string designates
/// itself, and a provider designates its declared name when it has one.
pub trait AsKey {
    /// Resolves the identifier this key designates.
    ///
    /// # Errors
    ///
    /// Fails with [`ContainerError::InvalidRegistration`] for keys with no
    /// inferable name, i.e. factory providers.
    fn resolve_name(&self) -> Result<Cow<'_, str>, ContainerError>;
}

impl AsKey for str {
    fn resolve_name(&self) -> Result<Cow<'_, str>, ContainerError> {
        Ok(Cow::Borrowed(self))
    }
}

impl AsKey for String {
    fn resolve_name(&self) -> Result<Cow<'_, str>, ContainerError> {
        Ok(Cow::Borrowed(self))
    }
}

impl AsKey for Provider {
    fn resolve_name(&self) -> Result<Cow<'_, str>, ContainerError> {
        match self {
            Provider::Constructor(provider) => Ok(Cow::Borrowed(provider.name())),
            Provider::Factory(_) => Err(ContainerError::InvalidRegistration),
        }
    }
}

impl<K: AsKey + ?Sized> AsKey for &K {
    fn resolve_name(&self) -> Result<Cow<'_, str>, ContainerError> {
        (**self).resolve_name()
    }
}

/// The implicit identifier of an injectable type, for call sites that name
/// the type itself rather than spelling its identifier out.
pub fn of<T: Injectable>() -> &'static str {
    T::NAME
}

#[cfg(test)]
mod tests {
    use crate::provider::{ArgumentError, Arguments};

    use super::*;

    struct Radiator;

    impl Injectable for Radiator {
        const NAME: &'static str = "Radiator";

        fn construct(arguments: Arguments) -> Result<Self, ArgumentError> {
            arguments.finish()?;
            Ok(Self)
        }
    }

    #[test]
    fn string_keys_resolve_to_themselves() {
        assert_eq!("Radiator".resolve_name().unwrap(), "Radiator");
        assert_eq!(
            String::from("Radiator").resolve_name().unwrap(),
            "Radiator"
        );
    }

    #[test]
    fn of_resolves_to_the_declared_type_name() {
        assert_eq!(of::<Radiator>(), "Radiator");
    }

    #[test]
    fn constructor_provider_keys_resolve_to_the_declared_type_name() {
        let provider = Provider::constructor::<Radiator>();
        assert_eq!(provider.resolve_name().unwrap(), "Radiator");
    }

    #[test]
    fn factory_provider_keys_fail_to_resolve() {
        let provider = Provider::factory(|| 42i32);
        assert!(matches!(
            provider.resolve_name(),
            Err(ContainerError::InvalidRegistration)
        ));
    }
}
