use crate::annotation::{AnnotationError, Recorder};
use crate::provider::{ArgumentError, Arguments, Managed};

/// A type with a dependency-injected constructor.
///
/// Usually, you don't need to implement [`Injectable`] manually, since the
/// [`injectable`] attribute generates the implementation from an annotated
/// `impl` block. In case you really want to write one on your own, take a
/// look at the following code snippet:
///
/// ```rust
/// # use wirebox::annotation::{AnnotationError, Recorder, TypedRecorder};
/// # use wirebox::provider::{ArgumentError, Arguments, Injectable};
/// #
/// struct Heater {
///     power: u32,
/// }
///
/// struct Boiler {
///     heater: Heater,
/// }
///
/// impl Injectable for Boiler {
///     const NAME: &'static str = "Boiler";
///
///     fn annotate(recorder: &dyn Recorder) -> Result<(), AnnotationError> {
///         recorder.annotate::<Self>(0, "Heater")
///     }
///
///     fn construct(mut arguments: Arguments) -> Result<Self, ArgumentError> {
///         let heater = arguments.take()?;
///         arguments.finish()?;
///         Ok(Self { heater })
///     }
/// }
/// ```
///
/// [`injectable`]: crate::injectable
pub trait Injectable: Managed + Sized {
    /// The declared type name, used as the implicit registration identifier.
    const NAME: &'static str;

    /// Records the constructor's parameter annotations. The default records
    /// nothing, for constructors that take no dependencies or whose wiring
    /// is declared through explicit [`annotate`] calls.
    ///
    /// # Errors
    ///
    /// Fails if a parameter index ends up annotated twice.
    ///
    /// [`annotate`]: crate::annotation::annotate
    fn annotate(recorder: &dyn Recorder) -> Result<(), AnnotationError> {
        let _ = recorder;
        Ok(())
    }

    /// Builds an instance from resolved arguments supplied in parameter
    /// order.
    ///
    /// # Errors
    ///
    /// Fails if the arguments don't match the constructor's parameter list.
    fn construct(arguments: Arguments) -> Result<Self, ArgumentError>;
}
