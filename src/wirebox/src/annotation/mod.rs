use std::any::{self, TypeId};
use std::collections::{HashMap, HashSet};
use std::fmt::{Debug, Display, Formatter, Result as FmtResult};
use std::hash::{Hash, Hasher};
use std::sync::{Arc, LazyLock};

use parking_lot::RwLock;
use snafu::prelude::*;

use crate::provider::Injectable;

/// Stable identity of an annotated constructor. Two values compare equal
/// exactly when they refer to the same type; the name is carried for
/// diagnostics only.
#[derive(Clone, Copy)]
pub struct ClassId {
    id: TypeId,
    name: &'static str,
}

impl ClassId {
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: any::type_name::<T>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for ClassId {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ClassId {}

impl Hash for ClassId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Debug for ClassId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(self, f)
    }
}

impl Display for ClassId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.name)
    }
}

/// One recorded wiring declaration: the constructor parameter at
/// `parameter_index` is filled by resolving `identifier`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub parameter_index: usize,
    pub identifier: String,
}

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum AnnotationError {
    #[snafu(display("parameter {index} of `{target}` is annotated more than once"))]
    #[non_exhaustive]
    IndexDuplicated { target: ClassId, index: usize },
}

/// Records and retrieves constructor parameter annotations, keyed by class
/// identity rather than by container. Annotations are type-level metadata:
/// once recorded they are visible to every container consulting the same
/// recorder, so one annotated type can be instantiated by any number of
/// independent containers.
#[cfg_attr(test, mockall::automock)]
pub trait Recorder: Send + Sync {
    /// Appends one annotation to `target`'s recorded sequence.
    ///
    /// # Errors
    ///
    /// Fails if `parameter_index` is already annotated for `target`.
    fn dyn_annotate(
        &self,
        target: ClassId,
        parameter_index: usize,
        identifier: &str,
    ) -> Result<(), AnnotationError>;

    /// Returns `target`'s recorded sequence in declaration order, or an
    /// empty one if nothing was ever recorded.
    fn dyn_annotations_of(&self, target: &ClassId) -> Vec<Annotation>;

    /// Returns `true` only on the first call for `target`.
    fn mark_once(&self, target: ClassId) -> bool;
}

/// A static variant of the [`Recorder`] trait, leveraging static dispatch
/// over the annotated type.
pub trait TypedRecorder: Recorder {
    fn annotate<T: 'static>(
        &self,
        parameter_index: usize,
        identifier: &str,
    ) -> Result<(), AnnotationError> {
        self.dyn_annotate(ClassId::of::<T>(), parameter_index, identifier)
    }

    fn annotations_of<T: 'static>(&self) -> Vec<Annotation> {
        self.dyn_annotations_of(&ClassId::of::<T>())
    }

    /// Ensures `T`'s declared annotations are recorded. Idempotent: only the
    /// first call per class runs [`Injectable::annotate`], no matter how
    /// often the type is registered.
    fn mark_injectable<T: Injectable>(&self) -> Result<(), AnnotationError> {
        if self.mark_once(ClassId::of::<T>()) {
            T::annotate(self.upcast_dyn())
        } else {
            Ok(())
        }
    }

    /// Returns a reference to `self` as a [`Recorder`].
    fn upcast_dyn(&self) -> &dyn Recorder;
}

impl<R: Recorder> TypedRecorder for R {
    fn upcast_dyn(&self) -> &dyn Recorder {
        self
    }
}

impl TypedRecorder for dyn Recorder + '_ {
    fn upcast_dyn(&self) -> &dyn Recorder {
        self
    }
}

/// The concrete [`Recorder`]: a class-keyed annotation table behind a lock,
/// since recording is a read-modify-write of the target's sequence.
pub struct AnnotationStore {
    inner: RwLock<StoreInner>,
}

#[derive(Default)]
struct StoreInner {
    annotations: HashMap<ClassId, Vec<Annotation>>,
    marked: HashSet<ClassId>,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(StoreInner::default()),
        }
    }

    /// Discards every recorded annotation and mark, so a store can be reused
    /// across test cases.
    pub fn reset(&self) {
        let mut inner = self.inner.write();
        inner.annotations.clear();
        inner.marked.clear();
    }
}

impl Recorder for AnnotationStore {
    fn dyn_annotate(
        &self,
        target: ClassId,
        parameter_index: usize,
        identifier: &str,
    ) -> Result<(), AnnotationError> {
        let mut inner = self.inner.write();
        let sequence = inner.annotations.entry(target).or_default();
        if sequence
            .iter()
            .any(|annotation| annotation.parameter_index == parameter_index)
        {
            return Err(AnnotationError::IndexDuplicated {
                target,
                index: parameter_index,
            });
        }
        sequence.push(Annotation {
            parameter_index,
            identifier: identifier.to_owned(),
        });
        Ok(())
    }

    fn dyn_annotations_of(&self, target: &ClassId) -> Vec<Annotation> {
        self.inner
            .read()
            .annotations
            .get(target)
            .cloned()
            .unwrap_or_default()
    }

    fn mark_once(&self, target: ClassId) -> bool {
        self.inner.write().marked.insert(target)
    }
}

static GLOBAL: LazyLock<Arc<AnnotationStore>> = LazyLock::new(|| Arc::new(AnnotationStore::new()));

/// The process-wide annotation store consulted by containers by default.
pub fn global() -> Arc<AnnotationStore> {
    Arc::clone(&GLOBAL)
}

/// Records one annotation for `T` in the process-wide store.
pub fn annotate<T: 'static>(
    parameter_index: usize,
    identifier: &str,
) -> Result<(), AnnotationError> {
    GLOBAL.annotate::<T>(parameter_index, identifier)
}

/// Reads `T`'s recorded annotations from the process-wide store.
pub fn annotations_of<T: 'static>() -> Vec<Annotation> {
    GLOBAL.annotations_of::<T>()
}

/// Idempotently records `T`'s declared annotations in the process-wide
/// store.
pub fn mark_injectable<T: Injectable>() -> Result<(), AnnotationError> {
    GLOBAL.mark_injectable::<T>()
}

#[cfg(test)]
mod tests {
    use crate::provider::{ArgumentError, Arguments};

    use super::*;

    struct Thermostat;

    impl Injectable for Thermostat {
        const NAME: &'static str = "Thermostat";

        fn annotate(recorder: &dyn Recorder) -> Result<(), AnnotationError> {
            recorder.annotate::<Self>(0, "Sensor")
        }

        fn construct(mut arguments: Arguments) -> Result<Self, ArgumentError> {
            let _sensor: i32 = arguments.take()?;
            arguments.finish()?;
            Ok(Self)
        }
    }

    #[test]
    fn class_id_equality_tracks_type_identity() {
        assert_eq!(ClassId::of::<i32>(), ClassId::of::<i32>());
        assert_ne!(ClassId::of::<i32>(), ClassId::of::<i64>());
    }

    #[test]
    fn annotation_store_returns_annotations_in_declaration_order() {
        let store = AnnotationStore::new();
        store.annotate::<Thermostat>(1, "Backup").unwrap();
        store.annotate::<Thermostat>(0, "Sensor").unwrap();

        let annotations = store.annotations_of::<Thermostat>();
        assert_eq!(
            annotations,
            vec![
                Annotation {
                    parameter_index: 1,
                    identifier: String::from("Backup"),
                },
                Annotation {
                    parameter_index: 0,
                    identifier: String::from("Sensor"),
                },
            ]
        );
    }

    #[test]
    fn annotation_store_returns_empty_sequence_when_never_recorded() {
        let store = AnnotationStore::new();
        assert!(store.annotations_of::<Thermostat>().is_empty());
    }

    #[test]
    fn annotation_store_annotate_fails_when_index_is_duplicated() {
        let store = AnnotationStore::new();
        store.annotate::<Thermostat>(0, "Sensor").unwrap();

        assert!(matches!(
            store.annotate::<Thermostat>(0, "Backup"),
            Err(AnnotationError::IndexDuplicated { index: 0, .. })
        ));
    }

    #[test]
    fn annotation_store_mark_injectable_records_once() {
        let store = AnnotationStore::new();
        store.mark_injectable::<Thermostat>().unwrap();
        store.mark_injectable::<Thermostat>().unwrap();

        assert_eq!(store.annotations_of::<Thermostat>().len(), 1);
    }

    #[test]
    fn annotation_store_reset_clears_annotations_and_marks() {
        let store = AnnotationStore::new();
        store.mark_injectable::<Thermostat>().unwrap();

        store.reset();
        assert!(store.annotations_of::<Thermostat>().is_empty());

        store.mark_injectable::<Thermostat>().unwrap();
        assert_eq!(store.annotations_of::<Thermostat>().len(), 1);
    }
}
