//! Listener registry of a canonical vocabulary element.

use std::fmt;
use std::rc::Rc;

use annodb_model::{DbId, Result, SystemError};

use super::VeChange;

/// Observer outside the value graph (a view, a log, a test probe).
pub trait ExternalVocabElementListener {
    fn ve_changed(&self, change: &VeChange);
    fn ve_deleted(&self, ve_id: DbId);
}

/// Internal listeners are ids of columns, predicates and column predicates
/// that instantiate the element; external listeners are shared observers.
#[derive(Clone, Default)]
pub struct VocabElementListeners {
    ve_id: DbId,
    internal: Vec<DbId>,
    external: Vec<Rc<dyn ExternalVocabElementListener>>,
}

impl VocabElementListeners {
    pub fn new(ve_id: DbId) -> Self {
        Self {
            ve_id,
            ..Self::default()
        }
    }

    pub fn ve_id(&self) -> DbId {
        self.ve_id
    }

    pub fn internal(&self) -> &[DbId] {
        &self.internal
    }

    pub fn num_external(&self) -> usize {
        self.external.len()
    }

    pub fn register_internal(&mut self, id: DbId) -> Result<()> {
        const CONTEXT: &str = "VocabElementListeners::register_internal()";
        id.require_valid(CONTEXT)?;
        if self.internal.contains(&id) {
            return Err(SystemError::invariant(
                CONTEXT,
                format!("{id} already registered"),
            ));
        }
        self.internal.push(id);
        Ok(())
    }

    pub fn deregister_internal(&mut self, id: DbId) -> Result<()> {
        const CONTEXT: &str = "VocabElementListeners::deregister_internal()";
        id.require_valid(CONTEXT)?;
        let pos = self
            .internal
            .iter()
            .position(|l| *l == id)
            .ok_or(SystemError::NotFound { context: CONTEXT, id })?;
        self.internal.remove(pos);
        Ok(())
    }

    pub fn register_external(&mut self, listener: Rc<dyn ExternalVocabElementListener>) -> Result<()> {
        if self.external.iter().any(|l| Rc::ptr_eq(l, &listener)) {
            return Err(SystemError::invariant(
                "VocabElementListeners::register_external()",
                "listener already registered",
            ));
        }
        self.external.push(listener);
        Ok(())
    }

    pub fn deregister_external(
        &mut self,
        listener: &Rc<dyn ExternalVocabElementListener>,
    ) -> Result<()> {
        let pos = self
            .external
            .iter()
            .position(|l| Rc::ptr_eq(l, listener))
            .ok_or_else(|| {
                SystemError::invariant(
                    "VocabElementListeners::deregister_external()",
                    "listener not registered",
                )
            })?;
        self.external.remove(pos);
        Ok(())
    }

    pub fn notify_change(&self, change: &VeChange) {
        for listener in &self.external {
            listener.ve_changed(change);
        }
    }

    pub fn notify_deletion(&self) {
        for listener in &self.external {
            listener.ve_deleted(self.ve_id);
        }
    }
}

impl fmt::Debug for VocabElementListeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VocabElementListeners")
            .field("ve_id", &self.ve_id)
            .field("internal", &self.internal)
            .field("external", &self.external.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    #[derive(Default)]
    struct Probe {
        deleted: RefCell<Vec<DbId>>,
    }

    impl ExternalVocabElementListener for Probe {
        fn ve_changed(&self, _change: &VeChange) {}

        fn ve_deleted(&self, ve_id: DbId) {
            self.deleted.borrow_mut().push(ve_id);
        }
    }

    #[test]
    fn internal_registration() {
        let mut listeners = VocabElementListeners::new(DbId::new(1));
        listeners.register_internal(DbId::new(5)).unwrap();
        assert!(listeners.register_internal(DbId::new(5)).is_err());
        assert!(listeners.register_internal(DbId::INVALID).is_err());
        listeners.deregister_internal(DbId::new(5)).unwrap();
        assert!(listeners.deregister_internal(DbId::new(5)).is_err());
    }

    #[test]
    fn external_notification() {
        let probe = Rc::new(Probe::default());
        let handle: Rc<dyn ExternalVocabElementListener> = probe.clone();
        let mut listeners = VocabElementListeners::new(DbId::new(3));
        listeners.register_external(Rc::clone(&handle)).unwrap();
        assert!(listeners.register_external(Rc::clone(&handle)).is_err());
        listeners.notify_deletion();
        assert_eq!(*probe.deleted.borrow(), vec![DbId::new(3)]);
        listeners.deregister_external(&handle).unwrap();
        assert_eq!(listeners.num_external(), 0);
    }
}
