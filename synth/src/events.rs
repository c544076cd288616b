//! Change notifications raised by the [`Controller`](crate::controller::Controller).
//!
//! Observers are called synchronously, on the caller's thread, right after the
//! mutation that caused the event has been committed to the register cache.

/// Events sent from the controller to whoever mirrors its state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SynthEvent {
    /// A single register got a new value.
    ParameterChanged(u16),
    /// Carrier flags or modulation routing changed.
    /// Raised once per topology edit, not once per register.
    TopologyChanged,
    /// The working patch was replaced, renamed or moved to another slot.
    PatchChanged { slot: u8 },
}

pub trait Observer {
    fn on_event(&mut self, event: SynthEvent);
}

impl<F> Observer for F
where
    F: FnMut(SynthEvent),
{
    fn on_event(&mut self, event: SynthEvent) {
        self(event);
    }
}

#[cfg(test)]
pub(crate) mod recorder {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::{Observer, SynthEvent};

    /// Collects every event; clones share the same log.
    #[derive(Clone, Default)]
    pub struct Recorder(Rc<RefCell<Vec<SynthEvent>>>);

    impl Recorder {
        pub fn events(&self) -> Vec<SynthEvent> {
            self.0.borrow().clone()
        }

        pub fn clear(&self) {
            self.0.borrow_mut().clear();
        }

        pub fn count(&self, event: SynthEvent) -> usize {
            self.0.borrow().iter().filter(|e| **e == event).count()
        }
    }

    impl Observer for Recorder {
        fn on_event(&mut self, event: SynthEvent) {
            self.0.borrow_mut().push(event);
        }
    }
}
