//! The single in-progress edit (or payment, or pending delete) of a page.
//!
//! Opening a new draft replaces the old one, so a page never has two records
//! under edit. A failed submit returns the draft to `Open` with its message;
//! a successful one clears the slot.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Open,
    Submitting,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Draft<D> {
    pub value: D,
    pub phase: Phase,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DraftSlot<D> {
    current: Option<Draft<D>>,
}

impl<D> Default for DraftSlot<D> {
    fn default() -> Self {
        Self { current: None }
    }
}

impl<D> DraftSlot<D> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, value: D) {
        self.current = Some(Draft {
            value,
            phase: Phase::Open,
            error: None,
        });
    }

    /// Cancel is refused while a submit is in flight
    pub fn cancel(&mut self) -> bool {
        if self
            .current
            .as_ref()
            .is_some_and(|d| d.phase == Phase::Submitting)
        {
            return false;
        }
        self.current = None;
        true
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }

    pub fn get(&self) -> Option<&Draft<D>> {
        self.current.as_ref()
    }

    pub fn value(&self) -> Option<&D> {
        self.current.as_ref().map(|d| &d.value)
    }

    /// Edit the draft's value; not allowed while submitting
    pub fn value_mut(&mut self) -> Option<&mut D> {
        self.current
            .as_mut()
            .filter(|d| d.phase == Phase::Open)
            .map(|d| &mut d.value)
    }

    pub fn error(&self) -> Option<&str> {
        self.current.as_ref().and_then(|d| d.error.as_deref())
    }

    /// Move to `Submitting`, clearing any previous message
    pub fn begin_submit(&mut self) -> Option<&D> {
        let draft = self.current.as_mut()?;
        if draft.phase == Phase::Submitting {
            return None;
        }
        draft.phase = Phase::Submitting;
        draft.error = None;
        Some(&draft.value)
    }

    /// Back to `Open` with a message for the user
    pub fn fail(&mut self, message: impl Into<String>) {
        if let Some(draft) = self.current.as_mut() {
            draft.phase = Phase::Open;
            draft.error = Some(message.into());
        }
    }

    /// Submit succeeded; the draft is gone
    pub fn commit(&mut self) -> Option<D> {
        self.current.take().map(|d| d.value)
    }
}
