use crate::symbol::Label;

/// The label-stack state machine described in §4.7.
///
/// States are the current top of the `(startLabels, endLabels)` stacks, initially empty.
/// `push_loop`/`pop_loop` model `pushLabel`/`popLabel`; unlabeled `break`/`continue` consume the
/// innermost entry, labeled ones search by name. Reaching method end with non-empty stacks, or
/// popping an empty stack, is an internal invariant violation (§4.7) — those are lowering bugs,
/// not user errors, so they panic rather than returning a [`crate::error::LoweringError`].
#[derive(Debug, Default)]
pub struct LabelStack {
    frames: Vec<LoopFrame>,
}

#[derive(Debug, Clone)]
struct LoopFrame {
    /// The user-declared label on this loop/switch, if any (from `Stmt::Labeled`).
    user_label: Option<String>,
    /// Where an unlabeled/matching `continue` jumps.
    continue_target: Label,
    /// Where an unlabeled/matching `break` jumps.
    break_target: Label,
}

impl LabelStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_loop(&mut self, user_label: Option<String>, continue_target: Label, break_target: Label) {
        self.frames.push(LoopFrame {
            user_label,
            continue_target,
            break_target,
        });
    }

    pub fn pop_loop(&mut self) {
        self.frames
            .pop()
            .expect("label stack underflow: popped a loop frame with none pushed");
    }

    /// Resolve an unlabeled or labeled `break`'s target.
    pub fn break_target(&self, label: Option<&str>) -> Label {
        self.resolve(label, |frame| frame.break_target.clone())
    }

    /// Resolve an unlabeled or labeled `continue`'s target.
    pub fn continue_target(&self, label: Option<&str>) -> Label {
        self.resolve(label, |frame| frame.continue_target.clone())
    }

    fn resolve(&self, label: Option<&str>, pick: impl Fn(&LoopFrame) -> Label) -> Label {
        match label {
            None => {
                let frame = self
                    .frames
                    .last()
                    .expect("break/continue with no enclosing loop: lowering should have rejected this earlier");
                pick(frame)
            }
            Some(name) => {
                let frame = self
                    .frames
                    .iter()
                    .rev()
                    .find(|frame| frame.user_label.as_deref() == Some(name))
                    .unwrap_or_else(|| panic!("labeled break/continue to unknown label `{name}`"));
                pick(frame)
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlabeled_break_uses_innermost_frame() {
        let mut stack = LabelStack::new();
        stack.push_loop(None, Label::new("outer_start"), Label::new("outer_end"));
        stack.push_loop(None, Label::new("inner_start"), Label::new("inner_end"));
        assert_eq!(stack.break_target(None).as_str(), "inner_end");
        assert_eq!(stack.continue_target(None).as_str(), "inner_start");
        stack.pop_loop();
        assert_eq!(stack.break_target(None).as_str(), "outer_end");
        stack.pop_loop();
        assert!(stack.is_empty());
    }

    #[test]
    fn labeled_break_escapes_to_named_frame() {
        let mut stack = LabelStack::new();
        stack.push_loop(Some("outer".into()), Label::new("outer_start"), Label::new("outer_end"));
        stack.push_loop(None, Label::new("inner_start"), Label::new("inner_end"));
        assert_eq!(stack.break_target(Some("outer")).as_str(), "outer_end");
    }

    #[test]
    #[should_panic(expected = "label stack underflow")]
    fn popping_empty_stack_panics() {
        let mut stack = LabelStack::new();
        stack.pop_loop();
    }
}
