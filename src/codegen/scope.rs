/// Names bound in the function being generated, one frame per Go block.
///
/// Frames mirror Go's block scoping so that the generator can tell a first
/// assignment (which declares) from a later one (which mutates), and can find
/// locals that were never read.
#[derive(Debug, Default)]
pub struct Scopes {
    frames: Vec<Vec<Local>>,
}

#[derive(Debug)]
struct Local {
    name: Box<str>,
    used: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Binding {
    /// The name was not visible and is now declared in the innermost frame.
    Declare,
    /// The name was already visible.
    Reassign,
}

impl Scopes {
    pub fn push(&mut self) {
        self.frames.push(Vec::new());
    }

    /// Pops the innermost frame, returning the names declared in it that were
    /// never read, in declaration order.
    pub fn pop(&mut self) -> Vec<Box<str>> {
        let frame = self.frames.pop().unwrap_or_default();
        frame
            .into_iter()
            .filter(|local| !local.used)
            .map(|local| local.name)
            .collect()
    }

    /// Declares `name` in the innermost frame.
    pub fn declare(&mut self, name: &str, used: bool) {
        if let Some(frame) = self.frames.last_mut() {
            frame.push(Local {
                name: name.into(),
                used,
            });
        }
    }

    /// Records an assignment to `name`.
    pub fn assign(&mut self, name: &str) -> Binding {
        if self.lookup(name).is_some() {
            Binding::Reassign
        } else {
            self.declare(name, false);
            Binding::Declare
        }
    }

    /// Records a read of `name`. Unknown names are ignored.
    pub fn mark_used(&mut self, name: &str) {
        if let Some(local) = self.lookup(name) {
            local.used = true;
        }
    }

    fn lookup(&mut self, name: &str) -> Option<&mut Local> {
        self.frames
            .iter_mut()
            .rev()
            .find_map(|frame| frame.iter_mut().find(|local| &*local.name == name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_first_assignment_declares() {
        let mut scopes = Scopes::default();
        scopes.push();
        assert_eq!(scopes.assign("x"), Binding::Declare);
        assert_eq!(scopes.assign("x"), Binding::Reassign);
        assert_eq!(scopes.assign("y"), Binding::Declare);
    }

    #[test]
    fn test_outer_names_visible_in_inner_frames() {
        let mut scopes = Scopes::default();
        scopes.push();
        scopes.assign("x");
        scopes.push();
        assert_eq!(scopes.assign("x"), Binding::Reassign);
        assert_eq!(scopes.assign("inner"), Binding::Declare);
        let unused: Vec<Box<str>> = scopes.pop();
        assert_eq!(unused, vec![Box::from("inner")]);
        // `inner` went out of scope with its frame.
        assert_eq!(scopes.assign("inner"), Binding::Declare);
    }

    #[test]
    fn test_pop_reports_unread_names_in_order() {
        let mut scopes = Scopes::default();
        scopes.push();
        scopes.assign("b");
        scopes.assign("a");
        scopes.declare("i", true);
        scopes.assign("c");
        scopes.push();
        scopes.mark_used("a");
        scopes.mark_used("unknown");
        scopes.pop();
        let unused: Vec<Box<str>> = scopes.pop();
        assert_eq!(unused, vec![Box::from("b"), Box::from("c")]);
    }
}
