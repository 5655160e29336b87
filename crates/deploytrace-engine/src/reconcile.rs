use deploytrace_types::{SpanUid, TimeWindow};

/// How the node a deployment is reconciled against relates to it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// The owning deployment (first nested deployment under a node)
    Parent,
    /// The sibling completed immediately before at the same level
    Sibling,
}

/// An already finalised node that the next deployment is reconciled against.
///
/// Its uid doubles as the trace parent of the next deployment.
#[derive(Debug, Clone, Copy)]
pub struct Predecessor {
    pub uid: SpanUid,
    pub window: TimeWindow,
    pub relation: Relation,
}

impl Predecessor {
    pub fn parent(uid: SpanUid, window: TimeWindow) -> Self {
        Self {
            uid,
            window,
            relation: Relation::Parent,
        }
    }

    pub fn sibling(uid: SpanUid, window: TimeWindow) -> Self {
        Self {
            uid,
            window,
            relation: Relation::Sibling,
        }
    }
}

/// Corrected window of a nested deployment.
///
/// Against a previous sibling `s`, applied once in this order:
/// - starts after `s` ended: moved back so it ends when `s` ended
/// - starts before `s` started: moved forward to `s`'s start
/// - starts while `s` is still running: moved forward to `s`'s end
///
/// The result is then clipped into the owning deployment's window, which
/// takes precedence over the sibling ordering.
pub fn deployment_window(
    raw: TimeWindow,
    previous: &Predecessor,
    parent: &TimeWindow,
) -> TimeWindow {
    let ordered = match previous.relation {
        Relation::Parent => raw,
        Relation::Sibling => {
            let sibling = previous.window;
            if raw.start() > sibling.end() {
                TimeWindow::ending_at(sibling.end(), raw.duration())
            } else if raw.start() < sibling.start() {
                raw.starting_at(sibling.start())
            } else if raw.start() < sibling.end() {
                raw.starting_at(sibling.end())
            } else {
                raw
            }
        }
    };

    ordered.clip_into(parent)
}

/// Corrected window of a resource operation inside its owning deployment
pub fn resource_window(raw: TimeWindow, owner: &TimeWindow) -> TimeWindow {
    raw.clip_into(owner)
}
