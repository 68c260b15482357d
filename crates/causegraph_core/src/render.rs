//! Stack-trace rendering.
//!
//! Renders a node and everything reachable from it in the conventional
//! layout: the node header, one `\tat` line per frame, then suppressed
//! entries (indented one tab, captioned `Suppressed: `) and the cause
//! (captioned `Caused by: `). Frames an enclosed trace shares with its
//! enclosing trace are collapsed to `... N more`. A node reached a second
//! time is printed as `[CIRCULAR REFERENCE: header]` and not expanded.

use crate::frame::Frame;
use crate::graph::NodeRef;
use crate::id::NodeId;
use std::collections::HashSet;
use std::fmt::Write;

const CAUSE_CAPTION: &str = "Caused by: ";
const SUPPRESSED_CAPTION: &str = "Suppressed: ";

impl NodeRef<'_> {
    /// Render this node and its reachable graph as a multi-line stack trace
    #[must_use]
    pub fn render_trace(&self) -> String {
        let mut out = String::new();
        let mut seen = HashSet::new();
        seen.insert(self.id());

        let _ = writeln!(out, "{}", self);
        let trace = self.stack_trace();
        for frame in trace {
            let _ = writeln!(out, "\tat {}", frame);
        }
        for suppressed in self.suppressed() {
            render_enclosed(&mut out, suppressed, trace, SUPPRESSED_CAPTION, "\t", &mut seen);
        }
        if let Some(cause) = self.cause() {
            render_enclosed(&mut out, cause, trace, CAUSE_CAPTION, "", &mut seen);
        }
        out
    }
}

fn render_enclosed(
    out: &mut String,
    node: NodeRef<'_>,
    enclosing: &[Frame],
    caption: &str,
    prefix: &str,
    seen: &mut HashSet<NodeId>,
) {
    if !seen.insert(node.id()) {
        let _ = writeln!(out, "{prefix}{caption}[CIRCULAR REFERENCE: {node}]");
        return;
    }

    let trace = node.stack_trace();
    let in_common = frames_in_common(trace, enclosing);
    let _ = writeln!(out, "{prefix}{caption}{node}");
    for frame in &trace[..trace.len() - in_common] {
        let _ = writeln!(out, "{prefix}\tat {frame}");
    }
    if in_common != 0 {
        let _ = writeln!(out, "{prefix}\t... {in_common} more");
    }

    let nested = format!("{prefix}\t");
    for suppressed in node.suppressed() {
        render_enclosed(out, suppressed, trace, SUPPRESSED_CAPTION, &nested, seen);
    }
    if let Some(cause) = node.cause() {
        render_enclosed(out, cause, trace, CAUSE_CAPTION, prefix, seen);
    }
}

/// Number of trailing frames shared by both traces
fn frames_in_common(trace: &[Frame], enclosing: &[Frame]) -> usize {
    trace
        .iter()
        .rev()
        .zip(enclosing.iter().rev())
        .take_while(|(a, b)| a == b)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::SnapshotBuilder;
    use crate::native::{NativeException, Throwable};
    use crate::registry::ExtractorRegistry;
    use std::sync::Arc;

    fn frame(method: &str, line: i32) -> Frame {
        Frame::new("app.Main", method, Some("Main.java".to_string()), line)
    }

    fn render(root: &Arc<dyn NativeException>) -> String {
        SnapshotBuilder::new(ExtractorRegistry::global())
            .build(root)
            .root()
            .render_trace()
    }

    #[test]
    fn test_render_single() {
        let e = Throwable::new("app.Boom")
            .with_message("exploded")
            .with_stack_trace(vec![frame("run", 10), frame("main", 3)])
            .into_shared();
        assert_eq!(
            render(&e),
            "app.Boom: exploded\n\tat app.Main.run(Main.java:10)\n\tat app.Main.main(Main.java:3)\n"
        );
    }

    #[test]
    fn test_render_cause_collapses_common_frames() {
        let outer = Throwable::new("app.Outer")
            .with_stack_trace(vec![frame("wrap", 20), frame("main", 3)])
            .into_shared();
        let inner = Throwable::new("app.Inner")
            .with_message("io")
            .with_stack_trace(vec![frame("read", 7), frame("wrap", 19), frame("main", 3)])
            .into_shared();
        outer.init_cause(inner).unwrap();

        let expected = "app.Outer\n\
            \tat app.Main.wrap(Main.java:20)\n\
            \tat app.Main.main(Main.java:3)\n\
            Caused by: app.Inner: io\n\
            \tat app.Main.read(Main.java:7)\n\
            \tat app.Main.wrap(Main.java:19)\n\
            \t... 1 more\n";
        assert_eq!(render(&outer), expected);
    }

    #[test]
    fn test_render_suppressed_is_indented() {
        let outer = Throwable::new("app.Outer").into_shared();
        let s = Throwable::new("app.Closing")
            .with_stack_trace(vec![frame("close", 5)])
            .into_shared();
        outer.add_suppressed(s);

        assert_eq!(
            render(&outer),
            "app.Outer\n\tSuppressed: app.Closing\n\t\tat app.Main.close(Main.java:5)\n"
        );
    }

    #[test]
    fn test_render_cycle_terminates() {
        let a = Throwable::new("app.A").with_message("a").into_shared();
        let b = Throwable::new("app.B").into_shared();
        a.init_cause(b.clone()).unwrap();
        b.init_cause(a.clone()).unwrap();

        assert_eq!(
            render(&a),
            "app.A: a\nCaused by: app.B\nCaused by: [CIRCULAR REFERENCE: app.A: a]\n"
        );
    }

    #[test]
    fn test_frames_in_common() {
        let a = vec![frame("x", 1), frame("main", 3)];
        let b = vec![frame("y", 2), frame("main", 3)];
        assert_eq!(frames_in_common(&a, &b), 1);
        assert_eq!(frames_in_common(&a, &[]), 0);
        assert_eq!(frames_in_common(&a, &a), 2);
    }
}
