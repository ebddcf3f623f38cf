//! Code-generation context threaded through every `gen`/`jumping` call.
//!
//! Owns the output buffer and the label/temporary counters for one
//! compilation, plus a stack of the after-labels of loops currently being
//! generated — the mechanism `Break` uses to find its target without a
//! back-reference into the statement tree (see the loop-break note in
//! `DESIGN.md`).

use faxc_util::{Counter, Interner};

pub struct GenCtx<'a> {
    out: String,
    labels: Counter,
    temps: Counter,
    pub interner: &'a Interner,
    loop_after: Vec<u32>,
}

impl<'a> GenCtx<'a> {
    pub fn new(interner: &'a Interner) -> Self {
        GenCtx {
            out: String::new(),
            labels: Counter::new(),
            temps: Counter::new(),
            interner,
            loop_after: Vec::new(),
        }
    }

    pub fn new_label(&mut self) -> u32 {
        self.labels.next()
    }

    pub fn new_temp(&mut self) -> u32 {
        self.temps.next()
    }

    /// `L<n>:` with no trailing newline — a following instruction on the
    /// same label concatenates directly onto this line.
    pub fn emit_label(&mut self, n: u32) {
        self.out.push_str(&format!("L{n}:"));
    }

    /// One leading tab, the instruction text, and a newline.
    pub fn emit(&mut self, instruction: &str) {
        self.out.push('\t');
        self.out.push_str(instruction);
        self.out.push('\n');
    }

    /// The four-way branch shape shared by every `jumping` implementation
    /// that falls back to the default path.
    pub fn emit_jumps(&mut self, test: &str, to: u32, from: u32) {
        match (to, from) {
            (0, 0) => {}
            (to, 0) => self.emit(&format!("if {test} goto L{to}")),
            (0, from) => self.emit(&format!("iffalse {test} goto L{from}")),
            (to, from) => {
                self.emit(&format!("if {test} goto L{to}"));
                self.emit(&format!("goto L{from}"));
            }
        }
    }

    pub fn push_loop(&mut self, after: u32) {
        self.loop_after.push(after);
    }

    pub fn pop_loop(&mut self) {
        self.loop_after.pop();
    }

    /// The after-label of the nearest loop currently being generated.
    /// Always `Some` when called from `Break::gen`: the parser only
    /// accepts `break` syntactically inside a loop body, and a loop's
    /// `gen` pushes before generating that same body.
    pub fn enclosing_after(&self) -> Option<u32> {
        self.loop_after.last().copied()
    }

    pub fn into_output(self) -> String {
        self.out
    }
}
