//! Mode flags shared between the terminal and the canvas scene.
//!
//! The console writes them through `set_mode`, the engine reads them once per
//! executed frame through `get_mode`. Everything runs on the page's single thread,
//! so a pair of `Cell`s behind an `Rc` is all the sharing needed.

use std::cell::Cell;
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Floating particle overlay (on by default).
    Particles,
    /// Matrix rain replaces circles and particles (off by default).
    Matrix,
}

#[derive(Debug)]
pub struct ModeFlags {
    particles: Cell<bool>,
    matrix: Cell<bool>,
}

impl Default for ModeFlags {
    fn default() -> Self {
        Self { particles: Cell::new(true), matrix: Cell::new(false) }
    }
}

impl ModeFlags {
    pub fn shared() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn get_mode(&self, mode: Mode) -> bool {
        self.cell(mode).get()
    }

    pub fn set_mode(&self, mode: Mode, value: bool) {
        self.cell(mode).set(value);
    }

    /// Flip a flag and return the new value.
    pub fn toggle(&self, mode: Mode) -> bool {
        let cell = self.cell(mode);
        cell.set(!cell.get());
        cell.get()
    }

    fn cell(&self, mode: Mode) -> &Cell<bool> {
        match mode {
            Mode::Particles => &self.particles,
            Mode::Matrix => &self.matrix,
        }
    }
}
