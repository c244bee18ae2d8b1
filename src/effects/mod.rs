use crate::canvas::Frame;

pub mod decorations;
pub mod fireworks;

/// An animated layer of the card. The main loop calls `update` once per
/// fixed step and `render` once per displayed frame.
pub trait Effect {
    /// `width` and `height` are in surface pixels (two per terminal row).
    fn resize(&mut self, width: usize, height: usize);
    fn update(&mut self, dt: f32);
    fn render(&self, frame: &mut Frame);
}
