use crate::key::Key;

/// A frontend-driven application.
///
/// Presenters (the SDL window, the headless sink) own the loop and call
/// `update` once per presented frame with an RGB24 buffer of
/// `width * height * 3` bytes.
pub trait App {
    fn init(&mut self);
    fn update(&mut self, screen: &mut [u8]);
    fn handle_key_event(&mut self, key: Key, is_down: bool);
    fn should_exit(&self) -> bool;
    fn exit(&mut self);

    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn scale(&self) -> u32;
    fn title(&self) -> String;
}
