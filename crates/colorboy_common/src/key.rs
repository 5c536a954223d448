/// Frontend-neutral keyboard keys.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    A,
    S,
    Z,
    X,
    Return,
    Backspace,
    Escape,
    None,
}
