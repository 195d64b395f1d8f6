/// Everything the UI can be asked to do, produced by [`crate::input::map_event`]
/// and the main loop's tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    None,
    Quit,
    Tick,

    // Search box
    StartSearch,
    SearchInput(char),
    SearchBackspace,
    SearchCancel,

    // Dropdown
    MoveUp,
    MoveDown,
    AttachSelected,

    MarkComplete,
    Reload,
    ToggleHelp,
}
