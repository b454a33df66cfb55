mod empty_message;
mod help;

/// Small reusable widgets
pub struct UiComponent;
