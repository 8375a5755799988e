// Public API
pub use draw_subscriber::DrawSubscription;
pub use render::{
    MessageSink, Notice, Outcome, RenderDirective, RosterEntry, SessionSnapshot, TicketView,
    TracingSink,
};
pub use service::GameService;

// Internal modules
mod draw_subscriber;
mod render;
mod service;
