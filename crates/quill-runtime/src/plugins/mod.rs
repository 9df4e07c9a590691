//! Bundled plugins: reflection during quiet periods, background research on
//! unfamiliar topics, and event reminders.

pub mod reflection;
pub mod reminder;
pub mod research;

pub use reflection::ReflectionPlugin;
pub use reminder::ReminderPlugin;
pub use research::ResearchPlugin;
