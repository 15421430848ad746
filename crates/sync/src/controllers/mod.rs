//! One controller per view. Each owns its [`SyncedCollection`]s and
//! reports failures as error toasts before returning them.
//!
//! [`SyncedCollection`]: crate::collection::SyncedCollection

pub mod admin_console;
pub mod dashboard;
pub mod document_browser;
pub mod notification_inbox;
pub mod project_items;
pub mod project_list;
pub mod task_board;
pub mod task_timer;
pub mod team_roster;

pub use admin_console::AdminConsole;
pub use dashboard::Dashboard;
pub use document_browser::{DocumentBrowser, DocumentNode, DocumentTree};
pub use notification_inbox::NotificationInbox;
pub use project_items::ProjectItems;
pub use project_list::ProjectList;
pub use task_board::{TaskBoard, TaskScope};
pub use task_timer::TaskTimer;
pub use team_roster::TeamRoster;
