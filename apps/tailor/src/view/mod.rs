pub mod coordinator;
pub mod render;
pub mod title;

pub use coordinator::{BadgeClass, Tab, ViewCoordinator};
pub use render::{render_page, AnsiLatex, Highlighter, PageView, PlainText};
pub use title::{page_title, PageTitle};
