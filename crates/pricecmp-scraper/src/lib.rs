pub mod error;
pub mod extract;
pub mod pacing;
pub mod page;
pub mod parse;
pub mod session;
pub mod static_page;

pub use error::ScraperError;
pub use extract::{extract_price, WaitBudget};
pub use page::{Browser, Locator, RenderedPage};
pub use parse::parse_price;
pub use session::{check_webdriver_ready, with_session, BrowserSession, SessionOptions};
pub use static_page::{StaticBrowser, StaticPage};
