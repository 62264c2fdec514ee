pub mod observer;
pub mod session;
pub mod webdriver;

pub use observer::{ObservedResponse, ResponseObserver};
pub use session::DiscoverySession;
pub use webdriver::WebDriverObserver;
