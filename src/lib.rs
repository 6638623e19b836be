pub mod action;
pub mod automation;
pub mod browser;
pub mod cli;
pub mod config;
pub mod element;
pub mod error;
pub mod page;
pub mod report;
pub mod snapshot;
pub mod table;
pub mod tables_api;
pub mod task;
pub mod voyager;

pub use automation::Automation;
pub use browser::BrowserSession;
pub use config::BrowserConfig;
pub use error::{Error, Result};
pub use page::Page;
pub use voyager::{TaskExecutor, TaskPlan};
