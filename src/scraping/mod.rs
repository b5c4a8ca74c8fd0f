pub mod calendar;
pub mod crawler;
pub mod login;
pub mod markup;
pub mod product;

pub use calendar::{select_packing_date, DateSelection};
pub use crawler::crawl_all;
pub use login::{dismiss_popups, login};
pub use product::{extract, extract_snapshot};
