pub mod chart;
pub mod content;
pub mod data_table;
pub mod group_view;
pub mod login_page;
pub mod main_page;
pub mod new_reading;
pub mod page;
pub mod presets;
pub mod summary_card;

pub use chart::Chart;
pub use content::{ContentBody, MainContent};
pub use data_table::DataTable;
pub use group_view::GroupView;
pub use login_page::LoginPage;
pub use main_page::MainPage;
pub use new_reading::NewReadingForm;
pub use page::Page;
pub use summary_card::SummaryCard;
