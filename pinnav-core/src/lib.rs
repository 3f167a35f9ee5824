pub mod config;
pub mod error;
pub mod flatten;
pub mod icon;
pub mod load;
pub mod model;
pub mod report;
pub mod stamp;
pub mod template;

use colored::Colorize;

pub use config::{BucketKeying, FlattenOptions, RemoteIcons, RootSelection};
pub use error::{ConfigError, LoadError, PinnavError, Result, TemplateError};
pub use flatten::{FlattenStatus, Flattened, flatten, flatten_file};
pub use model::{Document, LinkRecord, NavigationMap, Node, Subcategories};
pub use template::{HostPage, write_page};

pub fn print_banner() {
    println!(
        "{} {}",
        "pinnav".bright_cyan().bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).bright_black()
    );
    println!("{}", "bookmark tree → static navigation page".bright_black());
    println!();
}
