pub mod call;
pub mod metrics;
pub mod query;
pub mod settings;
pub mod table;

pub use call::*;
pub use metrics::*;
pub use query::*;
pub use settings::*;
pub use table::*;
