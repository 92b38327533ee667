pub mod diff;
pub mod naming;
pub mod safe_ref;
pub mod store;
pub mod types;

pub use diff::{build_change_set, join_tokens, normalize_value, split_tokens, FieldMap};
pub use naming::generate_unique_name;
pub use safe_ref::SafeRefCodec;
pub use store::JobStore;
pub use types::{JobConfig, JobRow, JobSummary, RowAction};
